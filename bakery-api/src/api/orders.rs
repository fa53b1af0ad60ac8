use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use validator::Validate;

use crate::api::ApiResponse;
use crate::domain::models::order::{Order, OrderStatus};
use crate::domain::models::stats::OrderStats;
use crate::domain::services::order_service::OrderForm;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAdmin;
use crate::server::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/stats", get(order_stats))
        .route("/track", get(track_orders))
        .route("/:id", get(get_order).patch(update_order_status))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let orders = state.order_service().list_orders().await?;
    Ok(Json(ApiResponse::success(orders)))
}

// 公开下单
async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<OrderForm>,
) -> AppResult<(StatusCode, Json<ApiResponse<Order>>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let order = state.order_service().create_order(payload).await?;

    // 通知邮件不阻塞下单响应, 失败只记日志
    let notifier = state.notification_service();
    let sent_order = order.clone();
    tokio::spawn(async move {
        if let Err(err) = notifier.send_order_emails(&sent_order).await {
            tracing::warn!(
                order_number = %sent_order.order_number,
                "failed to send order notification emails: {}",
                err
            );
        }
    });

    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.order_service().get_order(&id).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

async fn update_order_status(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let status = OrderStatus::from_str(&payload.status)
        .map_err(|_| AppError::Validation("Invalid status".to_string()))?;

    let order = state.order_service().update_order_status(&id, status).await?;
    Ok(Json(ApiResponse::success(order)))
}

async fn order_stats(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
) -> AppResult<Json<ApiResponse<OrderStats>>> {
    let stats = state.order_service().get_order_stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    #[serde(rename = "type")]
    pub search_type: String,
    pub value: String,
}

// 公开的订单跟踪: 订单号/手机号/邮箱
async fn track_orders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrackQuery>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    if query.value.trim().is_empty() {
        return Err(AppError::Validation("Missing search parameters".to_string()));
    }

    let service = state.order_service();
    let orders = match query.search_type.as_str() {
        "orderNumber" => service.get_order_by_number(&query.value).await?,
        "phone" => service.get_orders_by_phone(&query.value).await?,
        "email" => {
            service
                .get_orders_by_email(&query.value.trim().to_lowercase())
                .await?
        }
        _ => return Err(AppError::Validation("Invalid search type".to_string())),
    };

    Ok(Json(ApiResponse::success(orders)))
}
