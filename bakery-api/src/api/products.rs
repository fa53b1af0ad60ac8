use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use validator::Validate;

use crate::api::ApiResponse;
use crate::domain::models::product::{Product, ProductUpdate};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAdmin;
use crate::server::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "Category cannot be empty"))]
    pub category: String,
    #[validate(range(min = 1, message = "Price must be positive"))]
    pub price: i64,
    #[validate(range(min = 0, message = "Preparation time cannot be negative"))]
    pub preparation_time: i64,
    pub image: Option<String>,
}

// 商品列表是公开的
async fn list_products(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let products = state.catalog_service().list_products().await?;
    Ok(Json(ApiResponse::success(products)))
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = state.catalog_service().get_product(&id).await?;
    Ok(Json(ApiResponse::success(product)))
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let product = state
        .catalog_service()
        .create_product(
            payload.name,
            payload.category,
            payload.price,
            payload.preparation_time,
            payload.image.unwrap_or_default(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let catalog = state.catalog_service();
    let existing = catalog.get_product(&id).await?;

    let replacing_image = payload
        .image
        .as_ref()
        .is_some_and(|image| *image != existing.image);

    let product = catalog.update_product(&id, payload).await?;

    // 换图后清掉旧资源, 尽力而为
    if replacing_image {
        spawn_media_cleanup(&state, existing.image);
    }

    Ok(Json(ApiResponse::success(product)))
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let catalog = state.catalog_service();
    let existing = catalog.get_product(&id).await?;

    catalog.delete_product(&id).await?;
    spawn_media_cleanup(&state, existing.image);

    Ok(Json(ApiResponse::ok()))
}

fn spawn_media_cleanup(state: &Arc<AppState>, image_url: String) {
    if image_url.is_empty() {
        return;
    }

    let media = state.media.clone();
    tokio::spawn(async move {
        let Some(public_id) = media.public_id_for_url(&image_url) else {
            return;
        };
        if let Err(err) = media.delete(&public_id).await {
            tracing::warn!("failed to delete media asset {}: {}", public_id, err);
        }
    });
}
