use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::api::ApiResponse;
use crate::domain::services::coupon_service::ValidateResult;
use crate::error::{AppError, AppResult};
use crate::server::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/validate", post(validate_coupon))
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub code: String,
}

// 只读校验, 核销发生在下单时
async fn validate_coupon(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ValidateRequest>,
) -> AppResult<Json<ApiResponse<ValidateResult>>> {
    if payload.code.trim().is_empty() {
        return Err(AppError::Validation("Coupon code is required".to_string()));
    }

    let result = state.coupon_service().validate_coupon(&payload.code).await?;
    Ok(Json(ApiResponse::success(result)))
}
