use std::sync::Arc;

use axum::extract::State;
use axum::{Json, Router};
use axum::routing::post;
use serde::{Deserialize, Serialize};

use crate::api::ApiResponse;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAdmin;
use crate::server::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", post(upload_image))
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    /// base64 编码的图片 (data URI)
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct UploadData {
    pub url: String,
}

async fn upload_image(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Json(payload): Json<UploadRequest>,
) -> AppResult<Json<ApiResponse<UploadData>>> {
    if payload.image.is_empty() {
        return Err(AppError::Validation("No image provided".to_string()));
    }

    let url = state.media.upload(&payload.image).await?;
    Ok(Json(ApiResponse::success(UploadData { url })))
}
