use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::ApiResponse;
use crate::domain::services::coupon_service::VerifyResult;
use crate::error::{AppError, AppResult};
use crate::server::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/puzzle", get(daily_puzzle))
        .route("/verify", post(verify_answer))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleData {
    pub puzzle: String,
    pub coupons_remaining: i64,
}

// 谜题公开可见, 答案只在服务端
async fn daily_puzzle(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<PuzzleData>>> {
    let puzzle = state.coupon_service().get_daily_puzzle().await?;

    Ok(Json(ApiResponse::success(PuzzleData {
        coupons_remaining: puzzle.coupons_remaining(),
        puzzle: puzzle.puzzle,
    })))
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub answer: String,
}

async fn verify_answer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyRequest>,
) -> AppResult<Json<ApiResponse<VerifyResult>>> {
    let answer = payload.answer.trim();
    if answer.len() != 3 {
        return Err(AppError::Validation(
            "Please enter a 3-digit passcode".to_string(),
        ));
    }

    let result = state.coupon_service().verify_answer(answer).await?;
    Ok(Json(ApiResponse::success(result)))
}
