use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::ApiResponse;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{RequireAdmin, ADMIN_COOKIE};
use crate::server::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/check", get(check))
        .route("/password", post(change_password))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username and password are required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Username and password are required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct CheckData {
    pub authenticated: bool,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "New password must be at least 6 characters"))]
    pub new_password: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<ApiResponse<LoginData>>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let token = state
        .auth_service()
        .login(&payload.username, &payload.password)
        .await?;

    let cookie = session_cookie(&state, token.clone());

    Ok((jar.add(cookie), Json(ApiResponse::success(LoginData { token }))))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<ApiResponse<()>>)> {
    if let Some(cookie) = jar.get(ADMIN_COOKIE) {
        state.auth_service().logout(cookie.value()).await?;
    }

    let removal = Cookie::build((ADMIN_COOKIE, "")).path("/").build();

    Ok((jar.remove(removal), Json(ApiResponse::ok())))
}

async fn check(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> AppResult<Json<ApiResponse<CheckData>>> {
    let token = jar.get(ADMIN_COOKIE).map(|cookie| cookie.value().to_string());
    let authenticated = state
        .auth_service()
        .is_authenticated(token.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(CheckData { authenticated })))
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .auth_service()
        .change_password(&payload.current_password, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::ok()))
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((ADMIN_COOKIE, token))
        .http_only(true)
        .secure(state.config.server.is_production())
        .same_site(SameSite::Strict)
        .max_age(time::Duration::hours(24))
        .path("/")
        .build()
}
