use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;

use crate::error::AppError;
use crate::server::AppState;

/// 承载会话令牌的 HttpOnly cookie
pub const ADMIN_COOKIE: &str = "admin_token";

/// 管理端接口守卫: 从 cookie 取令牌并校验会话.
/// 缺失/未知/过期一律 401, 过期会话在校验时顺带删除.
pub struct RequireAdmin;

#[async_trait::async_trait]
impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .expect("CookieJar extraction is infallible");

        let token = jar.get(ADMIN_COOKIE).map(|cookie| cookie.value().to_string());

        let authenticated = state
            .auth_service()
            .is_authenticated(token.as_deref())
            .await?;

        if !authenticated {
            return Err(AppError::Auth("Unauthorized".to_string()));
        }

        Ok(RequireAdmin)
    }
}
