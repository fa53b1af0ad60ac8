use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;

use crate::domain::models::admin::{AdminUser, AuthSession};
use crate::error::{AppError, AppResult};
use crate::repository::{AdminRepository, SessionRepository};
use crate::utils::codes::generate_token;

pub struct AuthService {
    admin: Arc<dyn AdminRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl AuthService {
    pub fn new(admin: Arc<dyn AdminRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { admin, sessions }
    }

    /// 账号不存在时, 首个登录者的凭据成为管理员账号
    pub async fn login(&self, username: &str, password: &str) -> AppResult<String> {
        match self.admin.get_admin().await? {
            None => {
                tracing::warn!("no admin account found, bootstrapping from first login");
                let user = AdminUser {
                    username: username.to_string(),
                    password_hash: hash_password(password)?,
                };
                self.admin.save_admin(&user).await?;
                self.issue_session().await
            }
            Some(admin) => {
                if admin.username != username || !verify_password(password, &admin.password_hash) {
                    return Err(AppError::Auth("Invalid username or password".to_string()));
                }
                self.issue_session().await
            }
        }
    }

    /// 缺失/未知/过期令牌一律拒绝; 过期会话顺手删掉
    pub async fn is_authenticated(&self, token: Option<&str>) -> AppResult<bool> {
        let Some(token) = token else {
            return Ok(false);
        };

        let Some(session) = self.sessions.find(token).await? else {
            return Ok(false);
        };

        if session.is_expired(Utc::now().timestamp_millis()) {
            self.sessions.delete(token).await?;
            return Ok(false);
        }

        Ok(true)
    }

    /// 幂等
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        self.sessions.delete(token).await
    }

    pub async fn change_password(&self, current: &str, new: &str) -> AppResult<()> {
        let admin = self
            .admin
            .get_admin()
            .await?
            .ok_or_else(|| AppError::NotFound("No admin account exists".to_string()))?;

        if !verify_password(current, &admin.password_hash) {
            return Err(AppError::Auth("Current password is incorrect".to_string()));
        }

        let updated = AdminUser {
            username: admin.username,
            password_hash: hash_password(new)?,
        };
        self.admin.save_admin(&updated).await
    }

    /// 带外预置管理员账号 (配置了 [admin] 段时在启动阶段调用).
    /// 已有账号则不动, 返回 false.
    pub async fn provision_admin(&self, username: &str, password: &str) -> AppResult<bool> {
        if self.admin.get_admin().await?.is_some() {
            return Ok(false);
        }

        let user = AdminUser {
            username: username.to_string(),
            password_hash: hash_password(password)?,
        };
        self.admin.save_admin(&user).await?;
        Ok(true)
    }

    pub async fn cleanup_sessions(&self) -> AppResult<u64> {
        self.sessions.delete_expired(Utc::now().timestamp_millis()).await
    }

    async fn issue_session(&self) -> AppResult<String> {
        let token = generate_token();
        let session = AuthSession::new(token.clone(), Utc::now().timestamp_millis());
        self.sessions.insert(&session).await?;
        Ok(token)
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::session_repository::MockSessionRepository;
    use crate::repository::user_repository::MockAdminRepository;

    fn service(
        admin: MockAdminRepository,
        sessions: MockSessionRepository,
    ) -> AuthService {
        AuthService::new(Arc::new(admin), Arc::new(sessions))
    }

    #[tokio::test]
    async fn test_login_bootstraps_first_admin() {
        let mut admin = MockAdminRepository::new();
        admin.expect_get_admin().times(1).returning(|| Ok(None));
        admin
            .expect_save_admin()
            .times(1)
            .withf(|user| user.username == "owner" && user.password_hash.starts_with("$argon2"))
            .returning(|_| Ok(()));

        let mut sessions = MockSessionRepository::new();
        sessions.expect_insert().times(1).returning(|_| Ok(()));

        let token = service(admin, sessions).login("owner", "secret").await.unwrap();
        assert_eq!(token.len(), 48);
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_credentials_after_bootstrap() {
        let hash = hash_password("right-password").unwrap();

        let mut admin = MockAdminRepository::new();
        admin
            .expect_get_admin()
            .returning(move || {
                Ok(Some(AdminUser {
                    username: "owner".to_string(),
                    password_hash: hash.clone(),
                }))
            });

        let mut sessions = MockSessionRepository::new();
        sessions.expect_insert().never();

        let result = service(admin, sessions).login("owner", "wrong-password").await;
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[tokio::test]
    async fn test_login_succeeds_with_correct_credentials() {
        let hash = hash_password("right-password").unwrap();

        let mut admin = MockAdminRepository::new();
        admin
            .expect_get_admin()
            .returning(move || {
                Ok(Some(AdminUser {
                    username: "owner".to_string(),
                    password_hash: hash.clone(),
                }))
            });

        let mut sessions = MockSessionRepository::new();
        sessions.expect_insert().times(1).returning(|_| Ok(()));

        let token = service(admin, sessions)
            .login("owner", "right-password")
            .await
            .unwrap();
        assert!(!token.is_empty());
    }

    #[tokio::test]
    async fn test_is_authenticated_fails_closed_without_token() {
        let admin = MockAdminRepository::new();
        let mut sessions = MockSessionRepository::new();
        sessions.expect_find().never();

        assert!(!service(admin, sessions).is_authenticated(None).await.unwrap());
    }

    #[tokio::test]
    async fn test_is_authenticated_deletes_expired_session() {
        let admin = MockAdminRepository::new();

        let mut sessions = MockSessionRepository::new();
        sessions.expect_find().returning(|token| {
            Ok(Some(AuthSession {
                token: token.to_string(),
                // 已过期
                expires_at: 1,
            }))
        });
        sessions
            .expect_delete()
            .times(1)
            .withf(|token| token == "stale")
            .returning(|_| Ok(()));

        let ok = service(admin, sessions)
            .is_authenticated(Some("stale"))
            .await
            .unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_is_authenticated_accepts_live_session() {
        let admin = MockAdminRepository::new();

        let mut sessions = MockSessionRepository::new();
        sessions.expect_find().returning(|token| {
            Ok(Some(AuthSession::new(
                token.to_string(),
                Utc::now().timestamp_millis(),
            )))
        });
        sessions.expect_delete().never();

        let ok = service(admin, sessions)
            .is_authenticated(Some("live"))
            .await
            .unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn test_provision_admin_skips_existing_account() {
        let mut admin = MockAdminRepository::new();
        admin.expect_get_admin().returning(|| {
            Ok(Some(AdminUser {
                username: "owner".to_string(),
                password_hash: "hash".to_string(),
            }))
        });
        admin.expect_save_admin().never();

        let sessions = MockSessionRepository::new();
        let created = service(admin, sessions)
            .provision_admin("other", "pw")
            .await
            .unwrap();
        assert!(!created);
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        // 加盐: 同一口令两次哈希不同
        assert_ne!(hash, hash_password("hunter2").unwrap());
    }
}
