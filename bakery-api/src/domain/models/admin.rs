use serde::{Deserialize, Serialize};

/// 单例管理员账号
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub username: String,
    pub password_hash: String,
}

/// 持久化的会话记录, 过期时间为创建时刻 + 24h, 不滑动续期
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub token: String,
    /// Unix 毫秒时间戳
    pub expires_at: i64,
}

pub const SESSION_TTL_HOURS: i64 = 24;

impl AuthSession {
    pub fn new(token: String, now_millis: i64) -> Self {
        Self {
            token,
            expires_at: now_millis + SESSION_TTL_HOURS * 60 * 60 * 1000,
        }
    }

    pub fn is_expired(&self, now_millis: i64) -> bool {
        self.expires_at < now_millis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expiry() {
        let session = AuthSession::new("tok".to_string(), 1_000);
        assert_eq!(session.expires_at, 1_000 + 24 * 60 * 60 * 1000);
        assert!(!session.is_expired(1_000));
        assert!(!session.is_expired(session.expires_at));
        assert!(session.is_expired(session.expires_at + 1));
    }
}
