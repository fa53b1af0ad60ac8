use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::{Collection, Database};

use crate::domain::models::admin::AuthSession;
use crate::error::AppResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert(&self, session: &AuthSession) -> AppResult<()>;
    async fn find(&self, token: &str) -> AppResult<Option<AuthSession>>;
    async fn delete(&self, token: &str) -> AppResult<()>;
    /// 清理所有过期会话, 返回删除数
    async fn delete_expired(&self, now_millis: i64) -> AppResult<u64>;
}

pub struct MongoSessionRepository {
    collection: Collection<AuthSession>,
}

impl MongoSessionRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("sessions"),
        }
    }
}

#[async_trait]
impl SessionRepository for MongoSessionRepository {
    async fn insert(&self, session: &AuthSession) -> AppResult<()> {
        self.collection.insert_one(session, None).await?;
        Ok(())
    }

    async fn find(&self, token: &str) -> AppResult<Option<AuthSession>> {
        let session = self
            .collection
            .find_one(doc! { "token": token }, None)
            .await?;
        Ok(session)
    }

    async fn delete(&self, token: &str) -> AppResult<()> {
        self.collection.delete_one(doc! { "token": token }, None).await?;
        Ok(())
    }

    async fn delete_expired(&self, now_millis: i64) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "expiresAt": { "$lt": now_millis } }, None)
            .await?;
        Ok(result.deleted_count)
    }
}
