use async_trait::async_trait;
use mongodb::bson::{doc, to_document};
use mongodb::options::UpdateOptions;
use mongodb::{Collection, Database};

use crate::domain::models::admin::AdminUser;
use crate::error::AppResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// 单例账号, 集合里最多一条
    async fn get_admin(&self) -> AppResult<Option<AdminUser>>;
    async fn save_admin(&self, user: &AdminUser) -> AppResult<()>;
}

pub struct MongoAdminRepository {
    collection: Collection<AdminUser>,
}

impl MongoAdminRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("admin"),
        }
    }
}

#[async_trait]
impl AdminRepository for MongoAdminRepository {
    async fn get_admin(&self) -> AppResult<Option<AdminUser>> {
        let admin = self.collection.find_one(doc! {}, None).await?;
        Ok(admin)
    }

    async fn save_admin(&self, user: &AdminUser) -> AppResult<()> {
        let options = UpdateOptions::builder().upsert(true).build();
        self.collection
            .update_one(doc! {}, doc! { "$set": to_document(user)? }, options)
            .await?;
        Ok(())
    }
}
