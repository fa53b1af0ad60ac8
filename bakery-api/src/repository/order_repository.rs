use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, to_bson};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::{Collection, Database};

use crate::domain::models::order::{Order, OrderStatus};
use crate::error::{AppError, AppResult};
use crate::repository::{is_duplicate_key, regex_escape};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// 订单号撞上唯一索引时返回 Conflict, 由服务层换号重试
    async fn insert(&self, order: &Order) -> AppResult<()>;
    async fn list(&self) -> AppResult<Vec<Order>>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Order>>;
    async fn find_by_order_number(&self, order_number: &str) -> AppResult<Option<Order>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Vec<Order>>;
    async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<Order>>;
}

pub struct MongoOrderRepository {
    collection: Collection<Order>,
}

impl MongoOrderRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("orders"),
        }
    }
}

#[async_trait]
impl OrderRepository for MongoOrderRepository {
    async fn insert(&self, order: &Order) -> AppResult<()> {
        match self.collection.insert_one(order, None).await {
            Ok(_) => Ok(()),
            Err(err) if is_duplicate_key(&err) => Err(AppError::Conflict(format!(
                "Order number {} already exists",
                order.order_number
            ))),
            Err(err) => Err(err.into()),
        }
    }

    async fn list(&self) -> AppResult<Vec<Order>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();
        let cursor = self.collection.find(doc! {}, options).await?;
        let orders = cursor.try_collect().await?;
        Ok(orders)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Order>> {
        let order = self.collection.find_one(doc! { "id": id }, None).await?;
        Ok(order)
    }

    async fn find_by_order_number(&self, order_number: &str) -> AppResult<Option<Order>> {
        let order = self
            .collection
            .find_one(doc! { "orderNumber": order_number }, None)
            .await?;
        Ok(order)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Vec<Order>> {
        // 大小写不敏感的精确匹配
        let filter = doc! {
            "customerEmail": {
                "$regex": format!("^{}$", regex_escape(email)),
                "$options": "i",
            }
        };
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();
        let cursor = self.collection.find(filter, options).await?;
        let orders = cursor.try_collect().await?;
        Ok(orders)
    }

    async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<Order>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(
                doc! { "id": id },
                doc! { "$set": {
                    "status": to_bson(&status)?,
                    "updatedAt": to_bson(&updated_at)?,
                } },
                options,
            )
            .await?;

        Ok(updated)
    }
}
