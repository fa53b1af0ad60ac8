use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, to_bson, Document};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::{Collection, Database};

use crate::domain::models::product::{Product, ProductUpdate};
use crate::error::AppResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Product>>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Product>>;
    async fn insert(&self, product: &Product) -> AppResult<()>;
    async fn update(
        &self,
        id: &str,
        update: ProductUpdate,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<Product>>;
    async fn delete(&self, id: &str) -> AppResult<bool>;
}

pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("products"),
        }
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    async fn list(&self) -> AppResult<Vec<Product>> {
        let cursor = self.collection.find(doc! {}, None).await?;
        let products = cursor.try_collect().await?;
        Ok(products)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Product>> {
        let product = self.collection.find_one(doc! { "id": id }, None).await?;
        Ok(product)
    }

    async fn insert(&self, product: &Product) -> AppResult<()> {
        self.collection.insert_one(product, None).await?;
        Ok(())
    }

    async fn update(
        &self,
        id: &str,
        update: ProductUpdate,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<Product>> {
        let mut set = Document::new();
        if let Some(name) = update.name {
            set.insert("name", name);
        }
        if let Some(category) = update.category {
            set.insert("category", category);
        }
        if let Some(price) = update.price {
            set.insert("price", price);
        }
        if let Some(preparation_time) = update.preparation_time {
            set.insert("preparationTime", preparation_time);
        }
        if let Some(image) = update.image {
            set.insert("image", image);
        }
        set.insert("updatedAt", to_bson(&updated_at)?);

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(doc! { "id": id }, doc! { "$set": set }, options)
            .await?;

        Ok(updated)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = self.collection.delete_one(doc! { "id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }
}
