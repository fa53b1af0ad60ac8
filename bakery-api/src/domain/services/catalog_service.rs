use std::sync::Arc;

use chrono::Utc;

use crate::domain::models::product::{Product, ProductUpdate};
use crate::error::{AppError, AppResult};
use crate::repository::ProductRepository;

pub struct CatalogService {
    products: Arc<dyn ProductRepository>,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        self.products.list().await
    }

    pub async fn get_product(&self, id: &str) -> AppResult<Product> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    pub async fn create_product(
        &self,
        name: String,
        category: String,
        price: i64,
        preparation_time: i64,
        image: String,
    ) -> AppResult<Product> {
        let product = Product::new(name, category, price, preparation_time, image);
        self.products.insert(&product).await?;
        Ok(product)
    }

    pub async fn update_product(&self, id: &str, update: ProductUpdate) -> AppResult<Product> {
        self.products
            .update(id, update, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    pub async fn delete_product(&self, id: &str) -> AppResult<()> {
        if !self.products.delete(id).await? {
            return Err(AppError::NotFound("Product not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::product_repository::MockProductRepository;

    #[tokio::test]
    async fn test_get_product_maps_missing_to_not_found() {
        let mut products = MockProductRepository::new();
        products.expect_find_by_id().returning(|_| Ok(None));

        let service = CatalogService::new(Arc::new(products));
        let result = service.get_product("missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_product_stamps_id_and_timestamps() {
        let mut products = MockProductRepository::new();
        products.expect_insert().times(1).returning(|_| Ok(()));

        let service = CatalogService::new(Arc::new(products));
        let product = service
            .create_product(
                "Chocolate Truffle".to_string(),
                "Cakes".to_string(),
                850,
                120,
                String::new(),
            )
            .await
            .unwrap();

        assert!(!product.id.is_empty());
        assert_eq!(product.created_at, product.updated_at);
        assert_eq!(product.price, 850);
    }

    #[tokio::test]
    async fn test_delete_missing_product_is_not_found() {
        let mut products = MockProductRepository::new();
        products.expect_delete().returning(|_| Ok(false));

        let service = CatalogService::new(Arc::new(products));
        assert!(matches!(
            service.delete_product("missing").await,
            Err(AppError::NotFound(_))
        ));
    }
}
