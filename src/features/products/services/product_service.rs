use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::products::dtos::{CreateProductRequest, ProductDto, UpdateProductRequest};
use crate::features::products::models::{Product, ProductFilter};
use crate::features::products::repositories::ProductRepository;

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Product with id {} not found", id))
}

/// Service for product operations
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
}

impl std::fmt::Debug for ProductService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductService")
            .field("repository", &"<dyn ProductRepository>")
            .finish()
    }
}

impl ProductService {
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self { repository }
    }

    /// Get product by ID
    pub async fn get(&self, id: Uuid, ct: &CancellationToken) -> Result<Option<ProductDto>> {
        let product = self.repository.get_by_id(id, ct).await?;
        Ok(product.map(ProductDto::from))
    }

    /// Search products; the filter's window must already be clamped
    pub async fn search(
        &self,
        filter: &ProductFilter,
        ct: &CancellationToken,
    ) -> Result<(Vec<ProductDto>, i64)> {
        let (products, total) = self.repository.search(filter, ct).await?;
        Ok((products.into_iter().map(ProductDto::from).collect(), total))
    }

    /// Create a new product and return its id
    pub async fn create(&self, request: CreateProductRequest, ct: &CancellationToken) -> Result<Uuid> {
        let product = Product::new(
            request.name,
            request.category,
            request.description,
            request.price,
        );

        self.repository.add(&product, ct).await?;
        Ok(product.id)
    }

    /// Replace the mutable fields of an existing product
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateProductRequest,
        ct: &CancellationToken,
    ) -> Result<()> {
        let mut product = self
            .repository
            .get_by_id(id, ct)
            .await?
            .ok_or_else(|| not_found(id))?;

        product.name = request.name;
        product.category = request.category;
        product.description = request.description;
        product.price = request.price;
        product.updated_at = Utc::now();

        // The row may have been deleted between the read and the write
        if !self.repository.update(&product, ct).await? {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// Delete a product; deleting an unknown id succeeds
    pub async fn delete(&self, id: Uuid, ct: &CancellationToken) -> Result<()> {
        self.repository.delete(id, ct).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::products::repositories::InMemoryProductRepository;
    use crate::shared::types::PageRequest;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn service() -> (ProductService, InMemoryProductRepository) {
        let repo = InMemoryProductRepository::new();
        (ProductService::new(Arc::new(repo.clone())), repo)
    }

    fn create_request(name: &str, category: &str) -> CreateProductRequest {
        CreateProductRequest {
            name: name.to_string(),
            category: category.to_string(),
            description: Some("Reusable".to_string()),
            price: Decimal::from_str("12.50").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_then_get_returns_request_fields() {
        let (service, _) = service();
        let ct = CancellationToken::new();

        let id = service
            .create(create_request("Bamboo Bottle", "Kitchen"), &ct)
            .await
            .unwrap();
        let dto = service.get(id, &ct).await.unwrap().unwrap();

        assert_eq!(dto.id, id);
        assert_eq!(dto.name, "Bamboo Bottle");
        assert_eq!(dto.category, "Kitchen");
        assert_eq!(dto.description.as_deref(), Some("Reusable"));
        assert_eq!(dto.price, Decimal::from_str("12.50").unwrap());
    }

    #[tokio::test]
    async fn test_update_replaces_fields_and_keeps_created_at() {
        let (service, _) = service();
        let ct = CancellationToken::new();
        let id = service
            .create(create_request("Bamboo Bottle", "Kitchen"), &ct)
            .await
            .unwrap();
        let before = service.get(id, &ct).await.unwrap().unwrap();

        service
            .update(
                id,
                UpdateProductRequest {
                    name: "Steel Bottle".to_string(),
                    category: "Outdoor".to_string(),
                    description: None,
                    price: Decimal::from(20),
                },
                &ct,
            )
            .await
            .unwrap();

        let after = service.get(id, &ct).await.unwrap().unwrap();
        assert_eq!(after.name, "Steel Bottle");
        assert_eq!(after.category, "Outdoor");
        assert_eq!(after.description, None);
        assert_eq!(after.price, Decimal::from(20));
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let (service, repo) = service();
        let ct = CancellationToken::new();

        let result = service
            .update(
                Uuid::now_v7(),
                UpdateProductRequest {
                    name: "Ghost".to_string(),
                    category: "None".to_string(),
                    description: None,
                    price: Decimal::ZERO,
                },
                &ct,
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(repo.count().await, 0);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (service, _) = service();
        let ct = CancellationToken::new();
        let id = service
            .create(create_request("Bamboo Bottle", "Kitchen"), &ct)
            .await
            .unwrap();

        service.delete(id, &ct).await.unwrap();
        service.delete(id, &ct).await.unwrap();
        assert!(service.get(id, &ct).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_maps_to_dtos() {
        let (service, _) = service();
        let ct = CancellationToken::new();
        let id = service
            .create(create_request("Bamboo Bottle", "Kitchen"), &ct)
            .await
            .unwrap();
        service
            .create(create_request("Linen Bag", "Bags"), &ct)
            .await
            .unwrap();

        let filter = ProductFilter::new(None, Some("Kitchen".to_string()), PageRequest::default());
        let (items, total) = service.search(&filter, &ct).await.unwrap();

        assert_eq!(total, 1);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id);
    }
}
