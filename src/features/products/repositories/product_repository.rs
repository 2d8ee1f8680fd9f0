use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::products::models::{Product, ProductFilter};

/// Repository trait for Product persistence.
///
/// Every mutating call is committed before it returns. Every call takes the
/// request's cancellation token and gives up with `AppError::Cancelled` once
/// it fires.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Get a product by ID
    async fn get_by_id(&self, id: Uuid, ct: &CancellationToken) -> Result<Option<Product>>;

    /// One page of matching products ordered by name, plus the total match count
    async fn search(
        &self,
        filter: &ProductFilter,
        ct: &CancellationToken,
    ) -> Result<(Vec<Product>, i64)>;

    /// Insert a new product
    async fn add(&self, product: &Product, ct: &CancellationToken) -> Result<()>;

    /// Replace the mutable columns of an existing product.
    /// Returns `false` when no row has the product's id.
    async fn update(&self, product: &Product, ct: &CancellationToken) -> Result<bool>;

    /// Delete a product by ID; absent ids are ignored
    async fn delete(&self, id: Uuid, ct: &CancellationToken) -> Result<()>;
}
