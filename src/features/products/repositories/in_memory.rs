use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::cancellation::ensure_active;
use crate::core::error::Result;
use crate::features::products::models::{Product, ProductFilter};
use crate::features::products::repositories::ProductRepository;

/// Same predicates as the SQL search: substring on name, exact category
fn is_match(filter: &ProductFilter, product: &Product) -> bool {
    let name_ok = filter
        .query
        .as_deref()
        .is_none_or(|q| product.name.contains(q));
    let category_ok = filter
        .category
        .as_deref()
        .is_none_or(|c| product.category == c);
    name_ok && category_ok
}

/// In-memory implementation of ProductRepository (for testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
    last_search: Arc<RwLock<Option<ProductFilter>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.products.read().await.len()
    }

    /// The filter received by the most recent `search` call
    pub async fn last_search(&self) -> Option<ProductFilter> {
        self.last_search.read().await.clone()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn get_by_id(&self, id: Uuid, ct: &CancellationToken) -> Result<Option<Product>> {
        ensure_active(ct)?;
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn search(
        &self,
        filter: &ProductFilter,
        ct: &CancellationToken,
    ) -> Result<(Vec<Product>, i64)> {
        ensure_active(ct)?;
        *self.last_search.write().await = Some(filter.clone());
        let products = self.products.read().await;

        let mut matching: Vec<&Product> = products
            .values()
            .filter(|p| is_match(filter, p))
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        let total = matching.len() as i64;
        let skip = usize::try_from(filter.window.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(filter.window.limit()).unwrap_or(0);

        let items = matching.into_iter().skip(skip).take(take).cloned().collect();
        Ok((items, total))
    }

    async fn add(&self, product: &Product, ct: &CancellationToken) -> Result<()> {
        ensure_active(ct)?;
        let mut products = self.products.write().await;
        products.insert(product.id, product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product, ct: &CancellationToken) -> Result<bool> {
        ensure_active(ct)?;
        let mut products = self.products.write().await;

        match products.get_mut(&product.id) {
            Some(existing) => {
                // created_at is owned by the store, like the UPDATE statement
                let created_at = existing.created_at;
                *existing = product.clone();
                existing.created_at = created_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid, ct: &CancellationToken) -> Result<()> {
        ensure_active(ct)?;
        let mut products = self.products.write().await;
        products.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use crate::shared::types::PageRequest;
    use rust_decimal::Decimal;

    fn product(name: &str, category: &str) -> Product {
        Product::new(name.to_string(), category.to_string(), None, Decimal::ZERO)
    }

    #[tokio::test]
    async fn test_add_and_get_product() {
        let repo = InMemoryProductRepository::new();
        let ct = CancellationToken::new();
        let p = product("Bamboo Bottle", "Kitchen");

        repo.add(&p, &ct).await.unwrap();

        let fetched = repo.get_by_id(p.id, &ct).await.unwrap();
        assert_eq!(fetched, Some(p));
    }

    #[tokio::test]
    async fn test_update_missing_returns_false() {
        let repo = InMemoryProductRepository::new();
        let ct = CancellationToken::new();

        let updated = repo.update(&product("Ghost", "None"), &ct).await.unwrap();
        assert!(!updated);
        assert_eq!(repo.count().await, 0);
    }

    #[tokio::test]
    async fn test_search_orders_by_name_and_counts_all_matches() {
        let repo = InMemoryProductRepository::new();
        let ct = CancellationToken::new();
        for name in ["Cup", "Apron", "Bottle"] {
            repo.add(&product(name, "Kitchen"), &ct).await.unwrap();
        }

        let filter = ProductFilter::new(None, None, PageRequest::clamped(1, 2));
        let (items, total) = repo.search(&filter, &ct).await.unwrap();

        assert_eq!(total, 3);
        let names: Vec<_> = items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Apron", "Bottle"]);
    }

    #[test]
    fn test_matches_substring_and_exact_category() {
        let filter = ProductFilter::new(
            Some("Bottle".to_string()),
            Some("Kitchen".to_string()),
            PageRequest::default(),
        );

        assert!(is_match(&filter, &product("Bamboo Bottle", "Kitchen")));
        assert!(!is_match(&filter, &product("Bamboo Bottle", "Kitchenware")));
        assert!(!is_match(&filter, &product("Bamboo Cup", "Kitchen")));
        assert!(is_match(&ProductFilter::default(), &product("Cup", "Any")));
    }

    #[tokio::test]
    async fn test_cancelled_token_is_rejected() {
        let repo = InMemoryProductRepository::new();
        let ct = CancellationToken::new();
        ct.cancel();

        let result = repo.get_by_id(Uuid::now_v7(), &ct).await;
        assert!(matches!(result, Err(AppError::Cancelled)));
    }
}
