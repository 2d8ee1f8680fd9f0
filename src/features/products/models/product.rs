use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::shared::types::PageRequest;

/// Database model for product
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Build a product that has not been persisted yet, with a fresh time-ordered id
    pub fn new(
        name: String,
        category: String,
        description: Option<String>,
        price: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name,
            category,
            description,
            price,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Search criteria for products.
///
/// Blank strings are normalized to `None`, so "no filter" has one representation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub query: Option<String>,
    pub category: Option<String>,
    pub window: PageRequest,
}

impl ProductFilter {
    pub fn new(query: Option<String>, category: Option<String>, window: PageRequest) -> Self {
        Self {
            query: non_blank(query),
            category: non_blank(category),
            window,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(name: &str, category: &str) -> Product {
        Product::new(name.to_string(), category.to_string(), None, Decimal::ZERO)
    }

    #[test]
    fn test_new_product_timestamps_match() {
        let p = product("Bamboo Bottle", "Kitchen");
        assert_eq!(p.created_at, p.updated_at);
        assert_ne!(p.id, Uuid::nil());
    }

    #[test]
    fn test_filter_normalizes_blank_values() {
        let filter = ProductFilter::new(
            Some("   ".to_string()),
            Some(String::new()),
            PageRequest::default(),
        );
        assert_eq!(filter.query, None);
        assert_eq!(filter.category, None);
    }
}
