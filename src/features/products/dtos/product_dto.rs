use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::features::products::models::Product;
use crate::shared::constants::DEFAULT_PAGE_SIZE;

/// Largest price magnitude the `NUMERIC(12, 2)` column holds, exclusive
const PRICE_LIMIT: i64 = 10_000_000_000;

/// Fractional digits kept by the `price` column
const PRICE_SCALE: u32 = 2;

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price < Decimal::ZERO {
        return Err(ValidationError::new("price_negative")
            .with_message("price must not be negative".into()));
    }
    if *price >= Decimal::from(PRICE_LIMIT) {
        return Err(ValidationError::new("price_range")
            .with_message("price must be less than 10000000000".into()));
    }
    // Trailing zeros do not count.
    if price.normalize().scale() > PRICE_SCALE {
        return Err(ValidationError::new("price_scale")
            .with_message("price must have at most 2 decimal places".into()));
    }
    Ok(())
}

/// Postgres text columns reject the NUL character
fn validate_no_nul(value: &str) -> Result<(), ValidationError> {
    if value.contains('\0') {
        return Err(ValidationError::new("nul_character")
            .with_message("text must not contain NUL characters".into()));
    }
    Ok(())
}

// Helper functions for defaults
fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Query params for searching products.
///
/// `page` and `pageSize` are accepted as sent; the handler clamps them.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchProductsQuery {
    /// Substring to look for in the product name
    pub q: Option<String>,

    /// Exact category to filter on
    pub category: Option<String>,

    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1, default = 1)]
    pub page: i64,

    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100, default = 10)]
    pub page_size: i64,
}

// Create request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200), custom(function = "validate_no_nul"))]
    #[schema(example = "Bamboo Bottle")]
    pub name: String,

    #[validate(length(min = 1, max = 100), custom(function = "validate_no_nul"))]
    #[schema(example = "Kitchen")]
    pub category: String,

    #[validate(length(max = 2000), custom(function = "validate_no_nul"))]
    pub description: Option<String>,

    #[validate(custom(function = "validate_price"))]
    #[serde(default)]
    #[schema(value_type = String, example = "12.50")]
    pub price: Decimal,
}

// Update request (full replacement of the mutable fields)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200), custom(function = "validate_no_nul"))]
    pub name: String,

    #[validate(length(min = 1, max = 100), custom(function = "validate_no_nul"))]
    pub category: String,

    #[validate(length(max = 2000), custom(function = "validate_no_nul"))]
    pub description: Option<String>,

    #[validate(custom(function = "validate_price"))]
    #[serde(default)]
    #[schema(value_type = String, example = "12.50")]
    pub price: Decimal,
}

// Response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "12.50")]
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            category: p.category,
            description: p.description,
            price: p.price,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Body of a 201 response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedProductResponse {
    pub id: Uuid,
}
