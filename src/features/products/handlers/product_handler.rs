use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery, RequestCancellation, ResourcePath};
use crate::features::products::dtos::{
    CreateProductRequest, CreatedProductResponse, ProductDto, SearchProductsQuery,
    UpdateProductRequest,
};
use crate::features::products::models::ProductFilter;
use crate::features::products::services::ProductService;
use crate::shared::types::{ErrorResponse, PageRequest, PagedResponse};

pub const PRODUCTS_PATH: &str = "/api/products";
pub const PRODUCT_PATH: &str = "/api/products/{id}";

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductDto),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(service): State<Arc<ProductService>>,
    RequestCancellation(ct): RequestCancellation,
    ResourcePath(id): ResourcePath<Uuid>,
) -> Result<Json<ProductDto>> {
    let product = service
        .get(id, &ct)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product with id {} not found", id)))?;
    Ok(Json(product))
}

/// Search products by name substring and exact category, ordered by name.
///
/// `page` is raised to at least 1 and `pageSize` is clamped to 1..=100 for the
/// lookup; the response echoes the values as requested.
#[utoipa::path(
    get,
    path = "/api/products",
    params(SearchProductsQuery),
    responses(
        (status = 200, description = "One page of matching products", body = PagedResponse<ProductDto>),
        (status = 400, description = "Malformed query string", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn search_products(
    State(service): State<Arc<ProductService>>,
    RequestCancellation(ct): RequestCancellation,
    AppQuery(query): AppQuery<SearchProductsQuery>,
) -> Result<Json<PagedResponse<ProductDto>>> {
    let window = PageRequest::clamped(query.page, query.page_size);
    let filter = ProductFilter::new(query.q, query.category, window);

    let (items, total) = service.search(&filter, &ct).await?;
    Ok(Json(PagedResponse::new(
        items,
        total,
        query.page,
        query.page_size,
    )))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = CreatedProductResponse,
            headers(("Location" = String, description = "URL of the new product"))),
        (status = 400, description = "Validation error", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn create_product(
    State(service): State<Arc<ProductService>>,
    RequestCancellation(ct): RequestCancellation,
    AppJson(request): AppJson<CreateProductRequest>,
) -> Result<impl IntoResponse> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let id = service.create(request, &ct).await?;
    let location = format!("{}/{}", PRODUCTS_PATH, id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(CreatedProductResponse { id }),
    ))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 204, description = "Product updated"),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn update_product(
    State(service): State<Arc<ProductService>>,
    RequestCancellation(ct): RequestCancellation,
    ResourcePath(id): ResourcePath<Uuid>,
    AppJson(request): AppJson<UpdateProductRequest>,
) -> Result<StatusCode> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service.update(id, request, &ct).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a product (idempotent)
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted or did not exist")
    ),
    tag = "products"
)]
pub async fn delete_product(
    State(service): State<Arc<ProductService>>,
    RequestCancellation(ct): RequestCancellation,
    ResourcePath(id): ResourcePath<Uuid>,
) -> Result<StatusCode> {
    service.delete(id, &ct).await?;
    Ok(StatusCode::NO_CONTENT)
}
