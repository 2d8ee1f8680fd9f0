use utoipa::{Modify, OpenApi};

use crate::features::products::{dtos as products_dtos, handlers as products_handlers};
use crate::shared::types::{ErrorResponse, PagedResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        products_handlers::get_product,
        products_handlers::search_products,
        products_handlers::create_product,
        products_handlers::update_product,
        products_handlers::delete_product,
    ),
    components(
        schemas(
            ErrorResponse,
            products_dtos::ProductDto,
            products_dtos::CreateProductRequest,
            products_dtos::UpdateProductRequest,
            products_dtos::CreatedProductResponse,
            PagedResponse<products_dtos::ProductDto>,
        )
    ),
    tags(
        (name = "products", description = "Product catalogue management")
    )
)]
pub struct ApiDoc;

/// Overrides the document info with values from `SwaggerConfig`
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
