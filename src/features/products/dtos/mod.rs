pub mod product_dto;

pub use product_dto::{
    CreateProductRequest, CreatedProductResponse, ProductDto, SearchProductsQuery,
    UpdateProductRequest,
};
