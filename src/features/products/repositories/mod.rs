#[cfg(test)]
mod in_memory;
mod postgres;
mod product_repository;

#[cfg(test)]
pub use in_memory::InMemoryProductRepository;
pub use postgres::PgProductRepository;
pub use product_repository::ProductRepository;
