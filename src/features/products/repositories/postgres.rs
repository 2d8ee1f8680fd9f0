use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::cancellation::run_cancellable;
use crate::core::error::Result;
use crate::features::products::models::{Product, ProductFilter};
use crate::features::products::repositories::ProductRepository;

const PRODUCT_COLUMNS: &str = "id, name, category, description, price, created_at, updated_at";

/// Postgres-backed [`ProductRepository`]
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl std::fmt::Debug for PgProductRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgProductRepository")
            .field("pool", &"<PgPool>")
            .finish()
    }
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Wrap `query` in `%...%`, escaping LIKE metacharacters so it matches literally
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Append the WHERE clause for `filter`. Shared by the count and page queries
/// so both always see the same predicates.
fn push_predicates(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    let mut separator = " WHERE ";

    if let Some(query) = filter.query.as_deref() {
        builder
            .push(separator)
            .push("name LIKE ")
            .push_bind(like_pattern(query))
            .push(" ESCAPE '\\'");
        separator = " AND ";
    }

    if let Some(category) = filter.category.as_deref() {
        builder
            .push(separator)
            .push("category = ")
            .push_bind(category.to_string());
    }
}

fn count_query(filter: &ProductFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM products");
    push_predicates(&mut builder, filter);
    builder
}

fn page_query(filter: &ProductFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM products", PRODUCT_COLUMNS));
    push_predicates(&mut builder, filter);
    // id breaks ties between equal names so consecutive pages never overlap
    builder
        .push(" ORDER BY name ASC, id ASC LIMIT ")
        .push_bind(filter.window.limit())
        .push(" OFFSET ")
        .push_bind(filter.window.offset());
    builder
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn get_by_id(&self, id: Uuid, ct: &CancellationToken) -> Result<Option<Product>> {
        let query = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);

        run_cancellable(
            ct,
            sqlx::query_as::<_, Product>(&query)
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn search(
        &self,
        filter: &ProductFilter,
        ct: &CancellationToken,
    ) -> Result<(Vec<Product>, i64)> {
        let mut count = count_query(filter);
        let total: i64 = run_cancellable(
            ct,
            count.build_query_scalar::<i64>().fetch_one(&self.pool),
        )
        .await?;

        // Nothing can land in the window, skip the second round trip
        if total <= filter.window.offset() {
            return Ok((Vec::new(), total));
        }

        let mut page = page_query(filter);
        let items = run_cancellable(
            ct,
            page.build_query_as::<Product>().fetch_all(&self.pool),
        )
        .await?;

        tracing::debug!(
            total,
            returned = items.len(),
            page = filter.window.page(),
            page_size = filter.window.page_size(),
            "Searched products"
        );

        Ok((items, total))
    }

    async fn add(&self, product: &Product, ct: &CancellationToken) -> Result<()> {
        run_cancellable(
            ct,
            sqlx::query(
                r#"
                INSERT INTO products (id, name, category, description, price, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(product.id)
            .bind(&product.name)
            .bind(&product.category)
            .bind(&product.description)
            .bind(product.price)
            .bind(product.created_at)
            .bind(product.updated_at)
            .execute(&self.pool),
        )
        .await?;

        tracing::info!(product_id = %product.id, "Created product");
        Ok(())
    }

    async fn update(&self, product: &Product, ct: &CancellationToken) -> Result<bool> {
        let result = run_cancellable(
            ct,
            sqlx::query(
                r#"
                UPDATE products
                SET name = $2,
                    category = $3,
                    description = $4,
                    price = $5,
                    updated_at = $6
                WHERE id = $1
                "#,
            )
            .bind(product.id)
            .bind(&product.name)
            .bind(&product.category)
            .bind(&product.description)
            .bind(product.price)
            .bind(product.updated_at)
            .execute(&self.pool),
        )
        .await?;

        let updated = result.rows_affected() > 0;
        if updated {
            tracing::info!(product_id = %product.id, "Updated product");
        }
        Ok(updated)
    }

    async fn delete(&self, id: Uuid, ct: &CancellationToken) -> Result<()> {
        let result = run_cancellable(
            ct,
            sqlx::query("DELETE FROM products WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() > 0 {
            tracing::info!(product_id = %id, "Deleted product");
        }
        Ok(())
    }
}
