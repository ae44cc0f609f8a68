//! Postgres catalog reader implementation.
//!
//! Reads the `products` table (`id`, `name`, `uri`, `sale_price`,
//! `product_photo`, `publish`, `category_id`) and resolves category names from
//! the `categories` table (`id`, `name`).

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

use product_search_shared::Product;

use crate::errors::CatalogError;
use crate::interfaces::CatalogReader;

/// Maximum number of pooled Postgres connections.
const MAX_CONNECTIONS: u32 = 10;

/// Row shape read from the `products` table.
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    uri: String,
    sale_price: i64,
    product_photo: String,
    publish: bool,
    category_id: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            uri: row.uri,
            sale_price: row.sale_price,
            product_photo: row.product_photo,
            publish: row.publish,
            category_id: row.category_id,
        }
    }
}

/// Postgres-backed catalog reader.
///
/// The catalog stays authoritative for products and categories; this reader is
/// the only path through which catalog data reaches the search index.
pub struct PostgresCatalogReader {
    pool: PgPool,
}

impl PostgresCatalogReader {
    /// Connect to the catalog database and build a reader.
    ///
    /// # Arguments
    ///
    /// * `database_url` - Postgres connection string
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresCatalogReader)` - Connected reader with a pooled client
    /// * `Err(CatalogError)` - If the connection cannot be established
    pub async fn new(database_url: &str) -> Result<Self, CatalogError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await?;

        info!("Connected to Postgres catalog");
        Ok(Self { pool })
    }

    /// Build a reader over an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogReader for PostgresCatalogReader {
    async fn list_all(&self) -> Result<Vec<Product>, CatalogError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            "SELECT id, name, uri, sale_price, product_photo, publish, category_id
             FROM products
             ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Read products from catalog");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get_by_id(&self, product_id: &str) -> Result<Option<Product>, CatalogError> {
        let row: Option<ProductRow> = sqlx::query_as(
            "SELECT id, name, uri, sale_price, product_photo, publish, category_id
             FROM products
             WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn resolve_category_name(&self, product: &Product) -> Result<String, CatalogError> {
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM categories WHERE id = $1")
            .bind(&product.category_id)
            .fetch_optional(&self.pool)
            .await?;

        name.ok_or_else(|| {
            CatalogError::category_not_found(product.id.clone(), product.category_id.clone())
        })
    }
}
