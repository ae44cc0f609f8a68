//! Catalog reader trait definition.
//!
//! This module defines the abstract interface for reading the relational
//! catalog that stays authoritative for products and categories.

use async_trait::async_trait;

use product_search_shared::Product;

use crate::errors::CatalogError;

/// Abstracts read access to the relational product catalog.
///
/// The search index is a derived projection; every piece of catalog data that
/// ends up in the index flows through this trait. Implementations are injected
/// into the sync engine, which keeps the engine testable with in-memory
/// catalogs.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Read every product row in the catalog.
    ///
    /// Used by the full reindex. Order is not significant.
    async fn list_all(&self) -> Result<Vec<Product>, CatalogError>;

    /// Fetch the persisted product row for `product_id`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Product))` - The persisted row
    /// * `Ok(None)` - No product with that id exists
    /// * `Err(CatalogError)` - Database failure
    async fn get_by_id(&self, product_id: &str) -> Result<Option<Product>, CatalogError>;

    /// Resolve the current category name for a product.
    ///
    /// This performs one additional fetch against the `categories` table;
    /// callers must not assume it is free. A dangling category reference is an
    /// error, not an empty name.
    async fn resolve_category_name(&self, product: &Product) -> Result<String, CatalogError>;
}
