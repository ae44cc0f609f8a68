//! Relational catalog error types.

use thiserror::Error;

/// Errors from reading the relational catalog.
///
/// These stay on the catalog side of the system; the sync engine classifies
/// them into `SearchIndexError` at its boundary.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Underlying database failure.
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// A product references a category row that does not exist.
    #[error("Category '{category_id}' not found for product '{product_id}'")]
    CategoryNotFound {
        product_id: String,
        category_id: String,
    },
}

impl CatalogError {
    /// Create a missing-category error.
    pub fn category_not_found(
        product_id: impl Into<String>,
        category_id: impl Into<String>,
    ) -> Self {
        Self::CategoryNotFound {
            product_id: product_id.into(),
            category_id: category_id.into(),
        }
    }
}
