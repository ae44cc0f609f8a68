//! Error types for the product search repository.
//!
//! This module provides the unified error taxonomy for search index operations
//! and a separate error type for relational catalog access.

mod catalog_error;
mod search_index_error;

pub use catalog_error::CatalogError;
pub use search_index_error::SearchIndexError;
