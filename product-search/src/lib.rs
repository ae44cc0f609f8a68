//! # Product Search
//!
//! Service that keeps an OpenSearch product index in sync with a relational
//! catalog and serves ranked full-text queries over it.
//!
//! ## Architecture
//!
//! The service composes three layers behind a single facade:
//!
//! 1. **Sync Engine**: provisions the index schema and copies catalog rows
//!    into denormalized search documents, with bounded fan-out and
//!    cancellation for full reindexes
//! 2. **Search Gateway**: runs the ranked search, related-products and
//!    listing queries and reshapes raw pages into the response contract
//! 3. **Service Facade**: the public operation set; reads degrade to empty
//!    payloads, mutations report a typed status
//!
//! ## Modules
//!
//! - [`config`]: Dependency initialization and wiring
//! - [`sync`]: Catalog-to-index synchronization
//! - [`gateway`]: Query execution and response shaping
//! - [`facade`]: Public operations

pub mod config;
pub mod facade;
pub mod gateway;
pub mod sync;

// Re-export main types for convenience
pub use config::Dependencies;
pub use facade::{OpStatus, ProductSearchService, ReindexReport};

use product_search_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur while running the service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Search index error
    #[error("Search index error: {0}")]
    SearchIndexError(#[from] SearchIndexError),
}

impl ServiceError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
