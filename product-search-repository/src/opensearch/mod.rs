//! OpenSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch as the backend, plus the index schema definition and the
//! pure query builders shared with tests.

mod index_config;
mod provider;
pub mod queries;

pub use index_config::{get_index_settings, IndexConfig, DEFAULT_INDEX_NAME};
pub use provider::OpenSearchProvider;
