//! Interface definitions for the product search stores.
//!
//! This module defines the abstract `SearchIndexProvider` and `CatalogReader`
//! traits that allow for dependency injection and swappable implementations.

mod catalog_reader;
mod search_index_provider;

pub use catalog_reader::CatalogReader;
pub use search_index_provider::SearchIndexProvider;
