//! # Product Search Repository
//!
//! This crate provides traits and implementations for the two stores behind the
//! product search system: the OpenSearch index that answers queries and the
//! relational catalog that stays authoritative for products and categories.
//! It includes definitions for errors, interfaces, the pure query builders and
//! the concrete OpenSearch and Postgres implementations.

pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod postgres;
pub mod types;

pub use errors::{CatalogError, SearchIndexError};
pub use interfaces::{CatalogReader, SearchIndexProvider};
pub use opensearch::{IndexConfig, OpenSearchProvider};
pub use postgres::PostgresCatalogReader;
pub use types::{FieldUpdates, ReindexOutcome, ReindexSummary, SearchPage};
