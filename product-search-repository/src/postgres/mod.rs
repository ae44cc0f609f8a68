//! Postgres implementation of the catalog reader.
//!
//! This module provides a concrete implementation of `CatalogReader` backed by
//! the relational catalog database.

mod catalog_reader;

pub use catalog_reader::PostgresCatalogReader;
