//! # Product Search Shared
//!
//! This crate defines shared data structures and types used across the product search system.
//! It includes the catalog-side product types, the denormalized document indexed in the search
//! engine, and the request/response contracts of the search facade.

pub mod types;

pub use types::product::{Product, ProductPayload};
pub use types::product_document::ProductDocument;
pub use types::search_request::SearchRequest;
pub use types::search_response::{IndexListing, SearchResponse};
