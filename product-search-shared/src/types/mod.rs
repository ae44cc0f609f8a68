//! This module defines the core data structures and types used across the product search system.
//! It re-exports the catalog, document and contract types.

pub mod product;
pub mod product_document;
pub mod search_request;
pub mod search_response;

pub use product::{Product, ProductPayload};
pub use product_document::ProductDocument;
pub use search_request::SearchRequest;
pub use search_response::{IndexListing, SearchResponse};
