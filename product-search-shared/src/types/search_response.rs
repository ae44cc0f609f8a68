//! Search response types for the product search facade.
//!
//! This module defines the response structures returned from search and listing operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::product_document::ProductDocument;

/// Complete search response with primary results, related products and suggestions.
///
/// This is the stable caller-facing shape: `count` is the total number of
/// matching documents (which may exceed `rows.len()` due to pagination),
/// `results_related` carries the secondary "related products" query results,
/// and `suggest` passes the store's term-suggester section through verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Total number of matching documents.
    pub count: u64,

    /// The page of matching documents, ordered by relevance.
    pub rows: Vec<ProductDocument>,

    /// Related products from the secondary similarity query.
    pub results_related: Vec<ProductDocument>,

    /// Raw suggestion section from the store, passed through unmodified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggest: Option<Value>,
}

impl SearchResponse {
    /// Create an empty search response.
    ///
    /// This is also the degraded payload returned when a read fails.
    pub fn empty() -> Self {
        Self {
            count: 0,
            rows: Vec::new(),
            results_related: Vec::new(),
            suggest: None,
        }
    }

    /// Returns true if there are no results.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows in this page.
    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Response shape for the index listing operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexListing {
    /// Total number of documents in the index.
    pub count: u64,

    /// The requested page of documents.
    pub rows: Vec<ProductDocument>,
}

impl IndexListing {
    /// Create an empty listing.
    pub fn empty() -> Self {
        Self {
            count: 0,
            rows: Vec::new(),
        }
    }
}
