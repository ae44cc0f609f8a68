//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;

use product_search_shared::{ProductDocument, SearchRequest};

use crate::errors::SearchIndexError;
use crate::types::{FieldUpdates, SearchPage};

/// Abstracts the underlying search index implementation.
///
/// Implementations are injected into the sync engine and the search gateway to
/// enable dependency injection and easy testing with mock implementations.
///
/// All methods return `Result<T, SearchIndexError>`; transport-level faults are
/// classified into the error taxonomy inside the implementation, so callers only
/// ever see typed errors.
///
/// # Index Initialization
///
/// `ensure_schema` must be called before bulk loads. It verifies a pre-existing
/// index against the expected mappings and refuses to proceed on conflict rather
/// than silently writing into an incompatible schema.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Ensure the search index exists with the expected analyzer and mappings.
    ///
    /// Creates the index when absent. When the index already exists, its
    /// mappings are compared against the expected schema; a mismatch surfaces
    /// as `SearchIndexError::SchemaConflict` and the index is never dropped or
    /// recreated automatically.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index is ready for use
    /// * `Err(SearchIndexError)` - If provisioning or verification fails
    async fn ensure_schema(&self) -> Result<(), SearchIndexError>;

    /// Create or replace the document for one product, keyed by product id.
    ///
    /// Re-indexing the same product id overwrites the previous document, so
    /// repeated syncs never accumulate duplicates.
    ///
    /// # Arguments
    ///
    /// * `document` - The denormalized document to store
    async fn upsert_document(&self, document: &ProductDocument) -> Result<(), SearchIndexError>;

    /// Apply a partial field update to the document matching `product_id`.
    ///
    /// Field values travel as bound script parameters, never as interpolated
    /// script source. A product id matching zero documents is an error
    /// (`NotFound`); updates are not upserts.
    ///
    /// # Arguments
    ///
    /// * `product_id` - The id of the document to update
    /// * `updates` - Validated field/value pairs to assign
    async fn update_document(
        &self,
        product_id: &str,
        updates: &FieldUpdates,
    ) -> Result<(), SearchIndexError>;

    /// Delete the document whose `id` field matches `product_id`.
    ///
    /// Deleting an id with no matching document is considered successful.
    async fn delete_document(&self, product_id: &str) -> Result<(), SearchIndexError>;

    /// Execute the ranked product search for `request`.
    ///
    /// Returns the raw page: total count, the documents of the requested page
    /// and the store's suggestion section (if any), in store order.
    async fn search_documents(&self, request: &SearchRequest)
        -> Result<SearchPage, SearchIndexError>;

    /// Execute the related-products similarity query for `request`.
    async fn related_documents(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchPage, SearchIndexError>;

    /// List indexed documents with pagination, most recent store order.
    ///
    /// # Arguments
    ///
    /// * `limit` - Maximum number of documents to return
    /// * `offset` - Number of documents to skip
    async fn list_documents(&self, limit: usize, offset: usize)
        -> Result<SearchPage, SearchIndexError>;

    /// Delete the configured index entirely.
    ///
    /// Only the index this provider is configured for is touched; an absent
    /// index is considered successfully dropped.
    async fn drop_index(&self) -> Result<(), SearchIndexError>;
}
