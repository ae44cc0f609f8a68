//! Query execution and response shaping.
//!
//! The gateway validates inbound requests, runs them through the search index
//! provider and recombines the raw pages into the caller-facing response
//! contract. It holds no query-building logic of its own; the ranked bodies
//! live with the provider.

use std::sync::Arc;

use tracing::instrument;

use product_search_repository::{SearchIndexError, SearchIndexProvider};
use product_search_shared::{IndexListing, SearchRequest, SearchResponse};

/// Executes search queries and reshapes results.
pub struct SearchGateway {
    provider: Arc<dyn SearchIndexProvider>,
}

impl SearchGateway {
    /// Create a new gateway over a search index provider.
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self { provider }
    }

    /// Run the ranked search and the related-products query for one request.
    ///
    /// The primary page supplies `count`, `rows` and the verbatim suggest
    /// section; the related page contributes only its documents. A request
    /// that fails validation is rejected before anything reaches the store.
    #[instrument(skip(self, request), fields(search = %request.search))]
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchIndexError> {
        request
            .validate()
            .map_err(SearchIndexError::malformed_request)?;

        let page = self.provider.search_documents(request).await?;
        let related = self.provider.related_documents(request).await?;

        Ok(SearchResponse {
            count: page.count,
            rows: page.docs,
            results_related: related.docs,
            suggest: page.suggest,
        })
    }

    /// List indexed documents with pagination.
    pub async fn list(&self, limit: usize, offset: usize) -> Result<IndexListing, SearchIndexError> {
        let page = self.provider.list_documents(limit, offset).await?;
        Ok(IndexListing {
            count: page.count,
            rows: page.docs,
        })
    }
}
