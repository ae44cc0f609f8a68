//! Public operation set of the product search service.
//!
//! The facade composes the sync engine and the search gateway. Its contract
//! is asymmetric on purpose: read operations degrade to empty payloads with
//! the failure logged, so a broken index renders as "no results" instead of
//! an error page, while mutations report a typed status the caller can act on.

use serde::{Deserialize, Serialize};
use tracing::error;

use product_search_repository::SearchIndexError;
use product_search_shared::{IndexListing, ProductPayload, SearchRequest, SearchResponse};

use crate::gateway::SearchGateway;
use crate::sync::SyncEngine;

/// Result of a mutating operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpStatus {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Machine-readable error kind when the operation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OpStatus {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(error: &SearchIndexError) -> Self {
        Self {
            success: false,
            error: Some(error.kind().to_string()),
        }
    }
}

/// Aggregate report of a full reindex run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReindexReport {
    /// Whether every product synced successfully.
    pub success: bool,
    /// Number of products read from the catalog.
    pub total: usize,
    /// Number of products synced into the index.
    pub succeeded: usize,
    /// Number of products whose sync failed.
    pub failed: usize,
    /// Whether the run was cancelled before dispatching every product.
    pub cancelled: bool,
    /// Machine-readable error kind when the run failed or was partial.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The product search service facade.
///
/// One instance serves both sides of the system: catalog synchronization into
/// the index and query traffic out of it.
pub struct ProductSearchService {
    sync: SyncEngine,
    gateway: SearchGateway,
}

impl ProductSearchService {
    /// Create the facade from its two collaborators.
    pub fn new(sync: SyncEngine, gateway: SearchGateway) -> Self {
        Self { sync, gateway }
    }

    /// Provision the index schema and sync the whole catalog into it.
    ///
    /// A schema conflict or an unreachable store aborts the run and reports
    /// the error kind with zero counts. Per-product failures produce a report
    /// with `success: false` and the `partial_sync_failure` kind while the
    /// successfully synced products stay indexed.
    pub async fn reindex_all(&self) -> ReindexReport {
        match self.sync.full_reindex().await {
            Ok(summary) => {
                let error = if summary.failed > 0 {
                    let partial = SearchIndexError::partial_sync(
                        summary.total,
                        summary.succeeded,
                        summary.failed,
                    );
                    error!(error = %partial, kind = partial.kind(), "Reindex completed with failures");
                    Some(partial.kind().to_string())
                } else {
                    None
                };

                ReindexReport {
                    success: summary.is_complete(),
                    total: summary.total,
                    succeeded: summary.succeeded,
                    failed: summary.failed,
                    cancelled: summary.cancelled,
                    error,
                }
            }
            Err(e) => {
                error!(error = %e, kind = e.kind(), "Reindex aborted");
                ReindexReport {
                    success: false,
                    total: 0,
                    succeeded: 0,
                    failed: 0,
                    cancelled: false,
                    error: Some(e.kind().to_string()),
                }
            }
        }
    }

    /// Request cancellation of an in-flight full reindex.
    pub fn cancel_reindex(&self) {
        self.sync.cancel();
    }

    /// Ranked product search.
    ///
    /// Returns the empty response when the request is invalid or the store is
    /// unreachable; the failure is logged with its kind.
    pub async fn search(&self, request: &SearchRequest) -> SearchResponse {
        match self.gateway.search(request).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, kind = e.kind(), search = %request.search, "Search failed, returning empty response");
                SearchResponse::empty()
            }
        }
    }

    /// List indexed documents. Degrades to an empty listing on failure.
    pub async fn list_indexed(&self, limit: usize, offset: usize) -> IndexListing {
        match self.gateway.list(limit, offset).await {
            Ok(listing) => listing,
            Err(e) => {
                error!(error = %e, kind = e.kind(), "Listing failed, returning empty listing");
                IndexListing::empty()
            }
        }
    }

    /// Index one product from its persisted catalog record.
    pub async fn index_one(&self, payload: &ProductPayload) -> OpStatus {
        match self.sync.index_one(payload).await {
            Ok(()) => OpStatus::ok(),
            Err(e) => {
                error!(error = %e, kind = e.kind(), product_id = %payload.id, "Index one failed");
                OpStatus::failed(&e)
            }
        }
    }

    /// Apply a partial update to one indexed product.
    pub async fn update_one(&self, payload: &ProductPayload) -> OpStatus {
        match self.sync.update_index(payload).await {
            Ok(()) => OpStatus::ok(),
            Err(e) => {
                error!(error = %e, kind = e.kind(), product_id = %payload.id, "Update one failed");
                OpStatus::failed(&e)
            }
        }
    }

    /// Remove one product's document from the index.
    pub async fn remove_one(&self, product_id: &str) -> OpStatus {
        match self.sync.remove_index(product_id).await {
            Ok(()) => OpStatus::ok(),
            Err(e) => {
                error!(error = %e, kind = e.kind(), product_id = %product_id, "Remove one failed");
                OpStatus::failed(&e)
            }
        }
    }

    /// Drop the product index entirely.
    pub async fn clear_all(&self) -> OpStatus {
        match self.sync.clear_index().await {
            Ok(()) => OpStatus::ok(),
            Err(e) => {
                error!(error = %e, kind = e.kind(), "Clear all failed");
                OpStatus::failed(&e)
            }
        }
    }
}
