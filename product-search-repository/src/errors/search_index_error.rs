//! Search index error types.
//!
//! This module defines the unified error taxonomy for all search index
//! operations, covering schema provisioning, synchronization and querying.

use thiserror::Error;

/// Unified errors from search index operations.
///
/// Used by the `SearchIndexProvider` trait and everything layered on top of it.
/// Transport-level faults are classified into this taxonomy at the storage
/// boundary; nothing below the facade throws past it.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// The index already exists with settings or mappings that contradict the
    /// expected schema. Fatal to bulk operations; never auto-repaired.
    #[error("Schema conflict on index '{index}': {detail}")]
    SchemaConflict { index: String, detail: String },

    /// The store could not be reached, timed out, or responded outside its
    /// contract (unexpected status, unparseable body).
    #[error("Store unavailable during {operation}: {detail}")]
    StoreUnavailable { operation: String, detail: String },

    /// The operation targeted a product or document that does not exist.
    /// Deletes treat this as success; updates treat it as an error.
    #[error("{operation} target not found: {id}")]
    NotFound { operation: String, id: String },

    /// The request is structurally invalid (empty search text, bad price
    /// bounds, illegal field keys).
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// A bulk synchronization completed, but a subset of items failed.
    #[error("Partial sync failure: {failed} of {total} items failed")]
    PartialSyncFailure {
        total: usize,
        succeeded: usize,
        failed: usize,
    },
}

impl SearchIndexError {
    /// Create a schema conflict error.
    pub fn schema_conflict(index: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::SchemaConflict {
            index: index.into(),
            detail: detail.into(),
        }
    }

    /// Create a store unavailable error.
    pub fn store_unavailable(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            operation: operation.into(),
            detail: detail.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(operation: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            operation: operation.into(),
            id: id.into(),
        }
    }

    /// Create a malformed request error.
    pub fn malformed_request(msg: impl Into<String>) -> Self {
        Self::MalformedRequest(msg.into())
    }

    /// Create a partial sync failure error.
    pub fn partial_sync(total: usize, succeeded: usize, failed: usize) -> Self {
        Self::PartialSyncFailure {
            total,
            succeeded,
            failed,
        }
    }

    /// Machine-readable kind for structured logging and status payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SchemaConflict { .. } => "schema_conflict",
            Self::StoreUnavailable { .. } => "store_unavailable",
            Self::NotFound { .. } => "not_found",
            Self::MalformedRequest(_) => "malformed_request",
            Self::PartialSyncFailure { .. } => "partial_sync_failure",
        }
    }
}
