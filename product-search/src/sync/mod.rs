//! Catalog-to-index synchronization engine.
//!
//! Copies the relational catalog into the search index: full reindexes with
//! bounded fan-out and cooperative cancellation, single-product upserts,
//! partial field updates and idempotent deletes. Every document is built from
//! the persisted catalog row; inbound payloads never supply the category name.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::sync::{watch, Semaphore};
use tracing::{debug, info, instrument, warn};

use product_search_repository::{
    CatalogError, CatalogReader, FieldUpdates, ReindexOutcome, ReindexSummary, SearchIndexError,
    SearchIndexProvider,
};
use product_search_shared::{ProductDocument, ProductPayload};

/// Configuration for the sync engine.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Maximum number of in-flight upserts during a full reindex.
    pub reindex_concurrency: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            reindex_concurrency: 8,
        }
    }
}

/// Synchronizes the relational catalog into the search index.
///
/// The engine is constructed with its two collaborators injected, which keeps
/// it testable with in-memory implementations. A full reindex dispatches one
/// task per product, bounded by a semaphore sized from `SyncConfig`; calling
/// [`SyncEngine::cancel`] stops further dispatch while in-flight items run to
/// completion.
pub struct SyncEngine {
    catalog: Arc<dyn CatalogReader>,
    provider: Arc<dyn SearchIndexProvider>,
    config: SyncConfig,
    cancel_tx: watch::Sender<bool>,
}

/// Classify a catalog-side failure into the search index taxonomy.
fn classify_catalog_error(operation: &'static str, err: CatalogError) -> SearchIndexError {
    match err {
        CatalogError::DatabaseError(e) => {
            SearchIndexError::store_unavailable(operation, e.to_string())
        }
        CatalogError::CategoryNotFound {
            product_id,
            category_id,
        } => SearchIndexError::not_found(
            operation,
            format!("{} (category {})", product_id, category_id),
        ),
    }
}

impl SyncEngine {
    /// Create a new sync engine.
    ///
    /// # Arguments
    ///
    /// * `catalog` - Reader for the authoritative relational catalog
    /// * `provider` - The search index implementation to sync into
    /// * `config` - Concurrency bounds for bulk operations
    pub fn new(
        catalog: Arc<dyn CatalogReader>,
        provider: Arc<dyn SearchIndexProvider>,
        config: SyncConfig,
    ) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            catalog,
            provider,
            config,
            cancel_tx,
        }
    }

    /// Request cancellation of an in-flight full reindex.
    ///
    /// In-flight upserts run to completion; no further products are
    /// dispatched. Calling this with no reindex running only affects the run
    /// that is currently active, because each run resets the flag on start.
    pub fn cancel(&self) {
        info!("Reindex cancellation requested");
        self.cancel_tx.send_replace(true);
    }

    /// Provision the schema and sync every catalog product into the index.
    ///
    /// The schema check runs first: a `SchemaConflict` aborts the run before
    /// any document is written. Per-product failures (a dangling category, a
    /// rejected upsert) never abort the run; they are recorded in the summary
    /// while the remaining products continue.
    #[instrument(skip(self))]
    pub async fn full_reindex(&self) -> Result<ReindexSummary, SearchIndexError> {
        self.provider.ensure_schema().await?;

        let products = self
            .catalog
            .list_all()
            .await
            .map_err(|e| classify_catalog_error("reindex", e))?;
        let total = products.len();

        info!(
            total = total,
            concurrency = self.config.reindex_concurrency,
            "Starting full reindex"
        );

        // Each run starts with a fresh cancellation flag; subscribing after
        // the reset means the receiver only sees cancellations for this run.
        self.cancel_tx.send_replace(false);
        let mut cancel_rx = self.cancel_tx.subscribe();

        let semaphore = Arc::new(Semaphore::new(self.config.reindex_concurrency));
        let mut handles = Vec::with_capacity(total);
        let mut cancelled = false;

        for product in products {
            if *cancel_rx.borrow() {
                cancelled = true;
                break;
            }

            let permit = tokio::select! {
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    // The semaphore is never closed while the run is alive
                    Err(_) => break,
                },
                _ = cancel_rx.changed() => {
                    cancelled = true;
                    break;
                }
            };

            if *cancel_rx.borrow() {
                cancelled = true;
                break;
            }

            let catalog = Arc::clone(&self.catalog);
            let provider = Arc::clone(&self.provider);
            let product_id = product.id.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let category_name = catalog
                    .resolve_category_name(&product)
                    .await
                    .map_err(|e| classify_catalog_error("reindex", e))?;
                let document = ProductDocument::from_product(&product, category_name);
                provider.upsert_document(&document).await
            });

            handles.push((product_id, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        let mut succeeded = 0;
        let mut failed = 0;

        for (product_id, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(SearchIndexError::store_unavailable(
                    "reindex",
                    format!("Sync task for '{}' did not complete: {}", product_id, e),
                )),
            };

            match result {
                Ok(()) => {
                    succeeded += 1;
                    outcomes.push(ReindexOutcome {
                        product_id,
                        success: true,
                        error: None,
                    });
                }
                Err(e) => {
                    failed += 1;
                    warn!(product_id = %product_id, error = %e, "Product sync failed");
                    outcomes.push(ReindexOutcome {
                        product_id,
                        success: false,
                        error: Some(e),
                    });
                }
            }
        }

        let summary = ReindexSummary {
            total,
            succeeded,
            failed,
            cancelled,
            outcomes,
        };

        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            cancelled = summary.cancelled,
            "Full reindex finished"
        );

        Ok(summary)
    }

    /// Index a single product from its persisted catalog record.
    ///
    /// The payload only names the product; the document is built from the row
    /// the catalog currently holds, with the category name resolved fresh.
    /// A payload id with no catalog row is `NotFound`.
    #[instrument(skip(self, payload), fields(product_id = %payload.id))]
    pub async fn index_one(&self, payload: &ProductPayload) -> Result<(), SearchIndexError> {
        let product = self
            .catalog
            .get_by_id(&payload.id)
            .await
            .map_err(|e| classify_catalog_error("index", e))?
            .ok_or_else(|| SearchIndexError::not_found("index", payload.id.as_str()))?;

        let category_name = self
            .catalog
            .resolve_category_name(&product)
            .await
            .map_err(|e| classify_catalog_error("index", e))?;

        let document = ProductDocument::from_payload(payload, category_name);
        self.provider.upsert_document(&document).await?;

        debug!("Product indexed");
        Ok(())
    }

    /// Apply a partial update to an already indexed product.
    ///
    /// Only the fields present in the payload are touched, plus two refreshed
    /// denormalized fields: the category name is re-resolved from the catalog
    /// (so a renamed category heals on the next update) and the indexing
    /// timestamp is advanced. The product must exist both in the catalog and
    /// in the index.
    #[instrument(skip(self, payload), fields(product_id = %payload.id))]
    pub async fn update_index(&self, payload: &ProductPayload) -> Result<(), SearchIndexError> {
        let product = self
            .catalog
            .get_by_id(&payload.id)
            .await
            .map_err(|e| classify_catalog_error("update", e))?
            .ok_or_else(|| SearchIndexError::not_found("update", payload.id.as_str()))?;

        let category_name = self
            .catalog
            .resolve_category_name(&product)
            .await
            .map_err(|e| classify_catalog_error("update", e))?;

        let updates = FieldUpdates::from_payload(payload)
            .set("cateName", json!(category_name))
            .set("indexedAt", json!(Utc::now()));

        self.provider.update_document(&payload.id, &updates).await?;

        debug!(fields = updates.len(), "Product document updated");
        Ok(())
    }

    /// Remove a product's document from the index.
    ///
    /// Removing an id that is not indexed is a successful no-op, so retries
    /// and out-of-order delete events stay harmless.
    #[instrument(skip(self))]
    pub async fn remove_index(&self, product_id: &str) -> Result<(), SearchIndexError> {
        self.provider.delete_document(product_id).await?;
        debug!(product_id = %product_id, "Product document removed");
        Ok(())
    }

    /// Drop the entire product index.
    pub async fn clear_index(&self) -> Result<(), SearchIndexError> {
        self.provider.drop_index().await?;
        info!("Search index cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::{mpsc, Notify};

    use product_search_repository::SearchPage;
    use product_search_shared::{Product, SearchRequest};

    fn product(id: &str, name: &str, category_id: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            uri: format!("/products/{}", id),
            sale_price: 100,
            product_photo: format!("https://cdn.example.com/{}.jpg", id),
            publish: true,
            category_id: category_id.to_string(),
        }
    }

    fn categories(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(id, name)| (id.to_string(), name.to_string()))
            .collect()
    }

    struct StubCatalog {
        products: Vec<Product>,
        categories: HashMap<String, String>,
    }

    #[async_trait]
    impl CatalogReader for StubCatalog {
        async fn list_all(&self) -> Result<Vec<Product>, CatalogError> {
            Ok(self.products.clone())
        }

        async fn get_by_id(&self, product_id: &str) -> Result<Option<Product>, CatalogError> {
            Ok(self.products.iter().find(|p| p.id == product_id).cloned())
        }

        async fn resolve_category_name(&self, product: &Product) -> Result<String, CatalogError> {
            self.categories
                .get(&product.category_id)
                .cloned()
                .ok_or_else(|| {
                    CatalogError::category_not_found(
                        product.id.as_str(),
                        product.category_id.as_str(),
                    )
                })
        }
    }

    #[derive(Default)]
    struct RecordingProvider {
        upserted: Mutex<Vec<ProductDocument>>,
        updated: Mutex<Vec<(String, FieldUpdates)>>,
        deleted: Mutex<Vec<String>>,
        dropped: Mutex<usize>,
        schema_calls: Mutex<usize>,
        fail_upsert_for: Option<String>,
        schema_conflict: bool,
        missing_update_target: bool,
    }

    #[async_trait]
    impl SearchIndexProvider for RecordingProvider {
        async fn ensure_schema(&self) -> Result<(), SearchIndexError> {
            if self.schema_conflict {
                return Err(SearchIndexError::schema_conflict(
                    "products",
                    "name mapping differs",
                ));
            }
            *self.schema_calls.lock().unwrap() += 1;
            Ok(())
        }

        async fn upsert_document(&self, document: &ProductDocument) -> Result<(), SearchIndexError> {
            if self.fail_upsert_for.as_deref() == Some(document.id.as_str()) {
                return Err(SearchIndexError::store_unavailable("index", "write rejected"));
            }
            self.upserted.lock().unwrap().push(document.clone());
            Ok(())
        }

        async fn update_document(
            &self,
            product_id: &str,
            updates: &FieldUpdates,
        ) -> Result<(), SearchIndexError> {
            if self.missing_update_target {
                return Err(SearchIndexError::not_found("update", product_id));
            }
            self.updated
                .lock()
                .unwrap()
                .push((product_id.to_string(), updates.clone()));
            Ok(())
        }

        async fn delete_document(&self, product_id: &str) -> Result<(), SearchIndexError> {
            self.deleted.lock().unwrap().push(product_id.to_string());
            Ok(())
        }

        async fn search_documents(
            &self,
            _request: &SearchRequest,
        ) -> Result<SearchPage, SearchIndexError> {
            Ok(SearchPage::empty())
        }

        async fn related_documents(
            &self,
            _request: &SearchRequest,
        ) -> Result<SearchPage, SearchIndexError> {
            Ok(SearchPage::empty())
        }

        async fn list_documents(
            &self,
            _limit: usize,
            _offset: usize,
        ) -> Result<SearchPage, SearchIndexError> {
            Ok(SearchPage::empty())
        }

        async fn drop_index(&self) -> Result<(), SearchIndexError> {
            *self.dropped.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn engine_with(
        catalog: StubCatalog,
        provider: Arc<RecordingProvider>,
        concurrency: usize,
    ) -> SyncEngine {
        SyncEngine::new(
            Arc::new(catalog),
            provider as Arc<dyn SearchIndexProvider>,
            SyncConfig {
                reindex_concurrency: concurrency,
            },
        )
    }

    #[tokio::test]
    async fn test_full_reindex_syncs_every_product() {
        let catalog = StubCatalog {
            products: vec![
                product("p-1", "Mechanical keyboard", "c-1"),
                product("p-2", "USB hub", "c-2"),
                product("p-3", "Standing desk", "c-1"),
            ],
            categories: categories(&[("c-1", "Work Setup"), ("c-2", "Phụ kiện")]),
        };
        let provider = Arc::new(RecordingProvider::default());
        let engine = engine_with(catalog, Arc::clone(&provider), 4);

        let summary = engine.full_reindex().await.unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed, 0);
        assert!(!summary.cancelled);
        assert!(summary.is_complete());
        assert_eq!(*provider.schema_calls.lock().unwrap(), 1);

        let upserted = provider.upserted.lock().unwrap();
        assert_eq!(upserted.len(), 3);
        let hub = upserted.iter().find(|d| d.id == "p-2").unwrap();
        assert_eq!(hub.cate_name.as_deref(), Some("Phụ kiện"));
    }

    #[tokio::test]
    async fn test_full_reindex_records_partial_failures() {
        let catalog = StubCatalog {
            products: vec![
                product("p-1", "Mechanical keyboard", "c-1"),
                product("p-2", "USB hub", "c-1"),
                product("p-3", "Standing desk", "c-1"),
            ],
            categories: categories(&[("c-1", "Work Setup")]),
        };
        let provider = Arc::new(RecordingProvider {
            fail_upsert_for: Some("p-2".to_string()),
            ..RecordingProvider::default()
        });
        let engine = engine_with(catalog, Arc::clone(&provider), 4);

        let summary = engine.full_reindex().await.unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(!summary.is_complete());

        let failed_outcome = summary
            .outcomes
            .iter()
            .find(|o| o.product_id == "p-2")
            .unwrap();
        assert!(!failed_outcome.success);
        assert_eq!(
            failed_outcome.error.as_ref().unwrap().kind(),
            "store_unavailable"
        );
    }

    #[tokio::test]
    async fn test_full_reindex_aborts_on_schema_conflict() {
        let catalog = StubCatalog {
            products: vec![product("p-1", "Mechanical keyboard", "c-1")],
            categories: categories(&[("c-1", "Work Setup")]),
        };
        let provider = Arc::new(RecordingProvider {
            schema_conflict: true,
            ..RecordingProvider::default()
        });
        let engine = engine_with(catalog, Arc::clone(&provider), 4);

        let err = engine.full_reindex().await.unwrap_err();

        assert!(matches!(err, SearchIndexError::SchemaConflict { .. }));
        assert!(provider.upserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_full_reindex_dangling_category_fails_only_that_product() {
        let catalog = StubCatalog {
            products: vec![
                product("p-1", "Mechanical keyboard", "c-1"),
                product("p-2", "Orphaned gadget", "c-404"),
            ],
            categories: categories(&[("c-1", "Work Setup")]),
        };
        let provider = Arc::new(RecordingProvider::default());
        let engine = engine_with(catalog, Arc::clone(&provider), 4);

        let summary = engine.full_reindex().await.unwrap();

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);

        let failed_outcome = summary
            .outcomes
            .iter()
            .find(|o| o.product_id == "p-2")
            .unwrap();
        assert_eq!(failed_outcome.error.as_ref().unwrap().kind(), "not_found");
    }

    /// Provider whose upserts block on a gate, so the test controls exactly
    /// when the first in-flight item completes relative to cancellation.
    struct GatedProvider {
        started_tx: mpsc::UnboundedSender<String>,
        gate: Arc<Notify>,
        upserted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SearchIndexProvider for GatedProvider {
        async fn ensure_schema(&self) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn upsert_document(&self, document: &ProductDocument) -> Result<(), SearchIndexError> {
            let _ = self.started_tx.send(document.id.clone());
            self.gate.notified().await;
            self.upserted.lock().unwrap().push(document.id.clone());
            Ok(())
        }

        async fn update_document(
            &self,
            _product_id: &str,
            _updates: &FieldUpdates,
        ) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn delete_document(&self, _product_id: &str) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn search_documents(
            &self,
            _request: &SearchRequest,
        ) -> Result<SearchPage, SearchIndexError> {
            Ok(SearchPage::empty())
        }

        async fn related_documents(
            &self,
            _request: &SearchRequest,
        ) -> Result<SearchPage, SearchIndexError> {
            Ok(SearchPage::empty())
        }

        async fn list_documents(
            &self,
            _limit: usize,
            _offset: usize,
        ) -> Result<SearchPage, SearchIndexError> {
            Ok(SearchPage::empty())
        }

        async fn drop_index(&self) -> Result<(), SearchIndexError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_cancellation_stops_dispatch_but_finishes_in_flight() {
        let catalog = StubCatalog {
            products: vec![
                product("p-1", "Mechanical keyboard", "c-1"),
                product("p-2", "USB hub", "c-1"),
                product("p-3", "Standing desk", "c-1"),
            ],
            categories: categories(&[("c-1", "Work Setup")]),
        };

        let (started_tx, mut started_rx) = mpsc::unbounded_channel();
        let gate = Arc::new(Notify::new());
        let provider = Arc::new(GatedProvider {
            started_tx,
            gate: Arc::clone(&gate),
            upserted: Mutex::new(Vec::new()),
        });

        let engine = Arc::new(SyncEngine::new(
            Arc::new(catalog),
            Arc::clone(&provider) as Arc<dyn SearchIndexProvider>,
            SyncConfig {
                reindex_concurrency: 1,
            },
        ));

        let run = tokio::spawn({
            let engine = Arc::clone(&engine);
            async move { engine.full_reindex().await }
        });

        // The first upsert is in flight and holds the only permit.
        let first = started_rx.recv().await.unwrap();
        assert_eq!(first, "p-1");

        engine.cancel();
        gate.notify_one();

        let summary = run.await.unwrap().unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(*provider.upserted.lock().unwrap(), vec!["p-1"]);
    }

    #[tokio::test]
    async fn test_index_one_uses_persisted_category_not_payload() {
        let catalog = StubCatalog {
            products: vec![product("p-1", "Mechanical keyboard", "c-1")],
            categories: categories(&[("c-1", "Work Setup")]),
        };
        let provider = Arc::new(RecordingProvider::default());
        let engine = engine_with(catalog, Arc::clone(&provider), 4);

        let mut payload = ProductPayload::for_id("p-1");
        payload.name = Some("Mechanical keyboard".to_string());
        payload.publish = Some(true);
        payload.category = Some("Totally Made Up".to_string());

        engine.index_one(&payload).await.unwrap();

        let upserted = provider.upserted.lock().unwrap();
        assert_eq!(upserted.len(), 1);
        assert_eq!(upserted[0].cate_name.as_deref(), Some("Work Setup"));
        assert!(upserted[0].publish);
    }

    #[tokio::test]
    async fn test_index_one_unknown_product_is_not_found() {
        let catalog = StubCatalog {
            products: Vec::new(),
            categories: HashMap::new(),
        };
        let provider = Arc::new(RecordingProvider::default());
        let engine = engine_with(catalog, Arc::clone(&provider), 4);

        let err = engine
            .index_one(&ProductPayload::for_id("p-404"))
            .await
            .unwrap_err();

        assert!(matches!(err, SearchIndexError::NotFound { .. }));
        assert!(provider.upserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_refreshes_category_name_and_timestamp() {
        // The catalog already carries the renamed category; the update must
        // push the fresh name even though the payload never mentions it.
        let catalog = StubCatalog {
            products: vec![product("p-1", "Mechanical keyboard", "c-1")],
            categories: categories(&[("c-1", "Home Office")]),
        };
        let provider = Arc::new(RecordingProvider::default());
        let engine = engine_with(catalog, Arc::clone(&provider), 4);

        let mut payload = ProductPayload::for_id("p-1");
        payload.sale_price = Some(999);

        engine.update_index(&payload).await.unwrap();

        let updated = provider.updated.lock().unwrap();
        assert_eq!(updated.len(), 1);
        let (id, updates) = &updated[0];
        assert_eq!(id, "p-1");

        let map = updates.as_map();
        assert_eq!(map["salePrice"], json!(999));
        assert_eq!(map["cateName"], json!("Home Office"));
        assert!(map.contains_key("indexedAt"));
        assert!(!map.contains_key("id"));
    }

    #[tokio::test]
    async fn test_update_unknown_product_is_not_found() {
        let catalog = StubCatalog {
            products: Vec::new(),
            categories: HashMap::new(),
        };
        let provider = Arc::new(RecordingProvider::default());
        let engine = engine_with(catalog, Arc::clone(&provider), 4);

        let err = engine
            .update_index(&ProductPayload::for_id("p-404"))
            .await
            .unwrap_err();

        assert!(matches!(err, SearchIndexError::NotFound { .. }));
        assert!(provider.updated.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_document_propagates_not_found() {
        let catalog = StubCatalog {
            products: vec![product("p-1", "Mechanical keyboard", "c-1")],
            categories: categories(&[("c-1", "Work Setup")]),
        };
        let provider = Arc::new(RecordingProvider {
            missing_update_target: true,
            ..RecordingProvider::default()
        });
        let engine = engine_with(catalog, Arc::clone(&provider), 4);

        let err = engine
            .update_index(&ProductPayload::for_id("p-1"))
            .await
            .unwrap_err();

        assert!(matches!(err, SearchIndexError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_remove_index_is_idempotent() {
        let catalog = StubCatalog {
            products: Vec::new(),
            categories: HashMap::new(),
        };
        let provider = Arc::new(RecordingProvider::default());
        let engine = engine_with(catalog, Arc::clone(&provider), 4);

        engine.remove_index("p-1").await.unwrap();
        engine.remove_index("p-1").await.unwrap();

        assert_eq!(provider.deleted.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_clear_index_drops_through_provider() {
        let catalog = StubCatalog {
            products: Vec::new(),
            categories: HashMap::new(),
        };
        let provider = Arc::new(RecordingProvider::default());
        let engine = engine_with(catalog, Arc::clone(&provider), 4);

        engine.clear_index().await.unwrap();

        assert_eq!(*provider.dropped.lock().unwrap(), 1);
    }
}
