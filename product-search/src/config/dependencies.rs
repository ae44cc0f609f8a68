//! Dependency initialization for the product search service.
//!
//! Reads configuration from environment variables, connects the catalog
//! reader and the search index provider, and wires them into the service
//! facade. Construction is fail-fast: a missing required variable or an
//! unreachable backend aborts startup with a configuration error.

use std::env;
use std::sync::Arc;

use tracing::info;

use product_search_repository::{
    CatalogReader, IndexConfig, OpenSearchProvider, PostgresCatalogReader, SearchIndexProvider,
};

use crate::facade::ProductSearchService;
use crate::gateway::SearchGateway;
use crate::sync::{SyncConfig, SyncEngine};
use crate::ServiceError;

/// Default OpenSearch URL
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default product index name
const DEFAULT_INDEX_NAME: &str = "products";

/// Default bound on concurrent upserts during a full reindex
const DEFAULT_REINDEX_CONCURRENCY: usize = 8;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The composed service facade
    pub service: Arc<ProductSearchService>,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: Postgres connection string for the catalog (required)
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_USERNAME` / `OPENSEARCH_PASSWORD`: optional basic auth pair;
    ///   both must be set for credentials to be used
    /// - `PRODUCTS_INDEX`: name of the product index (default: "products")
    /// - `REINDEX_CONCURRENCY`: bound on concurrent reindex upserts (default: 8)
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(ServiceError)` - If a required variable is missing or a backend
    ///   cannot be reached
    pub async fn new() -> Result<Self, ServiceError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ServiceError::config("DATABASE_URL environment variable is required"))?;

        let opensearch_url =
            env::var("OPENSEARCH_URL").unwrap_or_else(|_| DEFAULT_OPENSEARCH_URL.to_string());

        let index_name =
            env::var("PRODUCTS_INDEX").unwrap_or_else(|_| DEFAULT_INDEX_NAME.to_string());

        let reindex_concurrency = env::var("REINDEX_CONCURRENCY")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|concurrency| *concurrency > 0)
            .unwrap_or(DEFAULT_REINDEX_CONCURRENCY);

        let basic_auth = match (
            env::var("OPENSEARCH_USERNAME"),
            env::var("OPENSEARCH_PASSWORD"),
        ) {
            (Ok(username), Ok(password)) => Some((username, password)),
            _ => None,
        };

        info!(
            opensearch_url = %opensearch_url,
            index = %index_name,
            reindex_concurrency = reindex_concurrency,
            basic_auth = basic_auth.is_some(),
            "Initializing dependencies"
        );

        // Initialize OpenSearch provider
        let provider =
            OpenSearchProvider::new(&opensearch_url, basic_auth, IndexConfig::new(index_name))
                .await
                .map_err(|e| {
                    ServiceError::config(format!("Failed to create OpenSearch provider: {}", e))
                })?;
        let provider: Arc<dyn SearchIndexProvider> = Arc::new(provider);

        // Connect the catalog reader
        let catalog = PostgresCatalogReader::new(&database_url).await.map_err(|e| {
            ServiceError::config(format!("Failed to connect to the catalog database: {}", e))
        })?;
        let catalog: Arc<dyn CatalogReader> = Arc::new(catalog);

        info!("Catalog database connection established");

        // Compose the service facade
        let sync = SyncEngine::new(
            Arc::clone(&catalog),
            Arc::clone(&provider),
            SyncConfig {
                reindex_concurrency,
            },
        );
        let gateway = SearchGateway::new(Arc::clone(&provider));
        let service = Arc::new(ProductSearchService::new(sync, gateway));

        Ok(Self { service })
    }
}
