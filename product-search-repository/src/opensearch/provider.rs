//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{
        IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts, IndicesGetMappingParts,
    },
    DeleteByQueryParts, IndexParts, OpenSearch, SearchParts, UpdateByQueryParts,
};
use serde_json::Value;
use tracing::{debug, error, info};
use url::Url;

use product_search_shared::{ProductDocument, SearchRequest};

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::index_config::{get_index_settings, mapping_conflicts, IndexConfig};
use crate::opensearch::queries;
use crate::types::{FieldUpdates, SearchPage};

/// OpenSearch provider implementation.
///
/// Provides full-text product search using OpenSearch as the backend. All
/// operations are scoped to the single index named in `IndexConfig`.
///
/// # Example
///
/// ```ignore
/// use product_search_repository::opensearch::IndexConfig;
///
/// let config = IndexConfig::new("products");
/// let provider = OpenSearchProvider::new("http://localhost:9200", None, config).await?;
/// provider.ensure_schema().await?;
/// ```
#[derive(Debug)]
pub struct OpenSearchProvider {
    client: OpenSearch,
    index_config: IndexConfig,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `basic_auth` - Optional `(username, password)` pair for basic auth
    /// * `index_config` - The index configuration containing the index name
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub async fn new(
        url: &str,
        basic_auth: Option<(String, String)>,
        index_config: IndexConfig,
    ) -> Result<Self, SearchIndexError> {
        let parsed_url = Url::parse(url)
            .map_err(|e| SearchIndexError::store_unavailable("connect", e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        if let Some((username, password)) = basic_auth {
            builder = builder.auth(Credentials::Basic(username, password));
        }
        let transport = builder
            .build()
            .map_err(|e| SearchIndexError::store_unavailable("connect", e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, index = %index_config.name, "Created OpenSearch provider");

        Ok(Self {
            client,
            index_config,
        })
    }

    /// Validate field keys for a partial update.
    ///
    /// Field keys must contain only alphanumeric characters and underscores;
    /// anything else never belongs in a document field name and is rejected
    /// before the request is built.
    ///
    /// # Arguments
    ///
    /// * `updates` - The field assignments to validate
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If all field keys are valid
    /// * `Err(SearchIndexError)` - If the set is empty or a key is invalid
    fn validate_field_keys(updates: &FieldUpdates) -> Result<(), SearchIndexError> {
        if updates.is_empty() {
            return Err(SearchIndexError::malformed_request(
                "At least one field must be provided for an update",
            ));
        }

        for key in updates.keys() {
            if key.is_empty() {
                return Err(SearchIndexError::malformed_request(
                    "Field keys cannot be empty",
                ));
            }

            if !key.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Err(SearchIndexError::malformed_request(format!(
                    "Field key '{}' contains invalid characters. Only alphanumeric characters and underscores are allowed",
                    key
                )));
            }
        }

        Ok(())
    }

    /// Create the index with the full settings and mappings body.
    async fn create_index(&self) -> Result<(), SearchIndexError> {
        let index = self.index_config.name.as_str();

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(get_index_settings())
            .send()
            .await
            .map_err(|e| SearchIndexError::store_unavailable("create_index", e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, index = %index, "Index creation failed");
            if status.is_client_error() {
                return Err(SearchIndexError::schema_conflict(
                    index,
                    format!("Index creation rejected with status {}: {}", status, error_body),
                ));
            }
            return Err(SearchIndexError::store_unavailable(
                "create_index",
                format!("Index creation failed with status {}: {}", status, error_body),
            ));
        }

        info!(index = %index, "Created search index");
        Ok(())
    }

    /// Verify that an existing index carries the expected mappings.
    async fn verify_mappings(&self) -> Result<(), SearchIndexError> {
        let index = self.index_config.name.as_str();

        let response = self
            .client
            .indices()
            .get_mapping(IndicesGetMappingParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::store_unavailable("get_mapping", e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, index = %index, "Mapping fetch failed");
            return Err(SearchIndexError::store_unavailable(
                "get_mapping",
                format!("Mapping fetch failed with status {}: {}", status, error_body),
            ));
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::store_unavailable("get_mapping", e.to_string()))?;

        let current_properties = &raw[index]["mappings"]["properties"];
        if let Some(conflict) = mapping_conflicts(current_properties) {
            error!(index = %index, conflict = %conflict, "Existing index conflicts with the expected schema");
            return Err(SearchIndexError::schema_conflict(index, conflict));
        }

        debug!(index = %index, "Existing index mappings verified");
        Ok(())
    }

    /// Execute a search body against the configured index and parse the page.
    async fn run_search(
        &self,
        operation: &'static str,
        body: Value,
    ) -> Result<SearchPage, SearchIndexError> {
        let response = self
            .client
            .search(SearchParts::Index(&[self.index_config.name.as_str()]))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::store_unavailable(operation, e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, operation = %operation, "Search request failed");
            return Err(SearchIndexError::store_unavailable(
                operation,
                format!("Search failed with status {}: {}", status, error_body),
            ));
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::store_unavailable(operation, e.to_string()))?;

        SearchPage::from_response(operation, &raw)
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    /// Ensure the search index exists with the expected analyzer and mappings.
    ///
    /// A missing index is created with the full settings body. An existing
    /// index has its mappings compared property by property: a mismatch is a
    /// `SchemaConflict`, and the index is never dropped or recreated here.
    async fn ensure_schema(&self) -> Result<(), SearchIndexError> {
        let index = self.index_config.name.as_str();

        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::store_unavailable("ensure_schema", e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return self.create_index().await;
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, index = %index, "Index existence probe failed");
            return Err(SearchIndexError::store_unavailable(
                "ensure_schema",
                format!("Existence probe failed with status {}: {}", status, error_body),
            ));
        }

        self.verify_mappings().await
    }

    /// Create or replace the document for one product, keyed by product id.
    ///
    /// Using the product id as the document id makes re-syncs overwrite in
    /// place instead of accumulating duplicates.
    async fn upsert_document(&self, document: &ProductDocument) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .index(IndexParts::IndexId(
                self.index_config.name.as_str(),
                &document.id,
            ))
            .body(document)
            .send()
            .await
            .map_err(|e| SearchIndexError::store_unavailable("index", e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, product_id = %document.id, "Index request failed");
            return Err(SearchIndexError::store_unavailable(
                "index",
                format!("Index failed with status {}: {}", status, error_body),
            ));
        }

        debug!(product_id = %document.id, "Document indexed");
        Ok(())
    }

    /// Apply a partial field update to the document matching `product_id`.
    ///
    /// The update runs as an update-by-query on the `id` keyword field with a
    /// constant script source; assignments are bound as script parameters. A
    /// query that matches zero documents is reported as `NotFound`.
    async fn update_document(
        &self,
        product_id: &str,
        updates: &FieldUpdates,
    ) -> Result<(), SearchIndexError> {
        Self::validate_field_keys(updates)?;

        let response = self
            .client
            .update_by_query(UpdateByQueryParts::Index(&[self.index_config.name.as_str()]))
            .body(queries::update_body(product_id, updates))
            .send()
            .await
            .map_err(|e| SearchIndexError::store_unavailable("update", e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, product_id = %product_id, "Update request failed");
            return Err(SearchIndexError::store_unavailable(
                "update",
                format!("Update failed with status {}: {}", status, error_body),
            ));
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::store_unavailable("update", e.to_string()))?;

        let matched = raw["total"].as_u64().unwrap_or(0);
        if matched == 0 {
            return Err(SearchIndexError::not_found("update", product_id));
        }

        debug!(product_id = %product_id, fields = updates.len(), "Document updated");
        Ok(())
    }

    /// Delete the document whose `id` field matches `product_id`.
    ///
    /// Runs as a delete-by-query; matching zero documents (or the index not
    /// existing yet) is a successful no-op.
    async fn delete_document(&self, product_id: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .delete_by_query(DeleteByQueryParts::Index(&[self.index_config.name.as_str()]))
            .body(queries::id_query(product_id))
            .send()
            .await
            .map_err(|e| SearchIndexError::store_unavailable("delete", e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - the index may not exist yet
        if !status.is_success() && status.as_u16() != 404 {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, product_id = %product_id, "Delete request failed");
            return Err(SearchIndexError::store_unavailable(
                "delete",
                format!("Delete failed with status {}: {}", status, error_body),
            ));
        }

        debug!(product_id = %product_id, "Document delete issued");
        Ok(())
    }

    /// Execute the primary ranked query.
    async fn search_documents(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchPage, SearchIndexError> {
        self.run_search("search", queries::search_body(request))
            .await
    }

    /// Execute the related-products similarity query.
    async fn related_documents(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchPage, SearchIndexError> {
        self.run_search("related", queries::related_body(request))
            .await
    }

    /// List indexed documents with a match-all query.
    async fn list_documents(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<SearchPage, SearchIndexError> {
        self.run_search("list", queries::list_body(limit, offset))
            .await
    }

    /// Delete the configured index entirely.
    ///
    /// Only this provider's index is touched; a 404 means it was already gone.
    async fn drop_index(&self) -> Result<(), SearchIndexError> {
        let index = self.index_config.name.as_str();

        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::store_unavailable("drop_index", e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() && status.as_u16() != 404 {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, index = %index, "Index drop failed");
            return Err(SearchIndexError::store_unavailable(
                "drop_index",
                format!("Index drop failed with status {}: {}", status, error_body),
            ));
        }

        info!(index = %index, "Search index dropped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_field_keys_valid() {
        let updates = FieldUpdates::new()
            .set("name", json!("Desk"))
            .set("salePrice", json!(100))
            .set("cateName", json!("Work Setup"))
            .set("indexed_at_shadow", json!("x"));
        assert!(OpenSearchProvider::validate_field_keys(&updates).is_ok());
    }

    #[test]
    fn test_validate_field_keys_empty_set() {
        let updates = FieldUpdates::new();
        let result = OpenSearchProvider::validate_field_keys(&updates);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            SearchIndexError::MalformedRequest(_)
        ));
    }

    #[test]
    fn test_validate_field_keys_invalid_characters() {
        let test_cases = vec![
            "name-with-dash",
            "name.with.dot",
            "name with space",
            "name'quote",
            "name;semicolon",
            "ctx._source",
        ];

        for key in test_cases {
            let updates = FieldUpdates::new().set(key, json!("x"));
            let result = OpenSearchProvider::validate_field_keys(&updates);
            assert!(result.is_err(), "Expected error for key '{}'", key);
            assert!(
                matches!(result.unwrap_err(), SearchIndexError::MalformedRequest(_)),
                "Expected MalformedRequest for key '{}'",
                key
            );
        }
    }

    #[tokio::test]
    async fn test_new_rejects_invalid_url() {
        let result =
            OpenSearchProvider::new("not a url", None, IndexConfig::default()).await;
        assert!(matches!(
            result.unwrap_err(),
            SearchIndexError::StoreUnavailable { .. }
        ));
    }
}
