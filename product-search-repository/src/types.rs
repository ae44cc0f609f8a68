//! Request and response types for search index operations.

use serde_json::{json, Map, Value};

use product_search_shared::{ProductDocument, ProductPayload};

use crate::errors::SearchIndexError;

/// Field/value assignments for a partial document update.
///
/// Keys use the index's wire names (`name`, `salePrice`, ...). Values are kept
/// as JSON so they can be bound as script parameters; nothing in here is ever
/// rendered into script source text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdates(Map<String, Value>);

impl FieldUpdates {
    /// Create an empty update set.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Add a field assignment, replacing any previous value for the key.
    pub fn set(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Collect the editable fields present in a payload, using wire names.
    ///
    /// The product id and the category reference are never editable through
    /// an update: the id is the match key and the category name is resolved
    /// from the catalog by the sync engine.
    pub fn from_payload(payload: &ProductPayload) -> Self {
        let mut updates = Self::new();
        if let Some(ref name) = payload.name {
            updates.0.insert("name".to_string(), json!(name));
        }
        if let Some(ref uri) = payload.uri {
            updates.0.insert("uri".to_string(), json!(uri));
        }
        if let Some(sale_price) = payload.sale_price {
            updates.0.insert("salePrice".to_string(), json!(sale_price));
        }
        if let Some(ref product_photo) = payload.product_photo {
            updates
                .0
                .insert("productPhoto".to_string(), json!(product_photo));
        }
        if let Some(publish) = payload.publish {
            updates.0.insert("publish".to_string(), json!(publish));
        }
        updates
    }

    /// Returns true when no field assignments are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of field assignments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the assignment keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// The assignments as a JSON map, ready to bind as script parameters.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// One page of results parsed from a raw store response.
///
/// This is the provider-level shape; the search gateway recombines pages from
/// the primary and related queries into the caller-facing response.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    /// Total number of matching documents (not the page size).
    pub count: u64,
    /// The documents of this page, in store order.
    pub docs: Vec<ProductDocument>,
    /// Raw suggestion section, present only on queries that requested one.
    pub suggest: Option<Value>,
}

impl SearchPage {
    /// An empty page.
    pub fn empty() -> Self {
        Self {
            count: 0,
            docs: Vec::new(),
            suggest: None,
        }
    }

    /// Parse a page out of a raw search response body.
    ///
    /// Missing `hits.total.value` defaults to zero rather than erroring, and a
    /// missing `hits` array yields an empty page; a `_source` that does not
    /// deserialize into a document is a store-contract violation and surfaces
    /// as `StoreUnavailable`.
    ///
    /// # Arguments
    ///
    /// * `operation` - The operation name used in error context
    /// * `raw` - The raw JSON response body
    pub fn from_response(operation: &str, raw: &Value) -> Result<Self, SearchIndexError> {
        let count = raw["hits"]["total"]["value"].as_u64().unwrap_or(0);

        let mut docs = Vec::new();
        if let Some(hits) = raw["hits"]["hits"].as_array() {
            for hit in hits {
                let doc: ProductDocument =
                    serde_json::from_value(hit["_source"].clone()).map_err(|e| {
                        SearchIndexError::store_unavailable(
                            operation,
                            format!("Malformed document in response: {}", e),
                        )
                    })?;
                docs.push(doc);
            }
        }

        let suggest = raw.get("suggest").filter(|v| !v.is_null()).cloned();

        Ok(Self {
            count,
            docs,
            suggest,
        })
    }
}

/// Outcome of syncing a single product during a bulk reindex.
#[derive(Debug, Clone)]
pub struct ReindexOutcome {
    /// The product's identifier.
    pub product_id: String,
    /// Whether the sync of this product succeeded.
    pub success: bool,
    /// Error if the sync failed.
    pub error: Option<SearchIndexError>,
}

/// Summary of a bulk reindex run containing aggregate statistics and individual results.
///
/// `total` counts the products read from the catalog; when the run is
/// cancelled, `succeeded + failed` may be less than `total` because undispatched
/// items are skipped.
#[derive(Debug, Clone)]
pub struct ReindexSummary {
    /// Number of products read from the catalog.
    pub total: usize,
    /// Number of successfully synced products.
    pub succeeded: usize,
    /// Number of products whose sync failed.
    pub failed: usize,
    /// Whether the run was cancelled before dispatching every product.
    pub cancelled: bool,
    /// Individual outcomes for each dispatched product.
    pub outcomes: Vec<ReindexOutcome>,
}

impl ReindexSummary {
    /// Returns true when every product synced successfully.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.failed == 0 && self.succeeded == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_updates_from_payload_collects_present_fields() {
        let payload = ProductPayload {
            id: "p-1".to_string(),
            name: Some("Desk lamp".to_string()),
            uri: None,
            sale_price: Some(450),
            product_photo: None,
            publish: Some(true),
            category: Some("c-3".to_string()),
        };

        let updates = FieldUpdates::from_payload(&payload);

        assert_eq!(updates.len(), 3);
        let keys: Vec<&String> = updates.keys().collect();
        assert!(keys.iter().any(|k| *k == "name"));
        assert!(keys.iter().any(|k| *k == "salePrice"));
        assert!(keys.iter().any(|k| *k == "publish"));
        // id and category never become editable fields
        assert!(!keys.iter().any(|k| *k == "id"));
        assert!(!keys.iter().any(|k| *k == "category"));
    }

    #[test]
    fn test_field_updates_empty_payload() {
        let payload = ProductPayload::for_id("p-1");
        let updates = FieldUpdates::from_payload(&payload);
        assert!(updates.is_empty());
    }

    #[test]
    fn test_field_updates_set() {
        let updates = FieldUpdates::new()
            .set("cateName", json!("Work Setup"))
            .set("publish", json!(false));

        assert_eq!(updates.len(), 2);
        assert_eq!(updates.as_map()["cateName"], json!("Work Setup"));
    }

    #[test]
    fn test_search_page_from_response() {
        let raw = json!({
            "took": 3,
            "hits": {
                "total": { "value": 42, "relation": "eq" },
                "hits": [
                    {
                        "_index": "products",
                        "_id": "p-1",
                        "_source": {
                            "id": "p-1",
                            "name": "Mechanical keyboard",
                            "publish": true,
                            "cateName": "Work Setup",
                            "indexedAt": "2024-05-01T10:00:00Z"
                        }
                    }
                ]
            },
            "suggest": {
                "suggestion": [{ "text": "keybord", "options": [] }]
            }
        });

        let page = SearchPage::from_response("search", &raw).unwrap();

        assert_eq!(page.count, 42);
        assert_eq!(page.docs.len(), 1);
        assert_eq!(page.docs[0].id, "p-1");
        assert_eq!(page.docs[0].cate_name.as_deref(), Some("Work Setup"));
        assert!(page.suggest.is_some());
    }

    #[test]
    fn test_search_page_missing_total_defaults_to_zero() {
        let raw = json!({ "hits": { "hits": [] } });
        let page = SearchPage::from_response("search", &raw).unwrap();
        assert_eq!(page.count, 0);
        assert!(page.docs.is_empty());
        assert!(page.suggest.is_none());
    }

    #[test]
    fn test_search_page_missing_hits_is_empty() {
        let raw = json!({ "error": "shard failure" });
        let page = SearchPage::from_response("search", &raw).unwrap();
        assert_eq!(page.count, 0);
        assert!(page.docs.is_empty());
    }

    #[test]
    fn test_search_page_malformed_source_is_store_unavailable() {
        let raw = json!({
            "hits": {
                "total": { "value": 1 },
                "hits": [ { "_source": { "name": "missing id and publish" } } ]
            }
        });

        let err = SearchPage::from_response("search", &raw).unwrap_err();
        assert!(matches!(err, SearchIndexError::StoreUnavailable { .. }));
    }

    #[test]
    fn test_reindex_summary_is_complete() {
        let summary = ReindexSummary {
            total: 3,
            succeeded: 3,
            failed: 0,
            cancelled: false,
            outcomes: Vec::new(),
        };
        assert!(summary.is_complete());

        let summary = ReindexSummary {
            total: 3,
            succeeded: 2,
            failed: 1,
            cancelled: false,
            outcomes: Vec::new(),
        };
        assert!(!summary.is_complete());

        let summary = ReindexSummary {
            total: 3,
            succeeded: 1,
            failed: 0,
            cancelled: true,
            outcomes: Vec::new(),
        };
        assert!(!summary.is_complete());
    }
}
