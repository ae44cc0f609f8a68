//! OpenSearch index configuration and mappings.
//!
//! This module defines the index settings and mappings for the product search index.

use serde_json::{json, Value};

/// Configuration for the product search index.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// The index name used for all operations.
    pub name: String,
}

impl IndexConfig {
    /// Create a new index configuration.
    ///
    /// # Arguments
    ///
    /// * `name` - The index name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_NAME)
    }
}

/// The default name of the product search index.
pub const DEFAULT_INDEX_NAME: &str = "products";

/// The analyzer applied to the product name field.
pub const PRODUCT_ANALYZER: &str = "product_custom_analyzer";

/// Get the index settings and mappings for the product search index.
///
/// The configuration includes:
/// - **Custom analyzer** on `name`: a `pattern_replace` char filter collapses
///   slash-joined tokens (`usb/c` -> `usbc`) before the standard tokenizer,
///   then lowercase and classic token filters run
/// - **index_prefixes** on `name`: leading n-grams of 1 to 10 characters are
///   indexed to support prefix search
/// - **Keyword `id` field**: exact-match lookups and deletes by product id
///
/// `uri`, `publish` and `indexedAt` are left to dynamic mapping.
pub fn get_index_settings() -> Value {
    json!({
        "settings": {
            "analysis": {
                "analyzer": {
                    PRODUCT_ANALYZER: {
                        "type": "custom",
                        "char_filter": ["my_char_filter"],
                        "tokenizer": "standard",
                        "filter": ["lowercase", "classic"]
                    }
                },
                "char_filter": {
                    "my_char_filter": {
                        "type": "pattern_replace",
                        "pattern": "(\\w+)/(?=\\w)",
                        "replacement": "$1"
                    }
                }
            }
        },
        "mappings": {
            "properties": {
                "name": {
                    "type": "text",
                    "analyzer": PRODUCT_ANALYZER,
                    "index_prefixes": {
                        "min_chars": 1,
                        "max_chars": 10
                    }
                },
                "cateName": {
                    "type": "text"
                },
                "salePrice": {
                    "type": "integer"
                },
                "productPhoto": {
                    "type": "text"
                },
                "id": {
                    "type": "keyword"
                }
            }
        }
    })
}

/// Compare the properties of an existing index against the expected mappings.
///
/// Returns a description of the first conflicting field, or `None` when every
/// expected property is present and equal. Extra properties created by dynamic
/// mapping are tolerated.
///
/// # Arguments
///
/// * `current_properties` - The `properties` object reported by the store
pub fn mapping_conflicts(current_properties: &Value) -> Option<String> {
    let expected = get_index_settings();
    let expected_properties = expected["mappings"]["properties"]
        .as_object()
        .cloned()
        .unwrap_or_default();

    for (field, expected_mapping) in &expected_properties {
        let current = &current_properties[field.as_str()];
        if current.is_null() {
            return Some(format!("missing mapping for field '{}'", field));
        }
        if current != expected_mapping {
            return Some(format!(
                "mapping for field '{}' differs from the expected schema",
                field
            ));
        }
    }

    None
}
