//! Denormalized product document for the search index.
//!
//! This module defines the document structure that is indexed in the search engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::product::{Product, ProductPayload};

/// Document representation of a product in the search index.
///
/// Wire field names are camelCase to match the index mappings. The category
/// name is embedded as `cateName` so queries never join back to the catalog;
/// it must be resolved from the persisted category record, not from inbound
/// payloads.
///
/// # Fields
///
/// - `id`: Product identifier, also used as the document id
/// - `name`: Optional product display name (primary search field)
/// - `uri`: Optional product page URI
/// - `sale_price`: Optional sale price (`salePrice` on the wire)
/// - `product_photo`: Optional photo URL (`productPhoto` on the wire)
/// - `publish`: Visibility flag; only published documents match searches
/// - `cate_name`: Denormalized category name (`cateName` on the wire)
/// - `indexed_at`: Timestamp when the document was built for indexing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductDocument {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_photo: Option<String>,
    pub publish: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cate_name: Option<String>,
    pub indexed_at: DateTime<Utc>,
}

impl ProductDocument {
    /// Build a document from a persisted catalog row.
    ///
    /// # Arguments
    ///
    /// * `product` - The product row read from the catalog
    /// * `category_name` - The category name resolved at sync time
    pub fn from_product(product: &Product, category_name: impl Into<String>) -> Self {
        Self {
            id: product.id.clone(),
            name: Some(product.name.clone()),
            uri: Some(product.uri.clone()),
            sale_price: Some(product.sale_price),
            product_photo: Some(product.product_photo.clone()),
            publish: product.publish,
            cate_name: Some(category_name.into()),
            indexed_at: Utc::now(),
        }
    }

    /// Build a document from an inbound payload.
    ///
    /// A payload without an explicit `publish` flag indexes as unpublished.
    /// The payload's own `category` field is ignored; callers pass the name
    /// resolved from the catalog.
    pub fn from_payload(payload: &ProductPayload, category_name: impl Into<String>) -> Self {
        Self {
            id: payload.id.clone(),
            name: payload.name.clone(),
            uri: payload.uri.clone(),
            sale_price: payload.sale_price,
            product_photo: payload.product_photo.clone(),
            publish: payload.publish.unwrap_or(false),
            cate_name: Some(category_name.into()),
            indexed_at: Utc::now(),
        }
    }

    /// The id under which this document is stored in the index.
    pub fn document_id(&self) -> &str {
        &self.id
    }
}
