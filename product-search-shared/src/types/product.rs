//! Catalog-side product types.
//!
//! This module defines the product as it lives in the relational catalog and the
//! inbound payload accepted by the indexing operations.

use serde::{Deserialize, Serialize};

/// A product row as persisted in the relational catalog.
///
/// Products reference their category through `category_id`; the category name
/// itself is stored on the `categories` row and is only denormalized into the
/// search index at sync time.
///
/// # Fields
///
/// - `id`: Unique identifier for the product (opaque string)
/// - `name`: Product display name (primary search field)
/// - `uri`: Product page URI
/// - `sale_price`: Sale price in minor units
/// - `product_photo`: Photo URL
/// - `publish`: Whether the product is publicly visible
/// - `category_id`: Foreign key to the owning category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub sale_price: i64,
    pub product_photo: String,
    pub publish: bool,
    pub category_id: String,
}

/// Inbound payload for single-product indexing operations.
///
/// All fields except `id` are optional. The `category` field is accepted for
/// contract compatibility but is never trusted for denormalization: the
/// category name indexed alongside the product is always resolved from the
/// persisted catalog record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ProductPayload {
    /// Create a payload carrying only the product id.
    ///
    /// # Example
    ///
    /// ```
    /// use product_search_shared::ProductPayload;
    ///
    /// let payload = ProductPayload::for_id("p-1");
    /// assert!(payload.name.is_none());
    /// ```
    pub fn for_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            uri: None,
            sale_price: None,
            product_photo: None,
            publish: None,
            category: None,
        }
    }

    /// Build a payload from a persisted product row.
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: Some(product.name.clone()),
            uri: Some(product.uri.clone()),
            sale_price: Some(product.sale_price),
            product_photo: Some(product.product_photo.clone()),
            publish: Some(product.publish),
            category: Some(product.category_id.clone()),
        }
    }
}
