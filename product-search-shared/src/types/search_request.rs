//! Search request types for the product search facade.
//!
//! This module defines the query parameters accepted by search operations.

use serde::{Deserialize, Serialize};

/// Search request parameters.
///
/// Price bounds use zero as "unspecified": a bound of `0` contributes no
/// range clause, so free items cannot be selected with a lower bound of
/// exactly zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchRequest {
    /// The search text matched against product and category names.
    #[serde(default)]
    pub search: String,

    /// Maximum number of results to return.
    /// Default is 20.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Offset for pagination.
    /// Default is 0.
    #[serde(default)]
    pub offset: usize,

    /// Optional minimum sale price (inclusive). Zero means unspecified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,

    /// Optional maximum sale price (inclusive). Zero means unspecified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

fn default_limit() -> usize {
    20
}

impl SearchRequest {
    /// Create a new search request with default pagination.
    ///
    /// # Example
    ///
    /// ```
    /// use product_search_shared::SearchRequest;
    ///
    /// let request = SearchRequest::new("standing desk");
    /// assert_eq!(request.limit, 20);
    /// assert_eq!(request.offset, 0);
    /// ```
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            limit: default_limit(),
            offset: 0,
            min: None,
            max: None,
        }
    }

    /// Set the limit for results.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the offset for pagination.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Set both price bounds. Zero leaves a bound unspecified.
    pub fn with_price_range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// The effective price bounds, with absent values normalized to zero.
    pub fn price_bounds(&self) -> (i64, i64) {
        (self.min.unwrap_or(0), self.max.unwrap_or(0))
    }

    /// Validate the request parameters.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.search.trim().is_empty() {
            return Err("Search text cannot be empty".to_string());
        }

        let (min, max) = self.price_bounds();
        if min < 0 || max < 0 {
            return Err("Price bounds cannot be negative".to_string());
        }
        if min != 0 && max != 0 && min > max {
            return Err("Minimum price cannot exceed maximum price".to_string());
        }

        Ok(())
    }
}
