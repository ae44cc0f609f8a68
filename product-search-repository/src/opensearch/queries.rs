//! Query body builders for the product search index.
//!
//! Pure functions that translate a search request into the JSON bodies sent to
//! the store. Keeping them free of I/O makes the ranking policy directly
//! testable.

use serde_json::{json, Map, Value};

use product_search_shared::SearchRequest;

use crate::types::FieldUpdates;

/// Fields matched by the full-text clauses.
pub const SEARCH_FIELDS: [&str; 2] = ["name", "cateName"];

/// Category labels demoted (not excluded) in ranked results. These buckets
/// otherwise dominate generic-term matches.
pub const DEMOTED_CATEGORIES: [&str; 2] = ["Phụ kiện", "Work Setup"];

/// Score multiplier applied to documents matching a demoted bucket.
pub const NEGATIVE_BOOST: f64 = 0.3;

/// Script source applied by partial updates. Field names and values arrive as
/// bound parameters under `params.fields`; the source text is constant, so no
/// caller data can reach it.
pub const UPDATE_SCRIPT: &str =
    "for (entry in params.fields.entrySet()) { ctx._source[entry.getKey()] = entry.getValue() }";

/// Choose the multi-match strategy for a search input.
///
/// Three or more whitespace-delimited tokens use `cross_fields` for multi-term
/// relevance; shorter inputs use `phrase_prefix` for typeahead behavior.
pub fn match_type(search: &str) -> &'static str {
    if search.split_whitespace().count() >= 3 {
        "cross_fields"
    } else {
        "phrase_prefix"
    }
}

/// Compute the sale-price range bounds for a query.
///
/// Zero means "unspecified": `gte` is emitted only for a nonzero `min`, `lte`
/// only for a nonzero `max`, and `None` when neither bound survives. A
/// consequence is that free items cannot be selected with a lower bound of
/// exactly zero.
pub fn price_range(min: i64, max: i64) -> Option<Value> {
    let mut bounds = Map::new();
    if min != 0 {
        bounds.insert("gte".to_string(), json!(min));
    }
    if max != 0 {
        bounds.insert("lte".to_string(), json!(max));
    }

    if bounds.is_empty() {
        None
    } else {
        Some(Value::Object(bounds))
    }
}

/// The full-text clauses shared by the positive and negative sides of the
/// ranked query: the multi-match over the search fields plus the published
/// visibility filter.
fn text_clauses(search: &str) -> Vec<Value> {
    vec![
        json!({
            "multi_match": {
                "query": search,
                "type": match_type(search),
                "fields": SEARCH_FIELDS,
                "boost": 1
            }
        }),
        json!({
            "match": { "publish": true }
        }),
    ]
}

/// One demotion bucket: the category label AND the same range and text clauses
/// as the positive side.
fn demoted_bucket(label: &str, range: &Option<Value>, text: &[Value]) -> Value {
    let mut must = vec![json!({ "match": { "cateName": label } })];
    if let Some(bounds) = range {
        must.push(json!({ "range": { "salePrice": bounds } }));
    }
    must.extend_from_slice(text);

    json!({ "bool": { "must": must } })
}

/// Build the primary ranked query body.
///
/// A boosting composite: the positive side requires the text clauses (and the
/// optional price range); the negative side is an OR over the demoted category
/// buckets and scores matches down by [`NEGATIVE_BOOST`] without excluding
/// them. A term suggester on `name` (frequency-sorted, always suggesting) is
/// attached under the key `suggestion`.
pub fn search_body(request: &SearchRequest) -> Value {
    let (min, max) = request.price_bounds();
    let range = price_range(min, max);
    let text = text_clauses(&request.search);

    let mut positive_must = text.clone();
    if let Some(ref bounds) = range {
        positive_must.push(json!({ "range": { "salePrice": bounds } }));
    }

    let negative_should: Vec<Value> = DEMOTED_CATEGORIES
        .iter()
        .map(|label| demoted_bucket(label, &range, &text))
        .collect();

    json!({
        "from": request.offset,
        "size": request.limit,
        "query": {
            "boosting": {
                "positive": {
                    "bool": { "must": positive_must }
                },
                "negative": {
                    "bool": { "should": negative_should }
                },
                "negative_boost": NEGATIVE_BOOST
            }
        },
        "suggest": {
            "suggestion": {
                "text": request.search,
                "term": {
                    "field": "name",
                    "sort": "frequency",
                    "suggest_mode": "always"
                }
            }
        }
    })
}

/// Build the related-products similarity query body.
pub fn related_body(request: &SearchRequest) -> Value {
    json!({
        "from": request.offset,
        "size": request.limit,
        "query": {
            "more_like_this": {
                "fields": SEARCH_FIELDS,
                "like": request.search,
                "min_term_freq": 1,
                "max_query_terms": 12
            }
        }
    })
}

/// Build an unfiltered match-all listing body.
pub fn list_body(limit: usize, offset: usize) -> Value {
    json!({
        "from": offset,
        "size": limit,
        "query": { "match_all": {} }
    })
}

/// Build a body matching the single document whose `id` equals `product_id`.
pub fn id_query(product_id: &str) -> Value {
    json!({
        "query": {
            "term": { "id": product_id }
        }
    })
}

/// Build the update-by-query body for a partial update.
///
/// The script source is [`UPDATE_SCRIPT`]; the assignments travel exclusively
/// as `params.fields`.
pub fn update_body(product_id: &str, updates: &FieldUpdates) -> Value {
    json!({
        "query": {
            "term": { "id": product_id }
        },
        "script": {
            "lang": "painless",
            "source": UPDATE_SCRIPT,
            "params": {
                "fields": updates.as_map()
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_type_threshold() {
        assert_eq!(match_type("keyboard"), "phrase_prefix");
        assert_eq!(match_type("mechanical keyboard"), "phrase_prefix");
        assert_eq!(match_type("red mechanical keyboard"), "cross_fields");
        assert_eq!(match_type("big red mechanical keyboard"), "cross_fields");
        assert_eq!(match_type(""), "phrase_prefix");
    }

    #[test]
    fn test_price_range_both_bounds() {
        let range = price_range(10, 50).unwrap();
        assert_eq!(range, json!({ "gte": 10, "lte": 50 }));
    }

    #[test]
    fn test_price_range_zero_is_unspecified() {
        assert_eq!(price_range(10, 0).unwrap(), json!({ "gte": 10 }));
        assert_eq!(price_range(0, 50).unwrap(), json!({ "lte": 50 }));
        assert!(price_range(0, 0).is_none());
    }

    #[test]
    fn test_search_body_structure() {
        let request = SearchRequest::new("usb hub adapter")
            .with_limit(10)
            .with_offset(20)
            .with_price_range(100, 900);
        let body = search_body(&request);

        assert_eq!(body["from"], 20);
        assert_eq!(body["size"], 10);

        let boosting = &body["query"]["boosting"];
        assert_eq!(boosting["negative_boost"], json!(NEGATIVE_BOOST));

        // Positive side: multi_match + publish + range
        let positive_must = boosting["positive"]["bool"]["must"].as_array().unwrap();
        assert_eq!(positive_must.len(), 3);
        assert_eq!(
            positive_must[0]["multi_match"]["type"],
            json!("cross_fields")
        );
        assert_eq!(
            positive_must[0]["multi_match"]["fields"],
            json!(["name", "cateName"])
        );
        assert_eq!(positive_must[1]["match"]["publish"], json!(true));
        assert_eq!(
            positive_must[2]["range"]["salePrice"],
            json!({ "gte": 100, "lte": 900 })
        );

        // Negative side: one bucket per demoted category, each carrying the
        // same range and text clauses
        let negative_should = boosting["negative"]["bool"]["should"].as_array().unwrap();
        assert_eq!(negative_should.len(), 2);
        for (bucket, label) in negative_should.iter().zip(DEMOTED_CATEGORIES) {
            let must = bucket["bool"]["must"].as_array().unwrap();
            assert_eq!(must[0]["match"]["cateName"], json!(label));
            assert_eq!(must[1]["range"]["salePrice"], json!({ "gte": 100, "lte": 900 }));
            assert!(must[2]["multi_match"].is_object());
            assert_eq!(must[3]["match"]["publish"], json!(true));
        }
    }

    #[test]
    fn test_search_body_without_price_range() {
        let request = SearchRequest::new("keyboard");
        let body = search_body(&request);

        let positive_must = body["query"]["boosting"]["positive"]["bool"]["must"]
            .as_array()
            .unwrap();
        assert_eq!(positive_must.len(), 2);
        assert!(positive_must.iter().all(|clause| clause["range"].is_null()));

        let negative_should = body["query"]["boosting"]["negative"]["bool"]["should"]
            .as_array()
            .unwrap();
        for bucket in negative_should {
            let must = bucket["bool"]["must"].as_array().unwrap();
            assert_eq!(must.len(), 3);
        }
    }

    #[test]
    fn test_search_body_suggest_section() {
        let request = SearchRequest::new("keybord");
        let body = search_body(&request);

        let suggestion = &body["suggest"]["suggestion"];
        assert_eq!(suggestion["text"], json!("keybord"));
        assert_eq!(suggestion["term"]["field"], json!("name"));
        assert_eq!(suggestion["term"]["sort"], json!("frequency"));
        assert_eq!(suggestion["term"]["suggest_mode"], json!("always"));
    }

    #[test]
    fn test_related_body_structure() {
        let request = SearchRequest::new("standing desk").with_limit(5);
        let body = related_body(&request);

        assert_eq!(body["from"], 0);
        assert_eq!(body["size"], 5);

        let mlt = &body["query"]["more_like_this"];
        assert_eq!(mlt["fields"], json!(["name", "cateName"]));
        assert_eq!(mlt["like"], json!("standing desk"));
        assert_eq!(mlt["min_term_freq"], 1);
        assert_eq!(mlt["max_query_terms"], 12);
    }

    #[test]
    fn test_list_body() {
        let body = list_body(20, 40);
        assert_eq!(body["from"], 40);
        assert_eq!(body["size"], 20);
        assert!(body["query"]["match_all"].is_object());
    }

    #[test]
    fn test_id_query_uses_keyword_term() {
        let body = id_query("p-17");
        assert_eq!(body["query"]["term"]["id"], json!("p-17"));
    }

    #[test]
    fn test_update_body_is_parameterized() {
        let updates = FieldUpdates::new()
            .set("name", json!("Desk'); ctx._source.publish = true; //"))
            .set("salePrice", json!(120));
        let body = update_body("p-9", &updates);

        assert_eq!(body["query"]["term"]["id"], json!("p-9"));
        assert_eq!(body["script"]["lang"], json!("painless"));
        assert_eq!(body["script"]["source"], json!(UPDATE_SCRIPT));

        // The hostile value stays inside params, never in the source text
        let source = body["script"]["source"].as_str().unwrap();
        assert!(!source.contains("Desk"));
        assert_eq!(
            body["script"]["params"]["fields"]["name"],
            json!("Desk'); ctx._source.publish = true; //")
        );
        assert_eq!(body["script"]["params"]["fields"]["salePrice"], json!(120));
    }
}
