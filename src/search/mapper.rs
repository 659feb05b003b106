//! Mapping of raw engine results into the public response

use crate::backend::{RawBuckets, RawSearchResponse};
use crate::models::{FacetBucket, Product, ProductSearchResponse};
use crate::search::error::{SearchError, SearchResult};
use crate::search::query::{FacetDefinition, FACETS};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Convert a raw search result, keeping hit and bucket order as returned
pub fn map_response(raw: RawSearchResponse) -> SearchResult<ProductSearchResponse> {
    let total = raw
        .hits
        .total
        .ok_or_else(|| SearchError::SearchFailed("hits.total missing from search result".into()))?;
    let (total_hits, total_hits_relation) = (total.value, total.relation);

    let products = raw
        .hits
        .hits
        .into_iter()
        .map(|hit| {
            serde_json::from_value::<Product>(hit.source)
                .map(|product| product.with_id(hit.id.clone()))
                .map_err(|e| {
                    SearchError::SearchFailed(format!("Malformed document {}: {}", hit.id, e))
                })
        })
        .collect::<SearchResult<Vec<_>>>()?;

    let facets = FACETS
        .iter()
        .map(|facet| Ok((facet.name.to_string(), facet_buckets(&raw.aggregations, facet)?)))
        .collect::<SearchResult<BTreeMap<_, _>>>()?;

    Ok(ProductSearchResponse {
        total_hits,
        total_hits_relation,
        products,
        facets,
    })
}

fn facet_buckets(
    aggregations: &Map<String, Value>,
    facet: &FacetDefinition,
) -> SearchResult<Vec<FacetBucket>> {
    let scope = match facet.wrapper {
        Some(wrapper) => aggregations
            .get(wrapper)
            .and_then(Value::as_object)
            .ok_or_else(|| missing(wrapper))?,
        None => aggregations,
    };

    let raw = scope.get(facet.name).ok_or_else(|| missing(facet.name))?;
    let buckets: RawBuckets = serde_json::from_value(raw.clone()).map_err(|e| {
        SearchError::SearchFailed(format!("Malformed aggregation {}: {}", facet.name, e))
    })?;

    Ok(buckets
        .buckets
        .iter()
        .map(|bucket| FacetBucket::new(bucket.label(), bucket.doc_count))
        .collect())
}

fn missing(name: &str) -> SearchError {
    SearchError::SearchFailed(format!("Aggregation {} missing from search result", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TotalHitsRelation;
    use serde_json::json;

    fn raw(value: Value) -> RawSearchResponse {
        serde_json::from_value(value).unwrap()
    }

    fn aggregations() -> Value {
        json!({
            "brand": { "buckets": [
                { "key": "Levi's", "doc_count": 5 },
                { "key": "Calvin Klein", "doc_count": 3 }
            ]},
            "price": { "buckets": [
                { "key": "Cheap", "from": 0.0, "to": 100.0, "doc_count": 2 },
                { "key": "Average", "from": 100.0, "to": 500.0, "doc_count": 6 },
                { "key": "Expensive", "from": 500.0, "doc_count": 0 }
            ]},
            "color_nested": { "doc_count": 17, "color": { "buckets": [
                { "key": "Blue", "doc_count": 8 },
                { "key": "Black", "doc_count": 7 }
            ]}},
            "size_nested": { "doc_count": 32, "size": { "buckets": [
                { "key": "L", "doc_count": 8 }
            ]}}
        })
    }

    #[test]
    fn test_maps_hits_and_facets() {
        let response = map_response(raw(json!({
            "hits": {
                "total": { "value": 8, "relation": "eq" },
                "hits": [
                    { "_id": "7", "_score": 2.5, "_source": {
                        "brand": "Levi's", "name": "501", "price": 89.0,
                        "skus": [{ "color": "Blue", "size": "L" }]
                    }},
                    { "_id": "3", "_score": 1.0, "_source": {
                        "brand": "Calvin Klein", "name": "Slim", "price": 120.0, "skus": []
                    }}
                ]
            },
            "aggregations": aggregations()
        })))
        .unwrap();

        assert_eq!(response.total_hits, 8);
        assert_eq!(response.total_hits_relation, TotalHitsRelation::Eq);
        assert_eq!(response.products[0].id.as_deref(), Some("7"));
        assert_eq!(response.products[1].id.as_deref(), Some("3"));
        assert_eq!(
            response.facets["price"],
            vec![
                FacetBucket::new("Cheap", 2),
                FacetBucket::new("Average", 6),
                FacetBucket::new("Expensive", 0)
            ]
        );
        assert_eq!(response.facets["color"][0], FacetBucket::new("Blue", 8));
        assert_eq!(response.facets["size"], vec![FacetBucket::new("L", 8)]);
        assert_eq!(response.facets["brand"][1], FacetBucket::new("Calvin Klein", 3));
    }

    #[test]
    fn test_missing_nested_wrapper_fails() {
        let mut aggs = aggregations();
        aggs.as_object_mut().unwrap().remove("size_nested");

        let result = map_response(raw(json!({
            "hits": { "total": { "value": 0, "relation": "eq" }, "hits": [] },
            "aggregations": aggs
        })));

        match result {
            Err(SearchError::SearchFailed(msg)) => assert!(msg.contains("size_nested")),
            other => panic!("Expected SearchFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_flat_facet_fails() {
        let mut aggs = aggregations();
        aggs.as_object_mut().unwrap().remove("brand");

        let result = map_response(raw(json!({
            "hits": { "total": { "value": 0, "relation": "eq" }, "hits": [] },
            "aggregations": aggs
        })));
        match result {
            Err(SearchError::SearchFailed(msg)) => assert!(msg.contains("brand")),
            other => panic!("Expected SearchFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_lower_bound_total() {
        let response = map_response(raw(json!({
            "hits": { "total": { "value": 10000, "relation": "gte" }, "hits": [] },
            "aggregations": aggregations()
        })))
        .unwrap();
        assert_eq!(response.total_hits, 10000);
        assert_eq!(response.total_hits_relation, TotalHitsRelation::Gte);
    }

    #[test]
    fn test_missing_total_fails() {
        let result = map_response(raw(json!({
            "hits": { "hits": [{ "_id": "1", "_source": { "brand": "Levi's", "name": "501", "price": 98.0 } }] },
            "aggregations": aggregations()
        })));
        assert!(matches!(result, Err(SearchError::SearchFailed(_))));
    }
}
