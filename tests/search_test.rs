//! Search facade tests against the in-memory backend

mod common;

use common::{jeans_corpus, raw_response, ALIAS};
use product_search::backend::{BackendOp, InMemoryBackend, InjectedFailure, RawSearchResponse};
use product_search::models::{FacetBucket, ProductSearchRequest, TotalHitsRelation};
use product_search::search::*;
use serde_json::json;
use std::sync::Arc;

/// Helper to create test search service
fn create_test_service(backend: &InMemoryBackend) -> SearchService {
    SearchService::new(Arc::new(backend.clone()), ALIAS, SearchConfig::default())
}

fn scripted_backend() -> InMemoryBackend {
    let backend = InMemoryBackend::new();
    let corpus = jeans_corpus();
    backend.set_search_response(raw_response(
        &[("3", corpus[2].clone()), ("4", corpus[3].clone())],
        8,
        "eq",
    ));
    backend
}

#[tokio::test]
async fn test_blank_request_returns_empty_without_backend() {
    let backend = scripted_backend();
    let service = create_test_service(&backend);

    let request: ProductSearchRequest = serde_json::from_value(json!({ "textQuery": "  " })).unwrap();
    let response = service.search(&request).await.unwrap();

    assert_eq!(response.total_hits, 0);
    assert!(response.products.is_empty());
    assert!(response.facets.is_empty());
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_pagination_and_sort() {
    let backend = scripted_backend();
    let service = create_test_service(&backend);

    let request = ProductSearchRequest::new("jeans")
        .with_page(1)
        .with_page_size(2);
    let response = service.search(&request).await.unwrap();

    let searches = backend.searches();
    assert_eq!(searches.len(), 1);
    let (target, body) = &searches[0];
    assert_eq!(target, ALIAS);
    assert_eq!(body.from, 2);
    assert_eq!(body.size, 2);
    assert_eq!(body.track_total_hits, Some(true));
    assert_eq!(
        serde_json::to_value(&body.sort).unwrap(),
        json!([{ "_score": { "order": "desc" } }, { "_id": { "order": "desc" } }])
    );

    // Hits come back in engine order with ids merged in
    let ids: Vec<_> = response.products.iter().map(|p| p.id.clone().unwrap()).collect();
    assert_eq!(ids, vec!["3", "4"]);
    assert_eq!(response.total_hits, 8);
}

#[tokio::test]
async fn test_request_json_aliases() {
    let backend = scripted_backend();
    let service = create_test_service(&backend);

    let request: ProductSearchRequest =
        serde_json::from_value(json!({ "queryText": "jeans", "size": 2, "page": 1 })).unwrap();
    service.search(&request).await.unwrap();

    let (_, body) = &backend.searches()[0];
    assert_eq!((body.from, body.size), (2, 2));
}

#[tokio::test]
async fn test_blue_l_jeans_query_structure() {
    let backend = scripted_backend();
    let service = create_test_service(&backend);

    service
        .search(&ProductSearchRequest::new("blue L jeans"))
        .await
        .unwrap();

    let (_, body) = &backend.searches()[0];
    let query = serde_json::to_value(&body.query).unwrap();
    let must = query["bool"]["must"].as_array().unwrap();
    assert_eq!(must.len(), 3);

    assert_eq!(
        must[0],
        json!({ "bool": {
            "should": [{ "nested": {
                "path": "skus",
                "query": { "term": { "skus.color": { "value": "Blue" } } },
                "score_mode": "sum"
            }}],
            "boost": 3.0
        }})
    );
    assert_eq!(must[1]["bool"]["boost"], 2.0);
    assert_eq!(
        must[1]["bool"]["should"][0]["nested"]["query"]["term"]["skus.size"]["value"],
        "L"
    );
    assert_eq!(
        must[2],
        json!({ "bool": { "should": [
            { "multi_match": {
                "query": "jeans",
                "fields": ["brand", "name"],
                "type": "cross_fields",
                "operator": "and"
            }},
            { "multi_match": {
                "query": "jeans",
                "fields": ["brand.shingles", "name.shingles"],
                "type": "cross_fields",
                "boost": 5.0
            }}
        ]}})
    );
}

#[tokio::test]
async fn test_facets_preserve_engine_order() {
    let backend = scripted_backend();
    let response = create_test_service(&backend)
        .search(&ProductSearchRequest::new("jeans"))
        .await
        .unwrap();

    assert_eq!(
        response.facets["brand"],
        vec![FacetBucket::new("Calvin Klein", 4), FacetBucket::new("Levi's", 4)]
    );
    let price: Vec<_> = response.facets["price"].iter().map(|b| b.value.as_str()).collect();
    assert_eq!(price, vec!["Cheap", "Average", "Expensive"]);
    assert_eq!(response.facets["price"][2].count, 0);

    let sizes: Vec<_> = response.facets["size"].iter().map(|b| b.value.as_str()).collect();
    assert_eq!(sizes, vec!["L", "M", "S", "XL", "XXL", "XS"]);
    assert_eq!(response.facets["color"][0], FacetBucket::new("Blue", 7));
}

#[tokio::test]
async fn test_missing_facet_fails_whole_search() {
    let backend = InMemoryBackend::new();
    let mut raw: RawSearchResponse = raw_response(&[], 0, "eq");
    raw.aggregations.remove("color_nested");
    backend.set_search_response(raw);

    let result = create_test_service(&backend)
        .search(&ProductSearchRequest::new("jeans"))
        .await;

    assert!(matches!(result, Err(SearchError::SearchFailed(_))));
}

#[tokio::test]
async fn test_backend_failure_is_search_failed() {
    let backend = scripted_backend();
    backend.fail(BackendOp::Search, InjectedFailure::Unavailable);

    let result = create_test_service(&backend)
        .search(&ProductSearchRequest::new("jeans"))
        .await;
    assert!(matches!(result, Err(SearchError::SearchFailed(_))));
}

#[tokio::test]
async fn test_lower_bound_totals_when_not_tracking() {
    // Without the flag the engine counts up to its default threshold and says so
    let backend = InMemoryBackend::new();
    backend.set_search_response(raw_response(&[], 10_000, "gte"));
    let service = SearchService::new(
        Arc::new(backend.clone()),
        ALIAS,
        SearchConfig {
            track_total_hits: false,
            ..Default::default()
        },
    );

    let response = service
        .search(&ProductSearchRequest::new("jeans"))
        .await
        .unwrap();

    let body = serde_json::to_value(&backend.searches()[0].1).unwrap();
    assert!(body.get("track_total_hits").is_none());
    assert_eq!(response.total_hits, 10_000);
    assert_eq!(response.total_hits_relation, TotalHitsRelation::Gte);
}

#[tokio::test]
async fn test_response_without_total_is_not_a_page_count() {
    let backend = InMemoryBackend::new();
    let corpus = jeans_corpus();
    let mut raw = raw_response(&[("3", corpus[2].clone()), ("4", corpus[3].clone())], 8, "eq");
    raw.hits.total = None;
    backend.set_search_response(raw);

    let result = create_test_service(&backend)
        .search(&ProductSearchRequest::new("jeans").with_page(1).with_page_size(2))
        .await;

    assert!(matches!(result, Err(SearchError::SearchFailed(_))));
}

#[tokio::test]
async fn test_configurable_tie_break_field() {
    let backend = scripted_backend();
    let service = SearchService::new(
        Arc::new(backend.clone()),
        ALIAS,
        SearchConfig {
            tie_break_field: "brand.keyword".to_string(),
            ..Default::default()
        },
    );

    service
        .search(&ProductSearchRequest::new("jeans"))
        .await
        .unwrap();

    let sort = serde_json::to_value(&backend.searches()[0].1.sort).unwrap();
    assert_eq!(sort[1], json!({ "brand.keyword": { "order": "desc" } }));
}

#[tokio::test]
async fn test_analyzer_only_output_yields_empty_response() {
    let backend = scripted_backend();
    let response = create_test_service(&backend)
        .search(&ProductSearchRequest::new("!!! ???"))
        .await
        .unwrap();

    assert!(response.is_empty());
    assert_eq!(backend.calls(), vec![BackendOp::Analyze]);
}
