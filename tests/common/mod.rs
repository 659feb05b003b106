//! Shared fixtures for integration tests
#![allow(dead_code)]

use product_search::backend::{InMemoryBackend, RawSearchResponse};
use product_search::indexer::{
    IndexLifecycleManager, IndexerConfig, IndexerConfigBuilder, ManualClock, StaticSource,
};
use product_search::models::Product;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

pub const ALIAS: &str = "product_index";

/// Schema files on disk for the lifecycle manager
pub struct SchemaFiles {
    pub dir: TempDir,
}

impl SchemaFiles {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            json!({ "analysis": { "analyzer": { "text_analyzer": { "tokenizer": "standard" } } } })
                .to_string(),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("mappings.json"),
            json!({ "properties": { "skus": { "type": "nested" } } }).to_string(),
        )
        .unwrap();
        Self { dir }
    }

    /// Builder pointing at these files, for tests that tune other settings
    pub fn builder(&self) -> IndexerConfigBuilder {
        IndexerConfigBuilder::new()
            .alias(ALIAS)
            .settings_path(self.dir.path().join("settings.json"))
            .mappings_path(self.dir.path().join("mappings.json"))
            .data_path(self.dir.path().join("products.json"))
    }

    pub fn config(&self) -> IndexerConfig {
        self.builder().build()
    }
}

/// Eight pairs of jeans from two brands
pub fn jeans_corpus() -> Vec<Product> {
    vec![
        Product::new("Calvin Klein", "Slim fit jeans", 120.0)
            .with_sku("Blue", "S")
            .with_sku("Black", "L"),
        Product::new("Calvin Klein", "Straight leg jeans", 150.0)
            .with_sku("Blue", "M")
            .with_sku("Black", "XXL"),
        Product::new("Calvin Klein", "High rise skinny jeans", 89.0)
            .with_sku("Blue", "XS")
            .with_sku("White", "M"),
        Product::new("Calvin Klein", "Relaxed fit jeans", 210.0).with_sku("Blue", "L"),
        Product::new("Levi's", "501 original jeans", 98.0)
            .with_sku("Blue", "M")
            .with_sku("Black", "XL"),
        Product::new("Levi's", "511 slim jeans", 110.0)
            .with_sku("Red", "L")
            .with_sku("Black", "XXL"),
        Product::new("Levi's", "Ribcage straight jeans", 130.0).with_sku("Blue", "S"),
        Product::new("Levi's", "Wedgie jeans", 125.0)
            .with_sku("Blue", "L")
            .with_sku("Black", "XL"),
    ]
}

/// Lifecycle manager over `backend` with a manual clock and the jeans corpus
pub fn lifecycle(
    backend: &InMemoryBackend,
    files: &SchemaFiles,
    clock: Arc<ManualClock>,
) -> IndexLifecycleManager {
    IndexLifecycleManager::new(Arc::new(backend.clone()), files.config())
        .with_source(Arc::new(StaticSource::new(jeans_corpus())))
        .with_clock(clock)
}

fn buckets(pairs: &[(&str, u64)]) -> Value {
    json!({
        "buckets": pairs
            .iter()
            .map(|(key, count)| json!({ "key": key, "doc_count": count }))
            .collect::<Vec<_>>()
    })
}

/// Aggregations the engine returns for a "jeans" search over the corpus
pub fn jeans_aggregations() -> Value {
    json!({
        "brand": buckets(&[("Calvin Klein", 4), ("Levi's", 4)]),
        "price": {
            "buckets": [
                { "key": "Cheap", "from": 0.0, "to": 100.0, "doc_count": 2 },
                { "key": "Average", "from": 100.0, "to": 500.0, "doc_count": 6 },
                { "key": "Expensive", "from": 500.0, "doc_count": 0 }
            ]
        },
        "color_nested": {
            "doc_count": 13,
            "color": buckets(&[("Blue", 7), ("Black", 4), ("Red", 1), ("White", 1)])
        },
        "size_nested": {
            "doc_count": 13,
            "size": buckets(&[("L", 4), ("M", 3), ("S", 2), ("XL", 2), ("XXL", 2), ("XS", 1)])
        }
    })
}

/// Raw search response with the given hits (id, product) and total
pub fn raw_response(hits: &[(&str, Product)], total: u64, relation: &str) -> RawSearchResponse {
    let hits: Vec<Value> = hits
        .iter()
        .map(|(id, product)| {
            json!({ "_id": id, "_score": 1.0, "_source": serde_json::to_value(product).unwrap() })
        })
        .collect();

    serde_json::from_value(json!({
        "took": 2,
        "timed_out": false,
        "hits": {
            "total": { "value": total, "relation": relation },
            "hits": hits
        },
        "aggregations": jeans_aggregations()
    }))
    .unwrap()
}

/// Helper function to parse Prometheus exposition format
/// Returns a map of metric lines for easy assertion
pub fn parse_prometheus_output(output: &str) -> HashMap<String, Vec<String>> {
    let mut metrics = HashMap::new();
    let mut current_metric = String::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("# HELP") || line.starts_with("# TYPE") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 3 {
                current_metric = parts[2].to_string();
                metrics
                    .entry(current_metric.clone())
                    .or_insert_with(Vec::new)
                    .push(line.to_string());
            }
        } else if !line.starts_with('#') && !current_metric.is_empty() {
            metrics
                .entry(current_metric.clone())
                .or_insert_with(Vec::new)
                .push(line.to_string());
        }
    }

    metrics
}
