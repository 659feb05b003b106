//! Request and response shapes exchanged with the search backend

use crate::backend::dsl::{AggregationSpec, Query, SortField};
use crate::models::TotalHitsRelation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

/// Backend operations, used for call accounting and failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum BackendOp {
    CreateCollection,
    BulkWrite,
    Analyze,
    Search,
    GetAliasTargets,
    SwapAlias,
    ListCollections,
    DeleteCollections,
}

/// Settings and mappings a collection is created with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSchema {
    pub settings: Value,
    pub mappings: Value,
}

/// One alias binding inside an atomic alias swap
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AliasAction {
    pub index: String,
    pub alias: String,
}

impl AliasAction {
    pub fn new(index: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            alias: alias.into(),
        }
    }
}

/// Outcome of a single document inside a bulk request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItemOutcome {
    /// Position of the document inside the submitted batch
    pub position: usize,

    /// Backend-assigned id, present when the write succeeded
    pub id: Option<String>,

    /// Per-item HTTP-like status
    pub status: u16,

    /// Failure reason
    pub error: Option<String>,
}

impl BulkItemOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status)
    }
}

/// Body of a search call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchBody {
    pub query: Query,
    pub aggs: AggregationSpec,
    pub sort: Vec<SortField>,
    pub from: usize,
    pub size: usize,
    /// `Some(true)` asks for an exact count; omitted, the engine counts up to its default threshold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_total_hits: Option<bool>,
}

/// Raw search result as returned by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSearchResponse {
    pub hits: RawHits,

    #[serde(default)]
    pub aggregations: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHits {
    #[serde(default)]
    pub total: Option<RawTotal>,

    #[serde(default)]
    pub hits: Vec<RawHit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawTotal {
    pub value: u64,

    #[serde(default)]
    pub relation: TotalHitsRelation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHit {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_score", default)]
    pub score: Option<f64>,

    #[serde(rename = "_source")]
    pub source: Value,
}

/// Bucket list of a terms or range aggregation
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawBuckets {
    pub buckets: Vec<RawBucket>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawBucket {
    pub key: Value,

    #[serde(default)]
    pub key_as_string: Option<String>,

    pub doc_count: u64,
}

impl RawBucket {
    /// Display label of the bucket
    pub fn label(&self) -> String {
        if let Some(key) = &self.key_as_string {
            return key.clone();
        }
        match &self.key {
            Value::String(key) => key.clone(),
            other => other.to_string(),
        }
    }
}
