//! Typed subset of the engine's query and aggregation language
//!
//! Every type serializes to the JSON shape the Elasticsearch `_search` endpoint
//! expects, so a compiled query can be sent as-is and compared structurally in
//! tests.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

/// Structured query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    Bool(BoolQuery),
    Nested(NestedQuery),
    Term(TermQuery),
    MultiMatch(MultiMatchQuery),
}

impl Query {
    /// Nested query evaluated against sub-documents at `path`
    pub fn nested(path: impl Into<String>, query: Query, score_mode: ScoreMode) -> Self {
        Query::Nested(NestedQuery {
            path: path.into(),
            query: Box::new(query),
            score_mode,
        })
    }

    /// Exact term query
    pub fn term(field: impl Into<String>, value: impl Into<String>) -> Self {
        Query::Term(TermQuery {
            field: field.into(),
            value: value.into(),
        })
    }
}

/// Boolean combination of clauses
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoolQuery {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Query>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Query>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, query: Query) -> Self {
        self.must.push(query);
        self
    }

    pub fn should(mut self, query: Query) -> Self {
        self.should.push(query);
        self
    }

    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = Some(boost);
        self
    }
}

impl From<BoolQuery> for Query {
    fn from(query: BoolQuery) -> Self {
        Query::Bool(query)
    }
}

/// How matching sub-document scores roll up into the parent score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMode {
    Sum,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestedQuery {
    pub path: String,
    pub query: Box<Query>,
    pub score_mode: ScoreMode,
}

/// Exact match on an untokenized field
#[derive(Debug, Clone, PartialEq)]
pub struct TermQuery {
    pub field: String,
    pub value: String,
}

impl Serialize for TermQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            value: &'a str,
        }

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &Body { value: &self.value })?;
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiMatchType {
    CrossFields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    And,
}

/// Match one text against several fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiMatchQuery {
    pub query: String,
    pub fields: Vec<String>,

    #[serde(rename = "type")]
    pub match_type: MultiMatchType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

impl MultiMatchQuery {
    pub fn cross_fields(query: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            query: query.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            match_type: MultiMatchType::CrossFields,
            operator: None,
            boost: None,
        }
    }

    pub fn operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = Some(boost);
        self
    }
}

impl From<MultiMatchQuery> for Query {
    fn from(query: MultiMatchQuery) -> Self {
        Query::MultiMatch(query)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Bucket ordering criterion for terms aggregations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketOrder {
    Count(SortOrder),
    Key(SortOrder),
}

impl Serialize for BucketOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (key, order) = match self {
            BucketOrder::Count(order) => ("_count", order),
            BucketOrder::Key(order) => ("_key", order),
        };
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(key, order)?;
        map.end()
    }
}

/// One sort criterion of a search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub order: SortOrder,
}

impl SortField {
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

impl Serialize for SortField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Body {
            order: SortOrder,
        }

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &Body { order: self.order })?;
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermsAggregation {
    pub field: String,
    pub size: usize,
    pub order: Vec<BucketOrder>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeBucket {
    pub key: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<f64>,
}

impl RangeBucket {
    /// Half-open range `[from, to)`; `to = None` is unbounded
    pub fn new(key: impl Into<String>, from: f64, to: Option<f64>) -> Self {
        Self {
            key: key.into(),
            from: Some(from),
            to,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeAggregation {
    pub field: String,
    pub ranges: Vec<RangeBucket>,
}

/// Aggregation request
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    Terms(TermsAggregation),
    Range(RangeAggregation),
    /// Runs `aggs` over the sub-documents at `path`
    Nested { path: String, aggs: AggregationSpec },
}

impl Serialize for Aggregation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct NestedPath<'a> {
            path: &'a str,
        }

        let mut map = serializer.serialize_map(None)?;
        match self {
            Aggregation::Terms(terms) => map.serialize_entry("terms", terms)?,
            Aggregation::Range(range) => map.serialize_entry("range", range)?,
            Aggregation::Nested { path, aggs } => {
                map.serialize_entry("nested", &NestedPath { path })?;
                map.serialize_entry("aggs", aggs)?;
            }
        }
        map.end()
    }
}

/// Named aggregations sent alongside a query
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AggregationSpec(BTreeMap<String, Aggregation>);

impl AggregationSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, aggregation: Aggregation) -> Self {
        self.0.insert(name.into(), aggregation);
        self
    }
}
