//! Compilation of free text into a structured query plus facet aggregations

use crate::backend::dsl::{
    Aggregation, AggregationSpec, BoolQuery, BucketOrder, MultiMatchQuery, Operator, Query,
    RangeAggregation, RangeBucket, ScoreMode, SortOrder, TermsAggregation,
};
use crate::backend::SearchBackend;
use crate::models::{Color, Size, FACET_BRAND, FACET_COLOR, FACET_PRICE, FACET_SIZE};
use crate::search::error::SearchResult;
use std::sync::Arc;
use tracing::debug;

const SKUS_PATH: &str = "skus";
const SIZE_BOOST: f32 = 2.0;
const COLOR_BOOST: f32 = 3.0;
const SHINGLES_BOOST: f32 = 5.0;
const BRAND_FACET_SIZE: usize = 10;

/// Where a facet's buckets live in the raw aggregation result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacetDefinition {
    /// Public facet name, also the inner aggregation name
    pub name: &'static str,
    /// Name of the nested wrapper aggregation, if any
    pub wrapper: Option<&'static str>,
}

/// Facets requested with every search, in response order
pub const FACETS: [FacetDefinition; 4] = [
    FacetDefinition {
        name: FACET_BRAND,
        wrapper: None,
    },
    FacetDefinition {
        name: FACET_PRICE,
        wrapper: None,
    },
    FacetDefinition {
        name: FACET_COLOR,
        wrapper: Some("color_nested"),
    },
    FacetDefinition {
        name: FACET_SIZE,
        wrapper: Some("size_nested"),
    },
];

/// Price facet buckets as `(label, from, to)`
pub const PRICE_RANGES: [(&str, f64, Option<f64>); 3] = [
    ("Cheap", 0.0, Some(100.0)),
    ("Average", 100.0, Some(500.0)),
    ("Expensive", 500.0, None),
];

/// Class of an analyzed query token; classes are mutually exclusive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenClass {
    Size(Size),
    Color(Color),
    Text(String),
}

impl TokenClass {
    /// Classify a token, ignoring case
    pub fn classify(token: &str) -> Self {
        if let Ok(size) = token.parse::<Size>() {
            TokenClass::Size(size)
        } else if let Ok(color) = token.parse::<Color>() {
            TokenClass::Color(color)
        } else {
            TokenClass::Text(token.to_string())
        }
    }

    /// Clause matching this token
    pub fn clause(&self) -> Query {
        match self {
            TokenClass::Size(size) => sku_clause("skus.size", size.to_string(), SIZE_BOOST),
            TokenClass::Color(color) => sku_clause("skus.color", color.to_string(), COLOR_BOOST),
            TokenClass::Text(text) => BoolQuery::new()
                .should(
                    MultiMatchQuery::cross_fields(text.as_str(), &["brand", "name"])
                        .operator(Operator::And)
                        .into(),
                )
                .should(
                    MultiMatchQuery::cross_fields(
                        text.as_str(),
                        &["brand.shingles", "name.shingles"],
                    )
                    .boost(SHINGLES_BOOST)
                    .into(),
                )
                .into(),
        }
    }
}

fn sku_clause(field: &str, value: String, boost: f32) -> Query {
    BoolQuery::new()
        .should(Query::nested(
            SKUS_PATH,
            Query::term(field, value),
            ScoreMode::Sum,
        ))
        .boost(boost)
        .into()
}

/// Output of [`QueryCompiler::compile`]
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub query: Query,
    pub aggregations: AggregationSpec,
    pub tokens: Vec<TokenClass>,
}

/// Turns query text into a structured query using the backend analyzer
pub struct QueryCompiler {
    backend: Arc<dyn SearchBackend>,
    analyzer: String,
    nested_facet_size: usize,
}

impl QueryCompiler {
    pub fn new(backend: Arc<dyn SearchBackend>, analyzer: impl Into<String>) -> Self {
        Self {
            backend,
            analyzer: analyzer.into(),
            nested_facet_size: 100,
        }
    }

    pub fn with_nested_facet_size(mut self, size: usize) -> Self {
        self.nested_facet_size = size;
        self
    }

    /// Analyze `text` against `target` and build the query
    ///
    /// Returns `None` when analysis produces no tokens.
    pub async fn compile(&self, target: &str, text: &str) -> SearchResult<Option<CompiledQuery>> {
        let tokens = self.backend.analyze(target, &self.analyzer, text).await?;
        debug!(analyzer = %self.analyzer, tokens = ?tokens, "Analyzed query text");

        if tokens.is_empty() {
            return Ok(None);
        }

        let tokens: Vec<TokenClass> = tokens.iter().map(|t| TokenClass::classify(t)).collect();
        Ok(Some(CompiledQuery {
            query: build_query(&tokens),
            aggregations: self.aggregation_spec(),
            tokens,
        }))
    }

    /// Aggregations computed over the matched products
    pub fn aggregation_spec(&self) -> AggregationSpec {
        let bucket_order = || {
            vec![
                BucketOrder::Count(SortOrder::Desc),
                BucketOrder::Key(SortOrder::Asc),
            ]
        };
        let terms = |field: &str, size: usize| {
            Aggregation::Terms(TermsAggregation {
                field: field.to_string(),
                size,
                order: bucket_order(),
            })
        };
        let nested = |name: &str, field: &str| Aggregation::Nested {
            path: SKUS_PATH.to_string(),
            aggs: AggregationSpec::new().with(name, terms(field, self.nested_facet_size)),
        };

        AggregationSpec::new()
            .with(FACET_BRAND, terms("brand.keyword", BRAND_FACET_SIZE))
            .with(
                FACET_PRICE,
                Aggregation::Range(RangeAggregation {
                    field: "price".to_string(),
                    ranges: PRICE_RANGES
                        .iter()
                        .map(|(key, from, to)| RangeBucket::new(*key, *from, *to))
                        .collect(),
                }),
            )
            .with("color_nested", nested(FACET_COLOR, "skus.color"))
            .with("size_nested", nested(FACET_SIZE, "skus.size"))
    }
}

/// Every token must match; within a token any sub-clause may
pub fn build_query(tokens: &[TokenClass]) -> Query {
    tokens
        .iter()
        .fold(BoolQuery::new(), |query, token| query.must(token.clause()))
        .into()
}
