//! Search configuration

use serde::{Deserialize, Serialize};

/// Search service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Analyzer profile used to tokenize query text
    #[serde(default = "default_analyzer")]
    pub analyzer: String,

    /// Secondary sort field applied after relevance
    ///
    /// `_id` sorts on Elasticsearch 7.x. On 8.x `_id` fielddata is disabled unless
    /// `indices.id_field_data.enabled` is set, so point this at a keyword field instead.
    #[serde(default = "default_tie_break_field")]
    pub tie_break_field: String,

    /// Ask the backend for an exact hit count
    #[serde(default = "default_track_total_hits")]
    pub track_total_hits: bool,

    /// Bucket count requested for the nested color and size facets
    #[serde(default = "default_nested_facet_size")]
    pub nested_facet_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            analyzer: default_analyzer(),
            tie_break_field: default_tie_break_field(),
            track_total_hits: default_track_total_hits(),
            nested_facet_size: default_nested_facet_size(),
        }
    }
}

fn default_analyzer() -> String {
    "text_analyzer".to_string()
}

fn default_tie_break_field() -> String {
    "_id".to_string()
}

fn default_track_total_hits() -> bool {
    true
}

fn default_nested_facet_size() -> usize {
    100
}
