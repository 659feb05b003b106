//! Index lifecycle configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for rebuilding the product collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Public alias clients query against
    #[serde(default = "default_alias")]
    pub alias: String,

    /// Number of generations kept after a rebuild, including the live one
    #[serde(default = "default_retention_count")]
    pub retention_count: usize,

    /// Index settings document (analyzers, shards)
    #[serde(default = "default_settings_path")]
    pub settings_path: PathBuf,

    /// Index mappings document
    #[serde(default = "default_mappings_path")]
    pub mappings_path: PathBuf,

    /// Product corpus, a JSON array of products
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Documents per bulk request
    #[serde(default = "default_bulk_chunk_size")]
    pub bulk_chunk_size: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            alias: default_alias(),
            retention_count: default_retention_count(),
            settings_path: default_settings_path(),
            mappings_path: default_mappings_path(),
            data_path: default_data_path(),
            bulk_chunk_size: default_bulk_chunk_size(),
        }
    }
}

/// Builder for IndexerConfig
pub struct IndexerConfigBuilder {
    config: IndexerConfig,
}

impl IndexerConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: IndexerConfig::default(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.config.alias = alias.into();
        self
    }

    pub fn retention_count(mut self, count: usize) -> Self {
        self.config.retention_count = count;
        self
    }

    pub fn settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.settings_path = path.into();
        self
    }

    pub fn mappings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.mappings_path = path.into();
        self
    }

    pub fn data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_path = path.into();
        self
    }

    pub fn bulk_chunk_size(mut self, size: usize) -> Self {
        self.config.bulk_chunk_size = size;
        self
    }

    pub fn build(self) -> IndexerConfig {
        self.config
    }
}

impl Default for IndexerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_alias() -> String {
    "product_index".to_string()
}

fn default_retention_count() -> usize {
    3
}

fn default_settings_path() -> PathBuf {
    PathBuf::from("resources/elastic/settings.json")
}

fn default_mappings_path() -> PathBuf {
    PathBuf::from("resources/elastic/mappings.json")
}

fn default_data_path() -> PathBuf {
    PathBuf::from("resources/data/products.json")
}

fn default_bulk_chunk_size() -> usize {
    500
}
