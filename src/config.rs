use crate::backend::BackendConfig;
use crate::indexer::IndexerConfig;
use crate::metrics::MetricsConfig;
use crate::scheduler::SchedulerConfig;
use crate::search::SearchConfig;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Search engine connection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Alias, retention and schema sources for rebuilds
    #[serde(default)]
    pub index: IndexerConfig,

    /// Query compilation and execution
    #[serde(default)]
    pub search: SearchConfig,

    /// Rebuild triggers
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// A file named by `CONFIG_PATH` must exist; without it `config/default.toml`
    /// is read when present.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(std::env::var("CONFIG_PATH").ok().as_deref())
    }

    /// Load configuration, requiring `path` when one is given
    pub fn load_from(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let (config_path, required) = match path {
            Some(path) => (path, true),
            None => ("config/default.toml", false),
        };

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(config_path).required(required))
            // Override with environment variables (prefix: PRODUCT_SEARCH_)
            .add_source(
                config::Environment::with_prefix("PRODUCT_SEARCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Reject settings that would only fail later at runtime
    pub fn validate(&self) -> Result<(), String> {
        if self.index.alias.trim().is_empty() {
            return Err("index.alias must not be empty".to_string());
        }
        if self.index.retention_count == 0 {
            return Err("index.retention_count must be at least 1".to_string());
        }
        if self.index.bulk_chunk_size == 0 {
            return Err("index.bulk_chunk_size must be at least 1".to_string());
        }
        if self.search.tie_break_field.trim().is_empty() {
            return Err("search.tie_break_field must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Allowed CORS origins; empty allows any
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Prometheus exporter
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            service_name: default_service_name(),
            metrics: MetricsConfig::default(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "product-search".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults_parse() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.index.alias, "product_index");
        assert_eq!(config.index.retention_count, 3);
        assert_eq!(config.search.analyzer, "text_analyzer");
        assert_eq!(config.backend.url, "http://localhost:9200");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_retention() {
        let mut config = Config::default();
        config.index.retention_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_config_path_must_exist() {
        let result = Config::load_from(Some("/nonexistent/product-search.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_config_file_overrides_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[index]\nalias = \"catalog\"\nretention_count = 5\n").unwrap();

        let config = Config::load_from(path.to_str()).unwrap();
        assert_eq!(config.index.alias, "catalog");
        assert_eq!(config.index.retention_count, 5);
        assert_eq!(config.search.analyzer, "text_analyzer");
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(ServerConfig::default().bind_address(), "0.0.0.0:8080");
    }
}
