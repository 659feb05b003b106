/// Configuration for the Prometheus exporter

use serde::{Deserialize, Serialize};

/// Configuration for metrics collection and export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable metrics collection and the export endpoint
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Endpoint path for metrics export
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Paths excluded from HTTP metrics
    #[serde(default = "default_excluded_paths")]
    pub excluded_paths: Vec<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            excluded_paths: default_excluded_paths(),
        }
    }
}

impl MetricsConfig {
    /// Check if a path should be excluded from HTTP metrics
    pub fn is_path_excluded(&self, path: &str) -> bool {
        self.excluded_paths.iter().any(|excluded| {
            if let Some(prefix) = excluded.strip_suffix('*') {
                path.starts_with(prefix)
            } else {
                path == excluded
            }
        })
    }
}

fn default_enabled() -> bool {
    true
}

fn default_endpoint() -> String {
    "/metrics".to_string()
}

fn default_excluded_paths() -> Vec<String> {
    vec!["/metrics".to_string(), "/health*".to_string()]
}
