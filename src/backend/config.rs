//! Backend connection configuration

use serde::{Deserialize, Serialize};

/// Connection settings for the Elasticsearch-compatible backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the engine, e.g. `http://localhost:9200`
    #[serde(default = "default_url")]
    pub url: String,

    /// Upper bound for a single backend request (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Upper bound for establishing a connection (seconds)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    5
}
