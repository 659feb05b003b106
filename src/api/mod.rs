pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::backend::SearchBackend;
use crate::indexer::IndexLifecycleManager;
use crate::metrics::MetricsConfig;
use crate::search::SearchService;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
    pub backend: Arc<dyn SearchBackend>,
    pub lifecycle: Option<Arc<IndexLifecycleManager>>,
    pub metrics: Arc<MetricsConfig>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(search: Arc<SearchService>, backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            search,
            backend,
            lifecycle: None,
            metrics: Arc::new(MetricsConfig::default()),
            started_at: Instant::now(),
        }
    }

    /// Expose the rebuild state on the readiness endpoint
    pub fn with_lifecycle(mut self, lifecycle: Arc<IndexLifecycleManager>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    pub fn with_metrics_config(mut self, config: MetricsConfig) -> Self {
        self.metrics = Arc::new(config);
        self
    }
}
