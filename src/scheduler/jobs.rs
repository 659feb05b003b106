//! Serialized execution of index rebuilds

use crate::indexer::{IndexLifecycleManager, IndexerResult, RebuildReport};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Runs rebuilds one at a time, whatever triggered them
#[derive(Clone)]
pub struct RebuildJob {
    manager: Arc<IndexLifecycleManager>,
    guard: Arc<Mutex<()>>,
}

impl RebuildJob {
    pub fn new(manager: Arc<IndexLifecycleManager>) -> Self {
        Self {
            manager,
            guard: Arc::new(Mutex::new(())),
        }
    }

    pub fn manager(&self) -> &Arc<IndexLifecycleManager> {
        &self.manager
    }

    /// Whether a rebuild started by this job is in flight
    pub fn is_running(&self) -> bool {
        self.guard.try_lock().is_err()
    }

    /// Rebuild the configured alias unless a rebuild is already running
    ///
    /// Returns `None` when the trigger was skipped.
    pub async fn run(&self, trigger: &str) -> Option<IndexerResult<RebuildReport>> {
        let Ok(_permit) = self.guard.try_lock() else {
            warn!(trigger = %trigger, "Rebuild already in progress, skipping trigger");
            return None;
        };

        info!(trigger = %trigger, "Rebuild triggered");
        Some(self.manager.rebuild_configured().await)
    }
}
