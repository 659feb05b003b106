//! Configuration for the rebuild scheduler

use serde::{Deserialize, Serialize};

/// When index rebuilds are triggered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Run the cron job
    #[serde(default)]
    pub enabled: bool,

    /// Rebuild once when the server starts
    #[serde(default = "default_rebuild_on_startup")]
    pub rebuild_on_startup: bool,

    /// Cron expression with a seconds field, evaluated in UTC
    #[serde(default = "default_schedule")]
    pub schedule: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rebuild_on_startup: default_rebuild_on_startup(),
            schedule: default_schedule(),
        }
    }
}

/// Builder for SchedulerConfig
pub struct SchedulerConfigBuilder {
    config: SchedulerConfig,
}

impl SchedulerConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SchedulerConfig::default(),
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    pub fn rebuild_on_startup(mut self, rebuild: bool) -> Self {
        self.config.rebuild_on_startup = rebuild;
        self
    }

    pub fn schedule(mut self, schedule: impl Into<String>) -> Self {
        self.config.schedule = schedule.into();
        self
    }

    pub fn build(self) -> SchedulerConfig {
        self.config
    }
}

impl Default for SchedulerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_rebuild_on_startup() -> bool {
    true
}

fn default_schedule() -> String {
    // 03:00 every day
    "0 0 3 * * *".to_string()
}
