//! Scheduled index rebuilds
//!
//! Rebuilds are triggered at startup and on a cron schedule via
//! tokio-cron-scheduler. All triggers go through one [`RebuildJob`], which
//! skips a trigger while another rebuild is still running.
//!
//! # Example
//!
//! ```no_run
//! use product_search::backend::InMemoryBackend;
//! use product_search::indexer::{IndexLifecycleManager, IndexerConfig};
//! use product_search::scheduler::{RebuildJob, SchedulerConfig, SchedulerService};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = IndexLifecycleManager::new(
//!         Arc::new(InMemoryBackend::new()),
//!         IndexerConfig::default(),
//!     );
//!     let job = RebuildJob::new(Arc::new(manager));
//!     let mut scheduler = SchedulerService::new(SchedulerConfig::default(), job).await?;
//!
//!     scheduler.start().await?;
//!     tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
//!     scheduler.shutdown().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod jobs;

pub use config::{SchedulerConfig, SchedulerConfigBuilder};
pub use core::SchedulerService;
pub use error::{SchedulerError, SchedulerResult};
pub use jobs::RebuildJob;
