//! Cron-driven rebuild scheduler

use super::{
    config::SchedulerConfig,
    error::{SchedulerError, SchedulerResult},
    jobs::RebuildJob,
};
use std::sync::Arc;
use tokio_cron_scheduler::{JobScheduler, JobSchedulerError};
use tracing::{error, info, warn};

/// Triggers index rebuilds on a cron schedule
pub struct SchedulerService {
    /// Configuration
    config: SchedulerConfig,

    /// Underlying tokio-cron-scheduler instance
    scheduler: JobScheduler,

    /// Shared with the startup rebuild so triggers never overlap
    job: RebuildJob,

    /// Whether the scheduler is running
    running: Arc<tokio::sync::RwLock<bool>>,
}

impl SchedulerService {
    /// Create a new scheduler service
    pub async fn new(config: SchedulerConfig, job: RebuildJob) -> SchedulerResult<Self> {
        info!("Initializing rebuild scheduler");

        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| SchedulerError::StartupFailed(e.to_string()))?;

        Ok(Self {
            config,
            scheduler,
            job,
            running: Arc::new(tokio::sync::RwLock::new(false)),
        })
    }

    pub fn job(&self) -> &RebuildJob {
        &self.job
    }

    /// Register the rebuild job and start ticking
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if !self.config.enabled {
            info!("Rebuild scheduler is disabled in configuration");
            return Ok(());
        }

        let mut running = self.running.write().await;
        if *running {
            warn!("Scheduler is already running");
            return Ok(());
        }

        let job = self.job.clone();
        let cron_job = tokio_cron_scheduler::Job::new_async(
            self.config.schedule.as_str(),
            move |_uuid, _l| {
                let job = job.clone();
                Box::pin(async move {
                    match job.run("schedule").await {
                        Some(Ok(report)) => info!(
                            generation = %report.generation,
                            documents = report.documents_indexed,
                            "Scheduled rebuild completed"
                        ),
                        Some(Err(e)) => error!(error = %e, "Scheduled rebuild failed"),
                        None => {}
                    }
                })
            },
        )
        .map_err(|e: JobSchedulerError| {
            SchedulerError::InvalidCronExpression(format!("{}: {}", self.config.schedule, e))
        })?;

        self.scheduler
            .add(cron_job)
            .await
            .map_err(|e| SchedulerError::JobCreationFailed(e.to_string()))?;

        self.scheduler
            .start()
            .await
            .map_err(|e| SchedulerError::StartupFailed(e.to_string()))?;

        *running = true;
        info!(schedule = %self.config.schedule, "Rebuild scheduler started");
        Ok(())
    }

    /// Stop the scheduler
    pub async fn shutdown(&mut self) -> SchedulerResult<()> {
        {
            let mut running = self.running.write().await;
            if !*running {
                return Ok(());
            }
            *running = false;
        }

        info!("Shutting down rebuild scheduler");
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| SchedulerError::ShutdownFailed(e.to_string()))?;

        Ok(())
    }

    /// Check if scheduler is running
    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::indexer::{IndexLifecycleManager, IndexerConfig};
    use crate::scheduler::SchedulerConfigBuilder;

    fn job() -> RebuildJob {
        RebuildJob::new(Arc::new(IndexLifecycleManager::new(
            Arc::new(InMemoryBackend::new()),
            IndexerConfig::default(),
        )))
    }

    #[tokio::test]
    async fn test_disabled_scheduler_does_not_start() {
        let config = SchedulerConfigBuilder::new().enabled(false).build();
        let mut scheduler = SchedulerService::new(config, job()).await.unwrap();

        scheduler.start().await.unwrap();
        assert!(!scheduler.is_running().await);
    }

    #[tokio::test]
    async fn test_invalid_cron_expression() {
        let config = SchedulerConfigBuilder::new()
            .enabled(true)
            .schedule("not a cron")
            .build();
        let mut scheduler = SchedulerService::new(config, job()).await.unwrap();

        let result = scheduler.start().await;
        assert!(matches!(result, Err(SchedulerError::InvalidCronExpression(_))));
        assert!(!scheduler.is_running().await);
    }

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let config = SchedulerConfigBuilder::new().enabled(true).build();
        let mut scheduler = SchedulerService::new(config, job()).await.unwrap();

        scheduler.start().await.unwrap();
        assert!(scheduler.is_running().await);

        scheduler.shutdown().await.unwrap();
        assert!(!scheduler.is_running().await);
    }
}
