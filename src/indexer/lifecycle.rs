//! Zero-downtime rebuild of the product collection behind its alias

use crate::backend::{AliasAction, BackendError, IndexSchema, SearchBackend};
use crate::indexer::config::IndexerConfig;
use crate::indexer::error::{FailedDocument, IndexerError, IndexerResult};
use crate::indexer::generation::{select_for_pruning, Clock, Generation, SystemClock};
use crate::indexer::schema::{JsonFileSource, ProductSource, SchemaLoader};
use crate::metrics::{
    INDEXED_DOCUMENTS_TOTAL, REBUILDS_TOTAL, REBUILD_DURATION_SECONDS, RETAINED_GENERATIONS,
};
use crate::models::Product;
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Step of a rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RebuildStage {
    CreatingIndex,
    Loading,
    SwitchingAlias,
    Pruning,
}

impl fmt::Display for RebuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RebuildStage::CreatingIndex => "creating_index",
            RebuildStage::Loading => "loading",
            RebuildStage::SwitchingAlias => "switching_alias",
            RebuildStage::Pruning => "pruning",
        };
        f.write_str(name)
    }
}

/// Observable state of the lifecycle manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "stage", rename_all = "snake_case")]
pub enum RebuildState {
    Idle,
    InProgress(RebuildStage),
    Done,
    Failed(RebuildStage),
}

impl RebuildState {
    pub fn is_running(&self) -> bool {
        matches!(self, RebuildState::InProgress(_))
    }
}

/// Pruning problem that did not fail the rebuild
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PruneWarning {
    /// Generations that were meant to be deleted
    pub generations: Vec<String>,
    pub reason: String,
}

impl fmt::Display for PruneWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generations.is_empty() {
            write!(f, "pruning skipped: {}", self.reason)
        } else {
            write!(
                f,
                "failed to prune {}: {}",
                self.generations.join(", "),
                self.reason
            )
        }
    }
}

/// Outcome of a successful rebuild
#[derive(Debug, Clone, Serialize)]
pub struct RebuildReport {
    pub alias: String,
    /// Generation the alias now points to
    pub generation: String,
    pub documents_indexed: usize,
    /// Generations the alias pointed to before the swap
    pub previous_generations: Vec<String>,
    pub pruned: Vec<String>,
    pub warnings: Vec<PruneWarning>,
    pub duration_ms: u64,
}

/// Builds a new generation, cuts the alias over atomically and prunes old ones
///
/// ```text
/// Idle ─▶ CreatingIndex ─▶ Loading ─▶ SwitchingAlias ─▶ Pruning ─▶ Done
///              │              │             │
///              └──────────────┴─────────────┴──▶ Failed(stage)
/// ```
///
/// Until the swap succeeds the alias keeps serving the previous generation.
pub struct IndexLifecycleManager {
    backend: Arc<dyn SearchBackend>,
    schema_loader: SchemaLoader,
    source: Arc<dyn ProductSource>,
    clock: Arc<dyn Clock>,
    config: IndexerConfig,
    state: RwLock<RebuildState>,
}

impl IndexLifecycleManager {
    /// Create a manager reading schema and corpus from the configured paths
    pub fn new(backend: Arc<dyn SearchBackend>, config: IndexerConfig) -> Self {
        Self {
            backend,
            schema_loader: SchemaLoader::new(&config.settings_path, &config.mappings_path),
            source: Arc::new(JsonFileSource::new(&config.data_path)),
            clock: Arc::new(SystemClock),
            config,
            state: RwLock::new(RebuildState::Idle),
        }
    }

    /// Replace the product corpus
    pub fn with_source(mut self, source: Arc<dyn ProductSource>) -> Self {
        self.source = source;
        self
    }

    /// Replace the clock used to stamp generations
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    pub fn state(&self) -> RebuildState {
        *self.state.read()
    }

    fn set_state(&self, state: RebuildState) {
        *self.state.write() = state;
    }

    fn enter(&self, stage: RebuildStage) {
        debug!(stage = %stage, "Rebuild stage");
        self.set_state(RebuildState::InProgress(stage));
    }

    /// Rebuild the configured alias with the configured retention
    pub async fn rebuild_configured(&self) -> IndexerResult<RebuildReport> {
        let alias = self.config.alias.clone();
        self.rebuild(&alias, self.config.retention_count).await
    }

    /// Rebuild `alias`, keeping at most `retention_count` generations
    pub async fn rebuild(&self, alias: &str, retention_count: usize) -> IndexerResult<RebuildReport> {
        let start = Instant::now();
        info!(alias = %alias, retention = retention_count, "Starting index rebuild");

        self.enter(RebuildStage::CreatingIndex);
        let result = self.run(alias, retention_count, start).await;
        let elapsed = start.elapsed();
        REBUILD_DURATION_SECONDS.observe(elapsed.as_secs_f64());

        match &result {
            Ok(report) => {
                self.set_state(RebuildState::Done);
                REBUILDS_TOTAL.with_label_values(&["success"]).inc();
                info!(
                    alias = %alias,
                    generation = %report.generation,
                    documents = report.documents_indexed,
                    pruned = report.pruned.len(),
                    warnings = report.warnings.len(),
                    duration_ms = report.duration_ms,
                    "Index rebuild completed"
                );
            }
            Err(e) => {
                let stage = match self.state() {
                    RebuildState::InProgress(stage) => stage,
                    _ => RebuildStage::CreatingIndex,
                };
                self.set_state(RebuildState::Failed(stage));
                REBUILDS_TOTAL.with_label_values(&["failed"]).inc();
                error!(
                    alias = %alias,
                    stage = %stage,
                    duration_ms = elapsed.as_millis() as u64,
                    "Index rebuild failed: {}",
                    e
                );
            }
        }

        result
    }

    async fn run(
        &self,
        alias: &str,
        retention_count: usize,
        start: Instant,
    ) -> IndexerResult<RebuildReport> {
        if alias.trim().is_empty() {
            return Err(IndexerError::Configuration("Alias name must not be empty".into()));
        }
        if retention_count == 0 {
            return Err(IndexerError::Configuration(
                "Retention count must be at least 1".into(),
            ));
        }
        if self.config.bulk_chunk_size == 0 {
            return Err(IndexerError::Configuration(
                "Bulk chunk size must be at least 1".into(),
            ));
        }

        let schema = self.schema_loader.load().await?;
        let products = self.source.load_products().await?;
        if products.is_empty() {
            return Err(IndexerError::Configuration(
                "Product corpus is empty; refusing to publish an empty generation".into(),
            ));
        }

        let generation = Generation::at(alias, self.clock.as_ref()).name();
        self.create_generation(&generation, &schema).await?;

        self.enter(RebuildStage::Loading);
        let documents_indexed = match self.load_documents(&generation, &products).await {
            Ok(count) => count,
            Err(e) => {
                self.discard_generation(&generation).await;
                return Err(e);
            }
        };

        self.enter(RebuildStage::SwitchingAlias);
        let previous_generations = self.switch_alias(alias, &generation).await?;

        self.enter(RebuildStage::Pruning);
        let (pruned, warnings) = self.prune(alias, retention_count, &generation).await;

        Ok(RebuildReport {
            alias: alias.to_string(),
            generation,
            documents_indexed,
            previous_generations,
            pruned,
            warnings,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn create_generation(&self, name: &str, schema: &IndexSchema) -> IndexerResult<()> {
        match self.backend.create_collection(name, schema).await {
            Ok(true) => {
                info!(index = %name, "Created index generation");
                Ok(())
            }
            Ok(false) => Err(IndexerError::BackendUnavailable(format!(
                "Creation of index {} was not acknowledged",
                name
            ))),
            Err(BackendError::AlreadyExists(_)) => Err(IndexerError::GenerationExists {
                index: name.to_string(),
            }),
            Err(BackendError::Rejected { reason, .. }) => Err(IndexerError::SchemaRejected {
                index: name.to_string(),
                reason,
            }),
            Err(e) => Err(IndexerError::BackendUnavailable(e.to_string())),
        }
    }

    /// Bulk load all products in chunks, collecting every per-document failure
    async fn load_documents(&self, name: &str, products: &[Product]) -> IndexerResult<usize> {
        let chunk_size = self.config.bulk_chunk_size;
        let mut indexed = 0;
        let mut failed = Vec::new();

        for (chunk_index, chunk) in products.chunks(chunk_size).enumerate() {
            let offset = chunk_index * chunk_size;

            let outcomes = match self.backend.bulk_write(name, chunk).await {
                Ok(outcomes) => outcomes,
                Err(BackendError::Rejected { reason, .. }) => {
                    failed.extend(
                        chunk
                            .iter()
                            .enumerate()
                            .map(|(i, product)| FailedDocument::new(offset + i, product, &reason)),
                    );
                    continue;
                }
                Err(e) => return Err(IndexerError::BackendUnavailable(e.to_string())),
            };

            let mut reported = vec![false; chunk.len()];
            for outcome in outcomes {
                let Some(product) = chunk.get(outcome.position) else {
                    warn!(index = %name, position = outcome.position, "Bulk outcome for unknown position");
                    continue;
                };
                reported[outcome.position] = true;

                if outcome.is_success() {
                    indexed += 1;
                } else {
                    let reason = outcome
                        .error
                        .unwrap_or_else(|| format!("status {}", outcome.status));
                    failed.push(FailedDocument::new(offset + outcome.position, product, reason));
                }
            }

            for (i, seen) in reported.iter().enumerate() {
                if !seen {
                    failed.push(FailedDocument::new(
                        offset + i,
                        &chunk[i],
                        "no outcome reported by backend",
                    ));
                }
            }

            debug!(index = %name, chunk = chunk_index, size = chunk.len(), "Bulk chunk written");
        }

        if !failed.is_empty() {
            failed.sort_by_key(|d| d.position);
            return Err(IndexerError::BulkWritePartialFailure {
                index: name.to_string(),
                total: products.len(),
                failed,
            });
        }

        INDEXED_DOCUMENTS_TOTAL.inc_by(indexed as u64);
        info!(index = %name, documents = indexed, "Loaded documents into generation");
        Ok(indexed)
    }

    /// Best-effort removal of a generation that never went live
    async fn discard_generation(&self, name: &str) {
        match self.backend.delete_collections(&[name.to_string()]).await {
            Ok(true) => info!(index = %name, "Discarded incomplete generation"),
            Ok(false) => warn!(index = %name, "Deletion of incomplete generation not acknowledged"),
            Err(e) => warn!(index = %name, "Failed to discard incomplete generation: {}", e),
        }
    }

    /// Point `alias` at `generation` in one atomic request
    async fn switch_alias(&self, alias: &str, generation: &str) -> IndexerResult<Vec<String>> {
        let previous = self
            .backend
            .get_alias_targets(alias)
            .await
            .map_err(|e| IndexerError::BackendUnavailable(e.to_string()))?;

        let remove: Vec<AliasAction> = previous
            .iter()
            .filter(|index| index.as_str() != generation)
            .map(|index| AliasAction::new(index, alias))
            .collect();
        let add = [AliasAction::new(generation, alias)];

        let not_acknowledged = |reason: String| IndexerError::AliasSwapNotAcknowledged {
            alias: alias.to_string(),
            index: generation.to_string(),
            reason,
        };

        match self.backend.swap_alias(&remove, &add).await {
            Ok(true) => {}
            Ok(false) => return Err(not_acknowledged("request not acknowledged".into())),
            Err(BackendError::Rejected { reason, .. }) => return Err(not_acknowledged(reason)),
            Err(e) => return Err(IndexerError::BackendUnavailable(e.to_string())),
        }

        info!(
            alias = %alias,
            index = %generation,
            previous = ?previous,
            "Alias switched to new generation"
        );
        Ok(previous.into_iter().collect())
    }

    /// Delete generations beyond the retention count; never fails the rebuild
    async fn prune(
        &self,
        alias: &str,
        retention_count: usize,
        live: &str,
    ) -> (Vec<String>, Vec<PruneWarning>) {
        let collections = match self.backend.list_collections(&Generation::pattern(alias)).await {
            Ok(collections) => collections,
            Err(e) => {
                warn!(alias = %alias, "Could not list generations for pruning: {}", e);
                return (
                    Vec::new(),
                    vec![PruneWarning {
                        generations: Vec::new(),
                        reason: e.to_string(),
                    }],
                );
            }
        };

        let doomed = select_for_pruning(alias, &collections, retention_count, live);
        let retained = collections
            .iter()
            .filter(|name| Generation::parse(alias, name).is_some())
            .count()
            - doomed.len();

        if doomed.is_empty() {
            RETAINED_GENERATIONS.set(retained as f64);
            return (Vec::new(), Vec::new());
        }

        let warning = |reason: String| PruneWarning {
            generations: doomed.clone(),
            reason,
        };

        match self.backend.delete_collections(&doomed).await {
            Ok(true) => {
                RETAINED_GENERATIONS.set(retained as f64);
                info!(alias = %alias, pruned = ?doomed, "Pruned old generations");
                (doomed, Vec::new())
            }
            Ok(false) => {
                warn!(alias = %alias, generations = ?doomed, "Prune request not acknowledged");
                (Vec::new(), vec![warning("request not acknowledged".into())])
            }
            Err(e) => {
                warn!(alias = %alias, generations = ?doomed, "Failed to prune generations: {}", e);
                (Vec::new(), vec![warning(e.to_string())])
            }
        }
    }
}
