//! Index lifecycle management
//!
//! Rebuilds the product collection without interrupting searches:
//!
//! ```text
//!   settings.json  mappings.json  products.json
//!         └──────────┬─────┘            │
//!                    ▼                  ▼
//!             ┌─────────────┐   ┌───────────────┐
//!             │SchemaLoader │   │ ProductSource │
//!             └──────┬──────┘   └───────┬───────┘
//!                    └────────┬─────────┘
//!                             ▼
//!              ┌─────────────────────────────┐
//!              │    IndexLifecycleManager    │
//!              │ create ▶ load ▶ swap ▶ prune│
//!              └──────────────┬──────────────┘
//!                             ▼
//!        alias ──▶ {alias}_{millis}   (older generations pruned)
//! ```

mod config;
mod error;
mod generation;
mod lifecycle;
mod schema;

pub use config::{IndexerConfig, IndexerConfigBuilder};
pub use error::{FailedDocument, IndexerError, IndexerResult};
pub use generation::{select_for_pruning, Clock, Generation, ManualClock, SystemClock};
pub use lifecycle::{IndexLifecycleManager, PruneWarning, RebuildReport, RebuildStage, RebuildState};
pub use schema::{JsonFileSource, ProductSource, SchemaLoader, StaticSource};
