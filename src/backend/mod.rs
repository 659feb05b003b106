//! Search backend abstraction
//!
//! The lifecycle manager and the search facade only ever talk to the engine
//! through the [`SearchBackend`] trait:
//!
//! ```text
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │  IndexLifecycleManager   │   │      SearchService       │
//! └────────────┬─────────────┘   └────────────┬─────────────┘
//!              └──────────────┬───────────────┘
//!                             ▼
//!                ┌──────────────────────────┐
//!                │    SearchBackend trait   │
//!                └────────────┬─────────────┘
//!              ┌──────────────┴───────────────┐
//!              ▼                              ▼
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │  ElasticsearchBackend    │   │     InMemoryBackend      │
//! │  (REST over reqwest)     │   │  (tests, failure inject) │
//! └──────────────────────────┘   └──────────────────────────┘
//! ```

mod config;
pub mod dsl;
mod elasticsearch;
mod error;
mod memory;
mod traits;
mod types;

pub use config::BackendConfig;
pub use elasticsearch::ElasticsearchBackend;
pub use error::{BackendError, BackendResult};
pub use memory::{InMemoryBackend, InjectedFailure};
pub use traits::SearchBackend;
pub use types::{
    AliasAction, BackendOp, BulkItemOutcome, IndexSchema, RawBucket, RawBuckets, RawHit, RawHits,
    RawSearchResponse, RawTotal, SearchBody,
};
