//! Faceted product search over an Elasticsearch-compatible engine
//!
//! - [`indexer`]: zero-downtime rebuilds behind an alias with generation retention
//! - [`search`]: query compilation, execution and result mapping
//! - [`backend`]: the engine abstraction and its REST and in-memory implementations
//! - [`api`]: the HTTP surface

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod indexer;
pub mod metrics;
pub mod models;
pub mod scheduler;
pub mod search;

pub use error::{AppError, Result};
