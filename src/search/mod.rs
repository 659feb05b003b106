//! Faceted product search
//!
//! ```text
//! ProductSearchRequest
//!        │
//!        ▼
//! ┌───────────────┐  blank text   ┌─────────────────┐
//! │ SearchService │──────────────▶│ empty response  │
//! └──────┬────────┘               └─────────────────┘
//!        ▼
//! ┌───────────────┐  _analyze     ┌─────────────────┐
//! │ QueryCompiler │◀─────────────▶│  SearchBackend  │
//! └──────┬────────┘               └────────▲────────┘
//!        │ query + aggregations            │ _search
//!        └─────────────────────────────────┘
//!                                          │
//!                               ┌──────────┴──────────┐
//!                               │ map_response        │
//!                               └─────────────────────┘
//! ```

mod config;
mod error;
mod mapper;
mod query;
mod service;

pub use config::SearchConfig;
pub use error::{SearchError, SearchResult};
pub use mapper::map_response;
pub use query::{
    build_query, CompiledQuery, FacetDefinition, QueryCompiler, TokenClass, FACETS, PRICE_RANGES,
};
pub use service::SearchService;
