//! Backend capability contract

use crate::backend::error::BackendResult;
use crate::backend::types::{
    AliasAction, BulkItemOutcome, IndexSchema, RawSearchResponse, SearchBody,
};
use crate::models::Product;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Operations the lifecycle manager and the search facade need from a search engine
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Create a collection; returns whether the backend acknowledged the creation
    async fn create_collection(&self, name: &str, schema: &IndexSchema) -> BackendResult<bool>;

    /// Write documents into a collection, returning one outcome per document in order
    async fn bulk_write(
        &self,
        name: &str,
        documents: &[Product],
    ) -> BackendResult<Vec<BulkItemOutcome>>;

    /// Run `text` through the named analyzer of `target`
    async fn analyze(&self, target: &str, analyzer: &str, text: &str) -> BackendResult<Vec<String>>;

    /// Execute a search against an alias or collection
    async fn search(&self, target: &str, body: &SearchBody) -> BackendResult<RawSearchResponse>;

    /// Collections the alias currently points at; empty when the alias does not exist
    async fn get_alias_targets(&self, alias: &str) -> BackendResult<BTreeSet<String>>;

    /// Apply all removals and additions in a single atomic request
    async fn swap_alias(&self, remove: &[AliasAction], add: &[AliasAction]) -> BackendResult<bool>;

    /// Collections matching a wildcard pattern such as `products_*`
    async fn list_collections(&self, pattern: &str) -> BackendResult<Vec<String>>;

    /// Delete the named collections in one request
    async fn delete_collections(&self, names: &[String]) -> BackendResult<bool>;
}
