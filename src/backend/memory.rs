//! In-process backend with scripted search results and failure injection
//!
//! Collections, aliases and bulk writes behave like the real engine closely
//! enough to exercise the index lifecycle end to end. Analysis is a plain
//! lowercase word split and searches return whatever response has been
//! scripted with [`InMemoryBackend::set_search_response`].

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::traits::SearchBackend;
use crate::backend::types::{
    AliasAction, BackendOp, BulkItemOutcome, IndexSchema, RawSearchResponse, SearchBody,
};
use crate::models::Product;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

type DocumentFilter = Arc<dyn Fn(&Product) -> bool + Send + Sync>;

/// Failure an operation should produce instead of its normal result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    /// Behave as if the backend could not be reached
    Unavailable,
    /// Refuse the request with a 400
    Rejected,
    /// Complete the call but report `acknowledged: false` (admin operations only)
    Unacknowledged,
}

#[derive(Debug, Clone)]
struct StoredCollection {
    schema: IndexSchema,
    documents: Vec<(String, Product)>,
}

#[derive(Default)]
struct MemoryState {
    collections: BTreeMap<String, StoredCollection>,
    aliases: BTreeMap<String, BTreeSet<String>>,
    next_id: u64,
    calls: Vec<BackendOp>,
    searches: Vec<(String, SearchBody)>,
    failures: HashMap<BackendOp, InjectedFailure>,
    search_response: Option<RawSearchResponse>,
}

/// In-memory [`SearchBackend`]
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<Mutex<MemoryState>>,
    rejected_documents: Arc<Mutex<Option<DocumentFilter>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future call of `op` fail
    pub fn fail(&self, op: BackendOp, failure: InjectedFailure) {
        self.state.lock().failures.insert(op, failure);
    }

    /// Reject documents matching `filter` during bulk writes
    pub fn reject_documents_where<F>(&self, filter: F)
    where
        F: Fn(&Product) -> bool + Send + Sync + 'static,
    {
        *self.rejected_documents.lock() = Some(Arc::new(filter));
    }

    /// Response returned by every subsequent search
    pub fn set_search_response(&self, response: RawSearchResponse) {
        self.state.lock().search_response = Some(response);
    }

    /// Create a collection directly, bypassing call accounting
    pub fn insert_collection(&self, name: &str) {
        self.state.lock().collections.insert(
            name.to_string(),
            StoredCollection {
                schema: IndexSchema {
                    settings: serde_json::Value::Null,
                    mappings: serde_json::Value::Null,
                },
                documents: Vec::new(),
            },
        );
    }

    /// Bind an alias directly, bypassing call accounting
    pub fn insert_alias(&self, alias: &str, collection: &str) {
        self.state
            .lock()
            .aliases
            .entry(alias.to_string())
            .or_default()
            .insert(collection.to_string());
    }

    /// Every operation invoked so far, in order
    pub fn calls(&self) -> Vec<BackendOp> {
        self.state.lock().calls.clone()
    }

    /// Number of operations invoked so far
    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Targets and bodies of every search executed so far
    pub fn searches(&self) -> Vec<(String, SearchBody)> {
        self.state.lock().searches.clone()
    }

    /// Names of all collections, sorted
    pub fn collection_names(&self) -> Vec<String> {
        self.state.lock().collections.keys().cloned().collect()
    }

    /// Collections currently bound to `alias`
    pub fn alias_targets(&self, alias: &str) -> BTreeSet<String> {
        self.state
            .lock()
            .aliases
            .get(alias)
            .cloned()
            .unwrap_or_default()
    }

    /// Documents stored in a collection, with their assigned ids
    pub fn documents(&self, collection: &str) -> Vec<Product> {
        self.state
            .lock()
            .collections
            .get(collection)
            .map(|c| {
                c.documents
                    .iter()
                    .map(|(id, doc)| doc.clone().with_id(id.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Schema a collection was created with
    pub fn schema(&self, collection: &str) -> Option<IndexSchema> {
        self.state
            .lock()
            .collections
            .get(collection)
            .map(|c| c.schema.clone())
    }

    /// Record the call and return the injected failure for it, if any
    fn enter(state: &mut MemoryState, op: BackendOp) -> BackendResult<Option<InjectedFailure>> {
        state.calls.push(op);
        match state.failures.get(&op).copied() {
            Some(InjectedFailure::Unavailable) => Err(BackendError::Unavailable(format!(
                "injected failure for {}",
                op
            ))),
            Some(InjectedFailure::Rejected) => Err(BackendError::Rejected {
                status: 400,
                reason: format!("injected rejection for {}", op),
            }),
            other => Ok(other),
        }
    }
}

fn matches_pattern(name: &str, pattern: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => name.starts_with(prefix),
        None => name == pattern,
    }
}

fn not_found(what: &str) -> BackendError {
    BackendError::Rejected {
        status: 404,
        reason: format!("no such index [{}]", what),
    }
}

#[async_trait]
impl SearchBackend for InMemoryBackend {
    async fn create_collection(&self, name: &str, schema: &IndexSchema) -> BackendResult<bool> {
        let mut state = self.state.lock();
        if Self::enter(&mut state, BackendOp::CreateCollection)?
            == Some(InjectedFailure::Unacknowledged)
        {
            return Ok(false);
        }
        if state.collections.contains_key(name) || state.aliases.contains_key(name) {
            return Err(BackendError::AlreadyExists(name.to_string()));
        }
        state.collections.insert(
            name.to_string(),
            StoredCollection {
                schema: schema.clone(),
                documents: Vec::new(),
            },
        );
        Ok(true)
    }

    async fn bulk_write(
        &self,
        name: &str,
        documents: &[Product],
    ) -> BackendResult<Vec<BulkItemOutcome>> {
        let rejected = self.rejected_documents.lock().clone();
        let mut state = self.state.lock();
        Self::enter(&mut state, BackendOp::BulkWrite)?;
        if !state.collections.contains_key(name) {
            return Err(not_found(name));
        }

        let mut outcomes = Vec::with_capacity(documents.len());
        for (position, document) in documents.iter().enumerate() {
            if rejected.as_ref().is_some_and(|filter| filter(document)) {
                outcomes.push(BulkItemOutcome {
                    position,
                    id: None,
                    status: 400,
                    error: Some("mapper_parsing_exception".to_string()),
                });
                continue;
            }

            state.next_id += 1;
            let id = state.next_id.to_string();
            if let Some(collection) = state.collections.get_mut(name) {
                collection.documents.push((id.clone(), document.clone()));
            }
            outcomes.push(BulkItemOutcome {
                position,
                id: Some(id),
                status: 201,
                error: None,
            });
        }
        Ok(outcomes)
    }

    async fn analyze(&self, _target: &str, _analyzer: &str, text: &str) -> BackendResult<Vec<String>> {
        let mut state = self.state.lock();
        Self::enter(&mut state, BackendOp::Analyze)?;
        Ok(text
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|token| !token.is_empty())
            .map(str::to_lowercase)
            .collect())
    }

    async fn search(&self, target: &str, body: &SearchBody) -> BackendResult<RawSearchResponse> {
        let mut state = self.state.lock();
        Self::enter(&mut state, BackendOp::Search)?;
        state.searches.push((target.to_string(), body.clone()));
        state
            .search_response
            .clone()
            .ok_or_else(|| BackendError::InvalidResponse("no search response scripted".to_string()))
    }

    async fn get_alias_targets(&self, alias: &str) -> BackendResult<BTreeSet<String>> {
        let mut state = self.state.lock();
        Self::enter(&mut state, BackendOp::GetAliasTargets)?;
        Ok(state.aliases.get(alias).cloned().unwrap_or_default())
    }

    async fn swap_alias(&self, remove: &[AliasAction], add: &[AliasAction]) -> BackendResult<bool> {
        let mut state = self.state.lock();
        if Self::enter(&mut state, BackendOp::SwapAlias)? == Some(InjectedFailure::Unacknowledged) {
            return Ok(false);
        }

        // Validate everything first so the swap applies all-or-nothing
        for action in remove {
            let bound = state
                .aliases
                .get(&action.alias)
                .is_some_and(|targets| targets.contains(&action.index));
            if !bound {
                return Err(BackendError::Rejected {
                    status: 404,
                    reason: format!("alias [{}] missing on [{}]", action.alias, action.index),
                });
            }
        }
        for action in add {
            if !state.collections.contains_key(&action.index) {
                return Err(not_found(&action.index));
            }
        }

        for action in remove {
            if let Some(targets) = state.aliases.get_mut(&action.alias) {
                targets.remove(&action.index);
            }
        }
        for action in add {
            state
                .aliases
                .entry(action.alias.clone())
                .or_default()
                .insert(action.index.clone());
        }
        state.aliases.retain(|_, targets| !targets.is_empty());
        Ok(true)
    }

    async fn list_collections(&self, pattern: &str) -> BackendResult<Vec<String>> {
        let mut state = self.state.lock();
        Self::enter(&mut state, BackendOp::ListCollections)?;
        Ok(state
            .collections
            .keys()
            .filter(|name| matches_pattern(name, pattern))
            .cloned()
            .collect())
    }

    async fn delete_collections(&self, names: &[String]) -> BackendResult<bool> {
        let mut state = self.state.lock();
        if Self::enter(&mut state, BackendOp::DeleteCollections)?
            == Some(InjectedFailure::Unacknowledged)
        {
            return Ok(false);
        }
        if let Some(missing) = names.iter().find(|n| !state.collections.contains_key(*n)) {
            return Err(not_found(missing));
        }
        for name in names {
            state.collections.remove(name);
            for targets in state.aliases.values_mut() {
                targets.remove(name);
            }
        }
        state.aliases.retain(|_, targets| !targets.is_empty());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> IndexSchema {
        IndexSchema {
            settings: json!({}),
            mappings: json!({}),
        }
    }

    #[tokio::test]
    async fn test_swap_alias_is_all_or_nothing() {
        let backend = InMemoryBackend::new();
        backend.insert_collection("products_1");
        backend.insert_alias("products", "products_1");

        // Second removal refers to a binding that does not exist
        let result = backend
            .swap_alias(
                &[
                    AliasAction::new("products_1", "products"),
                    AliasAction::new("products_0", "products"),
                ],
                &[],
            )
            .await;

        assert!(result.is_err());
        assert_eq!(
            backend.alias_targets("products"),
            BTreeSet::from(["products_1".to_string()])
        );
    }

    #[tokio::test]
    async fn test_bulk_write_assigns_ids() {
        let backend = InMemoryBackend::new();
        backend.create_collection("products_1", &schema()).await.unwrap();

        let outcomes = backend
            .bulk_write(
                "products_1",
                &[
                    Product::new("Levi's", "501", 89.0),
                    Product::new("Wrangler", "Texas", 79.0),
                ],
            )
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(BulkItemOutcome::is_success));
        assert_ne!(outcomes[0].id, outcomes[1].id);
        assert_eq!(backend.documents("products_1").len(), 2);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let backend = InMemoryBackend::new();
        backend.fail(BackendOp::CreateCollection, InjectedFailure::Unacknowledged);
        assert!(!backend.create_collection("products_1", &schema()).await.unwrap());

        backend.fail(BackendOp::Analyze, InjectedFailure::Unavailable);
        let err = backend.analyze("products", "text", "jeans").await.unwrap_err();
        assert!(err.is_unavailable());
        assert_eq!(
            backend.calls(),
            vec![BackendOp::CreateCollection, BackendOp::Analyze]
        );
    }

    #[tokio::test]
    async fn test_analyze_lowercases_words() {
        let backend = InMemoryBackend::new();
        let tokens = backend
            .analyze("products", "text", "Blue L, Levi's JEANS")
            .await
            .unwrap();
        assert_eq!(tokens, vec!["blue", "l", "levi's", "jeans"]);
    }

    #[test]
    fn test_pattern_matching() {
        assert!(matches_pattern("products_1", "products_*"));
        assert!(!matches_pattern("orders_1", "products_*"));
        assert!(matches_pattern("products", "products"));
    }
}
