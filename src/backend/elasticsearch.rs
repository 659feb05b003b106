//! Elasticsearch REST implementation of [`SearchBackend`]

use crate::backend::config::BackendConfig;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::traits::SearchBackend;
use crate::backend::types::{
    AliasAction, BulkItemOutcome, IndexSchema, RawSearchResponse, SearchBody,
};
use crate::models::Product;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use tracing::{debug, warn};

/// Search backend speaking the Elasticsearch REST API over HTTP
#[derive(Clone)]
pub struct ElasticsearchBackend {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct Acknowledged {
    #[serde(default)]
    acknowledged: bool,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    tokens: Vec<AnalyzeToken>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeToken {
    token: String,
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    items: Vec<HashMap<String, BulkResponseItem>>,
}

#[derive(Debug, Deserialize)]
struct BulkResponseItem {
    #[serde(rename = "_id", default)]
    id: Option<String>,
    status: u16,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CatIndex {
    index: String,
}

impl ElasticsearchBackend {
    /// Create a new backend client
    pub fn new(config: &BackendConfig) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("product-search/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackendError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and turn non-success statuses into errors
    async fn send(&self, request: RequestBuilder) -> BackendResult<Response> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout(format!(
                    "Backend request timed out after {} seconds",
                    self.timeout_secs
                ))
            } else if e.is_connect() {
                BackendError::Unavailable(format!("Failed to connect to backend: {}", e))
            } else {
                BackendError::Unavailable(format!("Backend request failed: {}", e))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let reason = error_reason(&body);

        if let Some(index) = existing_index(&body) {
            return Err(BackendError::AlreadyExists(index));
        }
        if status.is_client_error() {
            Err(BackendError::Rejected {
                status: status.as_u16(),
                reason,
            })
        } else {
            Err(BackendError::Unavailable(format!(
                "Backend returned status {}: {}",
                status, reason
            )))
        }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> BackendResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}

/// Extract `error.reason` from an Elasticsearch error body, falling back to the raw text
fn error_reason(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/reason")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            if body.is_empty() {
                "No response body".to_string()
            } else {
                body.to_string()
            }
        })
}

/// Index named by a `resource_already_exists_exception` error body
fn existing_index(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;
    let error = value.get("error")?;
    if error.get("type").and_then(Value::as_str) != Some("resource_already_exists_exception") {
        return None;
    }
    error
        .get("index")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| Some(error_reason(body)))
}

/// Newline-delimited bulk body with one index action per document
fn bulk_body(documents: &[Product]) -> BackendResult<String> {
    let mut body = String::new();
    for document in documents {
        body.push_str("{\"index\":{}}\n");
        body.push_str(&serde_json::to_string(document)?);
        body.push('\n');
    }
    Ok(body)
}

#[async_trait]
impl SearchBackend for ElasticsearchBackend {
    async fn create_collection(&self, name: &str, schema: &IndexSchema) -> BackendResult<bool> {
        let response = self
            .send(self.client.put(self.url(name)).json(&json!({
                "settings": schema.settings,
                "mappings": schema.mappings,
            })))
            .await?;

        let ack: Acknowledged = Self::read_json(response).await?;
        Ok(ack.acknowledged)
    }

    async fn bulk_write(
        &self,
        name: &str,
        documents: &[Product],
    ) -> BackendResult<Vec<BulkItemOutcome>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .send(
                self.client
                    .post(self.url(&format!("{}/_bulk", name)))
                    .query(&[("refresh", "wait_for")])
                    .header("Content-Type", "application/x-ndjson")
                    .body(bulk_body(documents)?),
            )
            .await?;

        let bulk: BulkResponse = Self::read_json(response).await?;
        if bulk.items.len() != documents.len() {
            warn!(
                index = %name,
                sent = documents.len(),
                received = bulk.items.len(),
                "Bulk response item count does not match request"
            );
        }

        let outcomes = bulk
            .items
            .into_iter()
            .enumerate()
            .filter_map(|(position, mut item)| {
                item.remove("index").map(|item| BulkItemOutcome {
                    position,
                    id: item.id,
                    status: item.status,
                    error: item.error.map(|e| match e.get("reason").and_then(Value::as_str) {
                        Some(reason) => reason.to_string(),
                        None => e.to_string(),
                    }),
                })
            })
            .collect();

        Ok(outcomes)
    }

    async fn analyze(&self, target: &str, analyzer: &str, text: &str) -> BackendResult<Vec<String>> {
        let response = self
            .send(
                self.client
                    .post(self.url(&format!("{}/_analyze", target)))
                    .json(&json!({ "analyzer": analyzer, "text": text })),
            )
            .await?;

        let analyzed: AnalyzeResponse = Self::read_json(response).await?;
        Ok(analyzed.tokens.into_iter().map(|t| t.token).collect())
    }

    async fn search(&self, target: &str, body: &SearchBody) -> BackendResult<RawSearchResponse> {
        debug!(target = %target, from = body.from, size = body.size, "Executing search");

        let response = self
            .send(
                self.client
                    .post(self.url(&format!("{}/_search", target)))
                    .json(body),
            )
            .await?;

        Self::read_json(response).await
    }

    async fn get_alias_targets(&self, alias: &str) -> BackendResult<BTreeSet<String>> {
        let result = self
            .send(self.client.get(self.url(&format!("_alias/{}", alias))))
            .await;

        let response = match result {
            Ok(response) => response,
            Err(BackendError::Rejected { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                return Ok(BTreeSet::new())
            }
            Err(e) => return Err(e),
        };

        let targets: HashMap<String, Value> = Self::read_json(response).await?;
        Ok(targets.into_keys().collect())
    }

    async fn swap_alias(&self, remove: &[AliasAction], add: &[AliasAction]) -> BackendResult<bool> {
        let actions: Vec<Value> = remove
            .iter()
            .map(|a| json!({ "remove": { "index": a.index, "alias": a.alias } }))
            .chain(
                add.iter()
                    .map(|a| json!({ "add": { "index": a.index, "alias": a.alias } })),
            )
            .collect();

        let response = self
            .send(
                self.client
                    .post(self.url("_aliases"))
                    .json(&json!({ "actions": actions })),
            )
            .await?;

        let ack: Acknowledged = Self::read_json(response).await?;
        Ok(ack.acknowledged)
    }

    async fn list_collections(&self, pattern: &str) -> BackendResult<Vec<String>> {
        let response = self
            .send(
                self.client
                    .get(self.url(&format!("_cat/indices/{}", pattern)))
                    .query(&[("format", "json"), ("h", "index")]),
            )
            .await?;

        let indices: Vec<CatIndex> = Self::read_json(response).await?;
        Ok(indices.into_iter().map(|i| i.index).collect())
    }

    async fn delete_collections(&self, names: &[String]) -> BackendResult<bool> {
        if names.is_empty() {
            return Ok(true);
        }

        let response = self
            .send(self.client.delete(self.url(&names.join(","))))
            .await?;

        let ack: Acknowledged = Self::read_json(response).await?;
        Ok(ack.acknowledged)
    }
}
