use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::indexer::RebuildState;
use crate::models::{ProductSearchRequest, ProductSearchResponse};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::warn;

/// Liveness endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Readiness endpoint: ready once the alias resolves to a generation
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let alias = state.search.alias().to_string();
    let rebuild = state.lifecycle.as_ref().map(|manager| manager.state());

    let (status, generations, error) = match state.backend.get_alias_targets(&alias).await {
        Ok(targets) if !targets.is_empty() => {
            (StatusCode::OK, targets.into_iter().collect(), None)
        }
        Ok(_) => (StatusCode::SERVICE_UNAVAILABLE, Vec::new(), None),
        Err(e) => {
            warn!(alias = %alias, "Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, Vec::new(), Some(e.to_string()))
        }
    };

    let body = ReadinessResponse {
        status: if status == StatusCode::OK { "ready" } else { "not_ready" }.to_string(),
        alias,
        generations,
        rebuild,
        error,
    };
    (status, Json(body))
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub alias: String,
    pub generations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rebuild: Option<RebuildState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Faceted product search
pub async fn search_products(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProductSearchRequest>, JsonRejection>,
) -> Result<Json<ProductSearchResponse>> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let response = state.search.search(&request).await?;
    Ok(Json(response))
}

/// Prometheus metrics endpoint
///
/// Returns metrics in Prometheus text exposition format
pub async fn metrics(State(state): State<AppState>) -> (StatusCode, String) {
    if !state.metrics.enabled {
        return (StatusCode::NOT_FOUND, String::new());
    }
    let metrics = crate::metrics::gather_metrics();
    (StatusCode::OK, metrics)
}
