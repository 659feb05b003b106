use crate::api::{handlers, AppState};
use crate::metrics::track_http_metrics;
use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    build_router_with_cors(state, &[])
}

/// Build the router, restricting CORS to `origins` when any are given
pub fn build_router_with_cors(state: AppState, origins: &[String]) -> Router {
    let metrics_path = state.metrics.endpoint.clone();
    let metrics_config = state.metrics.clone();

    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::health_check))
        .route("/health/ready", get(handlers::readiness))
        // Product search
        .route("/v1/product", post(handlers::search_products))
        // Metrics
        .route(&metrics_path, get(handlers::metrics))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(middleware::from_fn_with_state(
            metrics_config,
            track_http_metrics,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(cors_layer(origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if allowed.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(allowed)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
