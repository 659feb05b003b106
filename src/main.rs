use product_search::{
    api::{build_router_with_cors, AppState},
    backend::{ElasticsearchBackend, SearchBackend},
    config::Config,
    indexer::IndexLifecycleManager,
    scheduler::{RebuildJob, SchedulerService},
    search::SearchService,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load().map_err(|e| format!("Failed to load configuration: {}", e))?;
    config.validate()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "product_search={},tower_http=info",
            config.observability.log_level
        )
        .into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if config.observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(
        service = %config.observability.service_name,
        "Starting product search v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize Prometheus metrics
    if config.observability.metrics.enabled {
        if let Err(e) = product_search::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        } else {
            tracing::info!("Prometheus metrics initialized");
        }
    } else {
        tracing::info!("Prometheus metrics disabled in configuration");
    }

    // Search backend
    let backend: Arc<dyn SearchBackend> = Arc::new(ElasticsearchBackend::new(&config.backend)?);
    tracing::info!(url = %config.backend.url, "Search backend configured");

    // Index lifecycle and rebuild triggers
    let lifecycle = Arc::new(IndexLifecycleManager::new(
        backend.clone(),
        config.index.clone(),
    ));
    let rebuild_job = RebuildJob::new(lifecycle.clone());

    if config.scheduler.rebuild_on_startup {
        let job = rebuild_job.clone();
        tokio::spawn(async move {
            match job.run("startup").await {
                Some(Ok(report)) => tracing::info!(
                    generation = %report.generation,
                    documents = report.documents_indexed,
                    "Startup rebuild completed"
                ),
                Some(Err(e)) => tracing::error!(error = %e, "Startup rebuild failed"),
                None => {}
            }
        });
    }

    let mut scheduler = SchedulerService::new(config.scheduler.clone(), rebuild_job).await?;
    scheduler.start().await?;

    // Search facade
    let search = Arc::new(SearchService::new(
        backend.clone(),
        config.index.alias.clone(),
        config.search.clone(),
    ));

    let state = AppState::new(search, backend)
        .with_lifecycle(lifecycle)
        .with_metrics_config(config.observability.metrics.clone());
    let app = build_router_with_cors(state, &config.server.cors_origins);

    // Start HTTP server
    let http_addr = config.server.bind_address();
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Product search: http://{}/v1/product", http_addr);

    axum::serve(http_listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    tracing::info!("Shutting down gracefully...");
    scheduler.shutdown().await?;
    Ok(())
}
