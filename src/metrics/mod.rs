/// Prometheus metrics for the product search service.
///
/// Covers:
/// - HTTP request counts and latency
/// - Search outcomes and latency
/// - Index rebuild outcomes, latency and indexed document counts
///
/// # Example
/// ```no_run
/// use product_search::metrics::{self, SEARCHES_TOTAL};
///
/// metrics::init_metrics().unwrap();
/// SEARCHES_TOTAL.with_label_values(&["success"]).inc();
/// println!("{}", metrics::gather_metrics());
/// ```

mod config;
mod middleware;

pub use config::MetricsConfig;
pub use middleware::track_http_metrics;

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Gauge, GaugeVec, Histogram, HistogramOpts, HistogramVec, IntCounter, Opts,
    Registry,
};

const NAMESPACE: &str = "product_search";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    // ============================================================================
    // HTTP Metrics
    // ============================================================================

    /// Total number of HTTP requests received
    ///
    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace(NAMESPACE),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// HTTP request duration in seconds
    ///
    /// Labels: method, path
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric");

    // ============================================================================
    // Search Metrics
    // ============================================================================

    /// Searches by outcome
    ///
    /// Labels: outcome (success, empty, invalid, failed)
    pub static ref SEARCHES_TOTAL: CounterVec = CounterVec::new(
        Opts::new("searches_total", "Total number of product searches")
            .namespace(NAMESPACE),
        &["outcome"]
    ).expect("Failed to create SEARCHES_TOTAL metric");

    /// End-to-end search latency including analysis
    pub static ref SEARCH_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new("search_duration_seconds", "Product search duration in seconds")
            .namespace(NAMESPACE)
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0])
    ).expect("Failed to create SEARCH_DURATION_SECONDS metric");

    // ============================================================================
    // Index Lifecycle Metrics
    // ============================================================================

    /// Rebuilds by outcome
    ///
    /// Labels: outcome (success, failed)
    pub static ref REBUILDS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("rebuilds_total", "Total number of index rebuilds")
            .namespace(NAMESPACE),
        &["outcome"]
    ).expect("Failed to create REBUILDS_TOTAL metric");

    /// Rebuild duration in seconds
    pub static ref REBUILD_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new("rebuild_duration_seconds", "Index rebuild duration in seconds")
            .namespace(NAMESPACE)
            .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0])
    ).expect("Failed to create REBUILD_DURATION_SECONDS metric");

    /// Documents written into new generations
    pub static ref INDEXED_DOCUMENTS_TOTAL: IntCounter = IntCounter::with_opts(
        Opts::new("indexed_documents_total", "Documents indexed by rebuilds")
            .namespace(NAMESPACE)
    ).expect("Failed to create INDEXED_DOCUMENTS_TOTAL metric");

    /// Number of generations kept behind the alias after the last rebuild
    pub static ref RETAINED_GENERATIONS: Gauge = Gauge::with_opts(
        Opts::new("retained_generations", "Generations retained after the last rebuild")
            .namespace(NAMESPACE)
    ).expect("Failed to create RETAINED_GENERATIONS metric");

    // ============================================================================
    // System Metrics
    // ============================================================================

    /// Build information
    ///
    /// Labels: version
    pub static ref BUILD_INFO: GaugeVec = GaugeVec::new(
        Opts::new("build_info", "Build information")
            .namespace(NAMESPACE),
        &["version"]
    ).expect("Failed to create BUILD_INFO metric");
}

fn register<C>(collector: C) -> Result<(), prometheus::Error>
where
    C: prometheus::core::Collector + 'static,
{
    match PROMETHEUS_REGISTRY.register(Box::new(collector)) {
        Ok(()) | Err(prometheus::Error::AlreadyReg) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Register all metrics with the global registry
///
/// Safe to call more than once.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    register(HTTP_REQUESTS_TOTAL.clone())?;
    register(HTTP_REQUEST_DURATION_SECONDS.clone())?;

    register(SEARCHES_TOTAL.clone())?;
    register(SEARCH_DURATION_SECONDS.clone())?;

    register(REBUILDS_TOTAL.clone())?;
    register(REBUILD_DURATION_SECONDS.clone())?;
    register(INDEXED_DOCUMENTS_TOTAL.clone())?;
    register(RETAINED_GENERATIONS.clone())?;

    register(BUILD_INFO.clone())?;
    BUILD_INFO
        .with_label_values(&[env!("CARGO_PKG_VERSION")])
        .set(1.0);

    tracing::debug!("Prometheus metrics initialized");
    Ok(())
}

/// Generate Prometheus text format metrics for the /metrics endpoint
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
