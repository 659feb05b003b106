//! Product search facade

use crate::backend::dsl::SortField;
use crate::backend::{SearchBackend, SearchBody};
use crate::metrics::{SEARCHES_TOTAL, SEARCH_DURATION_SECONDS};
use crate::models::{ProductSearchRequest, ProductSearchResponse};
use crate::search::config::SearchConfig;
use crate::search::error::{SearchError, SearchResult};
use crate::search::mapper::map_response;
use crate::search::query::QueryCompiler;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use validator::Validate;

/// Entry point for product searches against an alias
pub struct SearchService {
    backend: Arc<dyn SearchBackend>,
    compiler: QueryCompiler,
    alias: String,
    config: SearchConfig,
}

impl SearchService {
    pub fn new(backend: Arc<dyn SearchBackend>, alias: impl Into<String>, config: SearchConfig) -> Self {
        let compiler = QueryCompiler::new(backend.clone(), config.analyzer.clone())
            .with_nested_facet_size(config.nested_facet_size);
        Self {
            backend,
            compiler,
            alias: alias.into(),
            config,
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Run a search
    ///
    /// Blank text, or text the analyzer reduces to nothing, returns an empty
    /// response. Blank text never reaches the backend.
    pub async fn search(&self, request: &ProductSearchRequest) -> SearchResult<ProductSearchResponse> {
        let start = Instant::now();
        let result = self.execute(request).await;
        SEARCH_DURATION_SECONDS.observe(start.elapsed().as_secs_f64());

        let outcome = match &result {
            Ok(response) if response.is_empty() => "empty",
            Ok(_) => "success",
            Err(SearchError::InvalidRequest(_)) => "invalid",
            Err(SearchError::SearchFailed(_)) => "failed",
        };
        SEARCHES_TOTAL.with_label_values(&[outcome]).inc();

        if let Err(e) = &result {
            warn!(alias = %self.alias, outcome, "Search failed: {}", e);
        }
        result
    }

    async fn execute(&self, request: &ProductSearchRequest) -> SearchResult<ProductSearchResponse> {
        let Some(text) = request.query_text() else {
            debug!("Blank query text, returning empty response");
            return Ok(ProductSearchResponse::empty());
        };

        request.validate()?;
        let from = request.offset().ok_or_else(|| {
            SearchError::InvalidRequest(format!(
                "page {} with pageSize {} is out of range",
                request.page, request.page_size
            ))
        })?;

        let Some(compiled) = self.compiler.compile(&self.alias, text).await? else {
            debug!(text = %text, "Query text produced no tokens");
            return Ok(ProductSearchResponse::empty());
        };

        let body = SearchBody {
            query: compiled.query,
            aggs: compiled.aggregations,
            sort: vec![
                SortField::desc("_score"),
                SortField::desc(self.config.tie_break_field.as_str()),
            ],
            from,
            size: request.page_size,
            track_total_hits: self.config.track_total_hits.then_some(true),
        };

        let raw = self.backend.search(&self.alias, &body).await?;
        let response = map_response(raw)?;

        info!(
            alias = %self.alias,
            tokens = compiled.tokens.len(),
            page = request.page,
            page_size = request.page_size,
            total_hits = response.total_hits,
            returned = response.products.len(),
            "Search completed"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendOp, InMemoryBackend, InjectedFailure};

    fn service(backend: &InMemoryBackend) -> SearchService {
        SearchService::new(
            Arc::new(backend.clone()),
            "product_index",
            SearchConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_blank_query_makes_no_backend_calls() {
        let backend = InMemoryBackend::new();
        let service = service(&backend);

        for text in [None, Some(""), Some("   \t ")] {
            let request = ProductSearchRequest {
                text_query: text.map(str::to_string),
                ..Default::default()
            };
            let response = service.search(&request).await.unwrap();
            assert_eq!(response.total_hits, 0);
            assert!(response.products.is_empty());
            assert!(response.facets.is_empty());
        }
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_page_size_rejected_before_backend() {
        let backend = InMemoryBackend::new();
        let request = ProductSearchRequest::new("jeans").with_page_size(0);

        let result = service(&backend).search(&request).await;

        assert!(matches!(result, Err(SearchError::InvalidRequest(_))));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_page_overflow_rejected() {
        let backend = InMemoryBackend::new();
        let request = ProductSearchRequest::new("jeans")
            .with_page(usize::MAX)
            .with_page_size(10);

        let result = service(&backend).search(&request).await;
        assert!(matches!(result, Err(SearchError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_analysis_failure_is_search_failed() {
        let backend = InMemoryBackend::new();
        backend.fail(BackendOp::Analyze, InjectedFailure::Unavailable);

        let result = service(&backend)
            .search(&ProductSearchRequest::new("jeans"))
            .await;

        assert!(matches!(result, Err(SearchError::SearchFailed(_))));
        assert_eq!(backend.calls(), vec![BackendOp::Analyze]);
    }
}
