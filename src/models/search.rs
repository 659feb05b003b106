use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use super::product::Product;

/// Facet names returned with every non-empty search response
pub const FACET_BRAND: &str = "brand";
pub const FACET_PRICE: &str = "price";
pub const FACET_COLOR: &str = "color";
pub const FACET_SIZE: &str = "size";

/// Public product search request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductSearchRequest {
    /// Free text; absent or blank text yields an empty response
    #[serde(default, alias = "queryText")]
    pub text_query: Option<String>,

    /// Zero-based page number
    #[serde(default)]
    pub page: usize,

    /// Number of products per page
    #[serde(default = "default_page_size", alias = "size")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: usize,
}

impl ProductSearchRequest {
    /// Create a request for the first page with the default page size
    pub fn new(text_query: impl Into<String>) -> Self {
        Self {
            text_query: Some(text_query.into()),
            page: 0,
            page_size: default_page_size(),
        }
    }

    /// Set the page
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Set the page size
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// The trimmed query text, or `None` when there is nothing to search for
    pub fn query_text(&self) -> Option<&str> {
        self.text_query
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Offset of the first requested hit, `None` on overflow
    pub fn offset(&self) -> Option<usize> {
        self.page.checked_mul(self.page_size)
    }
}

impl Default for ProductSearchRequest {
    fn default() -> Self {
        Self {
            text_query: None,
            page: 0,
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    10
}

/// Whether `total_hits` is an exact count or a lower bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalHitsRelation {
    #[default]
    Eq,
    Gte,
}

/// One aggregation bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetBucket {
    pub value: String,
    pub count: u64,
}

impl FacetBucket {
    pub fn new(value: impl Into<String>, count: u64) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }
}

/// Public product search response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSearchResponse {
    pub total_hits: u64,
    pub total_hits_relation: TotalHitsRelation,
    pub products: Vec<Product>,
    pub facets: BTreeMap<String, Vec<FacetBucket>>,
}

impl ProductSearchResponse {
    /// Response returned without contacting the backend
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when nothing matched
    pub fn is_empty(&self) -> bool {
        self.total_hits == 0 && self.products.is_empty() && self.facets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: ProductSearchRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.text_query, None);
        assert_eq!(request.page, 0);
        assert_eq!(request.page_size, 10);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_accepts_aliases() {
        let request: ProductSearchRequest =
            serde_json::from_str(r#"{"queryText":"jeans","size":2,"page":1}"#).unwrap();
        assert_eq!(request.query_text(), Some("jeans"));
        assert_eq!(request.page_size, 2);
        assert_eq!(request.offset(), Some(2));

        let request: ProductSearchRequest =
            serde_json::from_str(r#"{"textQuery":"jeans","pageSize":5}"#).unwrap();
        assert_eq!(request.page_size, 5);
    }

    #[test]
    fn test_blank_query_text() {
        assert_eq!(ProductSearchRequest::new("   \t").query_text(), None);
        assert_eq!(ProductSearchRequest::default().query_text(), None);
        assert_eq!(ProductSearchRequest::new(" jeans ").query_text(), Some("jeans"));
    }

    #[test]
    fn test_page_size_validation() {
        assert!(ProductSearchRequest::new("jeans")
            .with_page_size(0)
            .validate()
            .is_err());
        assert!(ProductSearchRequest::new("jeans")
            .with_page_size(101)
            .validate()
            .is_err());
    }

    #[test]
    fn test_offset_overflow() {
        let request = ProductSearchRequest::new("jeans")
            .with_page(usize::MAX)
            .with_page_size(2);
        assert_eq!(request.offset(), None);
    }

    #[test]
    fn test_response_serialization() {
        let response = ProductSearchResponse::empty();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["totalHits"], 0);
        assert_eq!(json["totalHitsRelation"], "eq");
        assert!(json["products"].as_array().unwrap().is_empty());
        assert!(json["facets"].as_object().unwrap().is_empty());
    }
}
