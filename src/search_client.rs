// ============================================================================
// File: src/search_client.rs
// Google Custom Search client
// ============================================================================

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::config::SearchCredentials;
use crate::models::{CustomSearchResponse, SearchResultItem};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Search API error: HTTP {status}\nResponse: {body}")]
    Api { status: u16, body: String },

    #[error("failed to parse search response as JSON: {0}")]
    Parse(String),
}

/// A web search backend returning normalized hits
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, num_results: u8) -> Result<Vec<SearchResultItem>, SearchError>;
}

pub struct SearchClient {
    client: Client,
    endpoint: String,
    credentials: SearchCredentials,
}

impl SearchClient {
    pub fn new(endpoint: String, credentials: SearchCredentials) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            credentials,
        }
    }

    /// Map a raw response body to normalized items; a missing `items` field is no results
    pub fn parse_results(body: &str) -> Result<Vec<SearchResultItem>, SearchError> {
        let response: CustomSearchResponse = serde_json::from_str(body).map_err(|e| {
            SearchError::Parse(format!(
                "{}\nRaw response (first 500 chars): {}",
                e,
                body.chars().take(500).collect::<String>()
            ))
        })?;

        Ok(response.items.into_iter().map(SearchResultItem::from).collect())
    }
}

#[async_trait]
impl WebSearch for SearchClient {
    async fn search(&self, query: &str, num_results: u8) -> Result<Vec<SearchResultItem>, SearchError> {
        let num = num_results.to_string();
        let params = [
            ("q", query),
            ("key", self.credentials.api_key.as_str()),
            ("cx", self.credentials.engine_id.as_str()),
            ("num", num.as_str()),
        ];

        debug!(query, num_results, "querying custom search");

        let http_response = self.client.get(&self.endpoint).query(&params).send().await?;

        // Check HTTP status
        if !http_response.status().is_success() {
            let status = http_response.status().as_u16();
            let body = http_response.text().await.unwrap_or_default();
            return Err(SearchError::Api { status, body });
        }

        let response_text = http_response.text().await?;
        let items = Self::parse_results(&response_text)?;

        debug!(count = items.len(), "search returned");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SearchClient {
        SearchClient::new(
            format!("{}/customsearch/v1", server.uri()),
            SearchCredentials {
                api_key: "test-key".to_string(),
                engine_id: "test-cx".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_search_sends_query_parameters_and_normalizes() {
        let server = MockServer::start().await;

        let response_json = r#"{
            "items": [
                {"title": "Paris - Wikipedia", "link": "https://en.wikipedia.org/wiki/Paris", "snippet": "Paris is the\ncapital of France."},
                {"title": "Visit Paris", "link": "https://example.com/paris"}
            ]
        }"#;

        Mock::given(method("GET"))
            .and(path("/customsearch/v1"))
            .and(query_param("q", "capital of France"))
            .and(query_param("key", "test-key"))
            .and(query_param("cx", "test-cx"))
            .and(query_param("num", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_string(response_json))
            .expect(1)
            .mount(&server)
            .await;

        let items = client_for(&server).search("capital of France", 5).await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Paris - Wikipedia");
        assert_eq!(items[0].link, "https://en.wikipedia.org/wiki/Paris");
        assert_eq!(items[0].snippet, "Paris is the capital of France.");
        assert_eq!(items[1].snippet, "");
    }

    #[tokio::test]
    async fn test_search_without_items_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"kind": "customsearch#search", "searchInformation": {"totalResults": "0"}}"#,
            ))
            .mount(&server)
            .await;

        let items = client_for(&server).search("zxqv nothing", 5).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_search_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = client_for(&server).search("anything", 5).await.unwrap_err();

        match err {
            SearchError::Api { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "quota exceeded");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_unreachable_endpoint() {
        let client = SearchClient::new(
            "http://127.0.0.1:9/customsearch/v1".to_string(),
            SearchCredentials {
                api_key: "k".to_string(),
                engine_id: "cx".to_string(),
            },
        );

        let err = client.search("anything", 5).await.unwrap_err();
        assert!(matches!(err, SearchError::Request(_)));
    }

    #[test]
    fn test_parse_results_rejects_non_json() {
        let err = SearchClient::parse_results("<html>").unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }
}
