//! Tavily search API adapter.
//!
//! Tavily returns pre-scored hits (`score` in `[0, 1]`) with a short content
//! excerpt per result, which is exactly what the fan-out stage needs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::RerankConfig;
use crate::error::{Result, SearchError};
use crate::http;
use crate::provider::{ProviderHit, SearchProvider, SearchRequest};

/// Tavily `/search` client.
pub struct TavilyProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    search_depth: &'a str,
    include_answer: bool,
    include_raw_content: bool,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    include_domains: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    exclude_domains: &'a [String],
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<ProviderHit>,
}

impl TavilyProvider {
    /// Build a provider from config.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if no search API key is configured or
    /// the HTTP client cannot be built.
    pub fn from_config(config: &RerankConfig) -> Result<Self> {
        let api_key = config
            .search_api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| SearchError::Config("search_api_key is required".into()))?;
        Ok(Self::with_client(
            http::build_client(config)?,
            &config.search_base_url,
            api_key,
        ))
    }

    /// Build a provider around an existing client.
    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<ProviderHit>> {
        tracing::trace!(query = %request.query, "Tavily search");

        let body = TavilyRequest {
            api_key: &self.api_key,
            query: &request.query,
            max_results: request.max_results,
            search_depth: &request.depth,
            include_answer: false,
            include_raw_content: false,
            include_domains: &request.include_domains,
            exclude_domains: &request.exclude_domains,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| http::transport_error("Tavily", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Provider(format!(
                "Tavily returned HTTP {}",
                status.as_u16()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| http::transport_error("Tavily", e))?;
        tracing::trace!(bytes = text.len(), "Tavily response received");

        parse_tavily_response(&text)
    }

    fn name(&self) -> &'static str {
        "Tavily"
    }
}

/// Decode a Tavily JSON reply. Hits without a URL are dropped.
pub(crate) fn parse_tavily_response(body: &str) -> Result<Vec<ProviderHit>> {
    let response: TavilyResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid Tavily response: {e}")))?;
    Ok(response
        .results
        .into_iter()
        .filter(|hit| !hit.url.trim().is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_results_array() {
        let body = r#"{
            "query": "graph neural networks",
            "results": [
                {"title": "GCN", "url": "https://arxiv.org/abs/1609.02907",
                 "content": "Semi-supervised classification", "score": 0.91,
                 "published_date": "2016-09-09"},
                {"title": "PyG", "url": "https://github.com/pyg-team/pytorch_geometric",
                 "content": "Graph Neural Network Library for PyTorch", "score": 0.85}
            ]
        }"#;
        let hits = parse_tavily_response(body).expect("parse");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].published_date.as_deref(), Some("2016-09-09"));
        assert!(hits[1].published_date.is_none());
        assert!((hits[0].score - 0.91).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_results_is_empty() {
        let hits = parse_tavily_response(r#"{"query": "x"}"#).expect("parse");
        assert!(hits.is_empty());
    }

    #[test]
    fn hits_without_url_dropped() {
        let body = r#"{"results": [
            {"title": "empty url", "url": ""},
            {"title": "no url key", "content": "orphan", "score": 0.9},
            {"url": "https://a.com"}
        ]}"#;
        let hits = parse_tavily_response(body).expect("parse");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "https://a.com");
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = parse_tavily_response("<html>").unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }

    #[test]
    fn missing_api_key_rejected() {
        let Err(err) = TavilyProvider::from_config(&RerankConfig::default()) else {
            panic!("expected missing key error");
        };
        assert!(err.to_string().contains("search_api_key"));
    }

    #[test]
    fn request_omits_empty_domain_lists() {
        let body = TavilyRequest {
            api_key: "k",
            query: "q",
            max_results: 3,
            search_depth: "basic",
            include_answer: false,
            include_raw_content: false,
            include_domains: &[],
            exclude_domains: &[],
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert!(json.get("include_domains").is_none());
        assert!(json.get("exclude_domains").is_none());
        assert_eq!(json["max_results"], 3);
    }
}
