//! GitHub REST API adapter for repository metadata.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::RerankConfig;
use crate::error::{Result, SearchError};
use crate::http;
use crate::metadata::RepoMetadata;
use crate::provider::RepoMetadataProvider;

/// `GET /repos/{owner}/{repo}` client.
pub struct GithubProvider {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct GithubRepo {
    full_name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    language: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    has_issues: bool,
    #[serde(default)]
    has_wiki: bool,
    #[serde(default)]
    has_pages: bool,
    #[serde(default)]
    size: u64,
}

impl From<GithubRepo> for RepoMetadata {
    fn from(repo: GithubRepo) -> Self {
        Self {
            full_name: repo.full_name,
            description: repo.description.unwrap_or_default(),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            language: repo.language.unwrap_or_default(),
            created_at: repo.created_at,
            updated_at: repo.updated_at,
            topics: repo.topics,
            has_issues: repo.has_issues,
            has_wiki: repo.has_wiki,
            has_pages: repo.has_pages,
            size: repo.size,
        }
    }
}

impl GithubProvider {
    /// Build a provider from config.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the HTTP client cannot be built.
    pub fn from_config(config: &RerankConfig) -> Result<Self> {
        Ok(Self::with_client(
            http::build_client(config)?,
            &config.repo_base_url,
            config.repo_token.clone(),
        ))
    }

    /// Build a provider around an existing client.
    pub fn with_client(client: reqwest::Client, base_url: &str, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }
}

#[async_trait]
impl RepoMetadataProvider for GithubProvider {
    async fn fetch_by_path(&self, path: &str) -> Result<Option<RepoMetadata>> {
        tracing::trace!(path, "GitHub metadata lookup");

        let mut request = self
            .client
            .get(format!("{}/repos/{path}", self.base_url))
            .header("Accept", "application/vnd.github+json");
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| http::transport_error("GitHub", e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SearchError::Provider(format!(
                "GitHub returned HTTP {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| http::transport_error("GitHub", e))?;

        parse_github_repo(&body).map(Some)
    }
}

/// Decode a GitHub repository JSON document.
pub(crate) fn parse_github_repo(body: &str) -> Result<RepoMetadata> {
    serde_json::from_str::<GithubRepo>(body)
        .map(RepoMetadata::from)
        .map_err(|e| SearchError::Parse(format!("invalid GitHub repository response: {e}")))
}
