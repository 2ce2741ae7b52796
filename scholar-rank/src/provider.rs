//! Trait definitions for the external collaborators of the pipeline.
//!
//! The pipeline never talks to the network directly. Every outside call goes
//! through one of these traits so that HTTP adapters (see
//! [`crate::providers`]) and test stubs are interchangeable. All
//! implementations must be `Send + Sync`; they are shared as `Arc<dyn …>`.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::metadata::{PaperMetadata, RepoMetadata};

/// One search call for one query variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: usize,
    /// Provider search depth, e.g. `basic`.
    pub depth: String,
    /// Empty means no restriction.
    pub include_domains: Vec<String>,
    pub exclude_domains: Vec<String>,
}

/// A raw hit as returned by the search provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderHit {
    #[serde(default)]
    pub title: String,
    /// Empty when the provider omitted it; such hits are dropped.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    /// Provider relevance in `[0, 1]`.
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub published_date: Option<String>,
}

/// A web search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one search and return the provider's hits in provider order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SearchError::Provider`] on transport or status
    /// failures and [`crate::SearchError::Parse`] on undecodable replies.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<ProviderHit>>;

    /// Short provider name used in logs.
    fn name(&self) -> &'static str;
}

/// Looks up paper records by identifier.
#[async_trait]
pub trait PaperMetadataProvider: Send + Sync {
    /// Fetch the record for `id`; `Ok(None)` when the paper does not exist.
    async fn fetch_by_id(&self, id: &str) -> Result<Option<PaperMetadata>>;
}

/// Looks up repository records by `owner/repo` path.
#[async_trait]
pub trait RepoMetadataProvider: Send + Sync {
    /// Fetch the record for `path`; `Ok(None)` when the repository does not exist.
    async fn fetch_by_path(&self, path: &str) -> Result<Option<RepoMetadata>>;
}

/// External reasoning oracle used for batch scoring.
///
/// The reply is untrusted text and must be decoded defensively (see
/// [`crate::scoring::decode`]).
#[async_trait]
pub trait ScoringOracle: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// External text generator used for query expansion.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
