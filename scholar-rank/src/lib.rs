//! # scholar-rank
//!
//! Academic search aggregation and reranking.
//!
//! Given a research topic, this crate expands it into several query
//! variants, fans them out to a web search provider, merges and
//! deduplicates the hits, optionally enriches arXiv and GitHub results with
//! structured metadata, and reorders everything by a multi-dimensional
//! quality score.
//!
//! ## Design
//!
//! - Two interchangeable scoring strategies sharing one output contract:
//!   a deterministic rule-based heuristic and an oracle-delegated scorer
//! - Every external call goes through a trait in [`provider`], so HTTP
//!   adapters ([`providers`]) and test stubs are interchangeable
//! - Concurrency stays inside the calling task (`join_all`), with a shared
//!   deadline for metadata enrichment
//! - Graceful degradation: failed variants, lookups and oracle batches are
//!   contained and marked with a [`Diagnostic`] instead of failing the call
//!
//! ## Security
//!
//! - No network listeners; this is a library, not a server
//! - Topics and queries are logged only at trace level
//! - API keys live in [`RerankConfig`] and are never logged

pub mod config;
pub mod error;
pub mod http;
pub mod metadata;
pub mod orchestrator;
pub mod pipeline;
pub mod provider;
pub mod providers;
pub mod scoring;
pub mod types;

pub use config::RerankConfig;
pub use error::{Result, SearchError};
pub use metadata::{Metadata, PaperMetadata, RepoMetadata};
pub use pipeline::{Collaborators, Reranker};
pub use scoring::{Diagnostic, ScoreBreakdown, ScoreRecord};
pub use types::{ScoringMethod, SearchResult, SearchResultSet, SourceType};

/// Search for `topic` and rerank the results using the HTTP adapters
/// configured in `config`.
///
/// `target` defaults to `config.max_results`.
///
/// # Errors
///
/// Returns [`SearchError::Config`] for invalid configuration or missing
/// credentials, [`SearchError::Validation`] for an invalid topic or
/// target, and [`SearchError::AllVariantsFailed`] if every search call
/// fails. Individual metadata or scoring failures do not cause an error.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> scholar_rank::Result<()> {
/// let config = scholar_rank::RerankConfig {
///     search_api_key: Some("tvly-...".into()),
///     ..Default::default()
/// };
/// let set = scholar_rank::rerank(
///     "graph neural networks",
///     Some(5),
///     scholar_rank::ScoringMethod::RuleBased,
///     &config,
/// )
/// .await?;
/// for result in set.results() {
///     println!("{:.3} {}", result.score, result.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn rerank(
    topic: &str,
    target: Option<usize>,
    method: ScoringMethod,
    config: &RerankConfig,
) -> Result<SearchResultSet> {
    Reranker::from_config(config.clone())?
        .rerank(topic, target, method)
        .await
}
