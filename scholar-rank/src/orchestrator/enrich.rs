//! Concurrent metadata enrichment.
//!
//! Every result whose URL names an arXiv paper or a GitHub repository gets a
//! metadata lookup. Lookups run concurrently under one shared deadline; a
//! lookup that fails or is still pending at the deadline yields
//! [`Metadata::Absent`] for its item only. The output always has one entry
//! per input, in input order.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::RerankConfig;
use crate::metadata::{AbsentReason, Metadata};
use crate::provider::{PaperMetadataProvider, RepoMetadataProvider};
use crate::types::SearchResult;

use super::source::{classify, MetadataSource};

/// Fetches source-specific metadata for a batch of results.
pub struct MetadataEnricher {
    papers: Arc<dyn PaperMetadataProvider>,
    repos: Arc<dyn RepoMetadataProvider>,
    timeout: Duration,
}

impl MetadataEnricher {
    /// Enricher whose batch deadline comes from `config`.
    pub fn new(
        papers: Arc<dyn PaperMetadataProvider>,
        repos: Arc<dyn RepoMetadataProvider>,
        config: &RerankConfig,
    ) -> Self {
        Self::with_timeout(
            papers,
            repos,
            Duration::from_secs(config.enrichment_timeout_secs),
        )
    }

    /// Enricher with an explicit batch deadline.
    pub fn with_timeout(
        papers: Arc<dyn PaperMetadataProvider>,
        repos: Arc<dyn RepoMetadataProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            papers,
            repos,
            timeout,
        }
    }

    /// Look up metadata for every result.
    pub async fn enrich(&self, results: &[SearchResult]) -> Vec<Metadata> {
        let deadline = Instant::now() + self.timeout;

        let lookups = results.iter().map(|result| async move {
            match tokio::time::timeout_at(deadline, self.lookup(&result.url)).await {
                Ok(metadata) => metadata,
                Err(_) => {
                    tracing::warn!(url = %result.url, "metadata lookup timed out");
                    Metadata::Absent(AbsentReason::TimedOut)
                }
            }
        });
        let metadata = futures::future::join_all(lookups).await;

        let found = metadata
            .iter()
            .filter(|m| matches!(m, Metadata::Paper(_) | Metadata::Repo(_)))
            .count();
        let degraded = metadata.iter().filter(|m| m.is_degraded()).count();
        tracing::debug!(items = results.len(), found, degraded, "metadata enrichment complete");

        metadata
    }

    async fn lookup(&self, url: &str) -> Metadata {
        match classify(url) {
            MetadataSource::Paper(id) => match self.papers.fetch_by_id(&id).await {
                Ok(Some(paper)) => Metadata::Paper(paper),
                Ok(None) => {
                    tracing::debug!(%id, "paper not found");
                    Metadata::Absent(AbsentReason::NotFound)
                }
                Err(e) => {
                    tracing::warn!(%id, error = %e, "paper metadata fetch failed");
                    Metadata::Absent(AbsentReason::FetchFailed(e.to_string()))
                }
            },
            MetadataSource::Repo(path) => match self.repos.fetch_by_path(&path).await {
                Ok(Some(repo)) => Metadata::Repo(repo),
                Ok(None) => {
                    tracing::debug!(%path, "repository not found");
                    Metadata::Absent(AbsentReason::NotFound)
                }
                Err(e) => {
                    tracing::warn!(%path, error = %e, "repository metadata fetch failed");
                    Metadata::Absent(AbsentReason::FetchFailed(e.to_string()))
                }
            },
            MetadataSource::Unrecognized => Metadata::Absent(AbsentReason::UnrecognizedSource),
        }
    }
}
