//! The rerank pipeline: validate → expand → fan-out → dedup → enrich → score → rank.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::config::{RerankConfig, MAX_RESULTS_LIMIT};
use crate::error::{Result, SearchError};
use crate::orchestrator::{
    deduplicate, rank, AcademicExpander, GeneratedExpander, MetadataEnricher, QueryExpander,
    SearchFanout,
};
use crate::provider::{
    PaperMetadataProvider, RepoMetadataProvider, ScoringOracle, SearchProvider, TextGenerator,
};
use crate::providers::{ArxivProvider, ChatCompletionsClient, GithubProvider, TavilyProvider};
use crate::scoring::oracle::OracleScorer;
use crate::scoring::rule::RuleScorer;
use crate::types::{ScoringMethod, SearchResultSet};

/// Longest accepted topic, in characters.
pub const MAX_TOPIC_CHARS: usize = 200;

/// The external services a [`Reranker`] talks to.
pub struct Collaborators {
    pub search: Arc<dyn SearchProvider>,
    pub papers: Arc<dyn PaperMetadataProvider>,
    pub repos: Arc<dyn RepoMetadataProvider>,
    pub oracle: Arc<dyn ScoringOracle>,
    /// Used for query expansion when `generated_queries` is enabled.
    pub generator: Option<Arc<dyn TextGenerator>>,
}

impl Collaborators {
    /// Build the HTTP adapters described by `config`.
    ///
    /// One chat completions client serves as both oracle and generator.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the search API key is missing or
    /// an HTTP client cannot be built.
    pub fn from_config(config: &RerankConfig) -> Result<Self> {
        let chat = Arc::new(ChatCompletionsClient::from_config(config)?);
        Ok(Self {
            search: Arc::new(TavilyProvider::from_config(config)?),
            papers: Arc::new(ArxivProvider::from_config(config)?),
            repos: Arc::new(GithubProvider::from_config(config)?),
            oracle: chat.clone(),
            generator: Some(chat),
        })
    }
}

/// Search aggregation and reranking pipeline.
///
/// Holds no per-call state; one instance can serve any number of
/// sequential or concurrent `rerank` calls.
pub struct Reranker {
    config: RerankConfig,
    expander: Arc<dyn QueryExpander>,
    fanout: SearchFanout,
    enricher: MetadataEnricher,
    oracle: OracleScorer,
    reference_time: Option<DateTime<Utc>>,
}

impl Reranker {
    /// Assemble a pipeline from explicit collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` fails validation.
    pub fn new(config: RerankConfig, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;

        let academic = AcademicExpander::new(config.academic_only);
        let expander: Arc<dyn QueryExpander> = match collaborators.generator {
            Some(generator) if config.generated_queries => {
                Arc::new(GeneratedExpander::new(generator, academic))
            }
            _ => Arc::new(academic),
        };

        Ok(Self {
            fanout: SearchFanout::new(collaborators.search, &config),
            enricher: MetadataEnricher::new(collaborators.papers, collaborators.repos, &config),
            oracle: OracleScorer::new(collaborators.oracle, &config),
            expander,
            reference_time: None,
            config,
        })
    }

    /// Assemble a pipeline backed by the HTTP adapters.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] on invalid configuration or missing
    /// credentials.
    pub fn from_config(config: RerankConfig) -> Result<Self> {
        config.validate()?;
        let collaborators = Collaborators::from_config(&config)?;
        Self::new(config, collaborators)
    }

    /// Replace the query expander.
    pub fn with_expander(mut self, expander: Arc<dyn QueryExpander>) -> Self {
        self.expander = expander;
        self
    }

    /// Fix the time rule-based recency is measured against.
    pub fn with_reference_time(mut self, reference_time: DateTime<Utc>) -> Self {
        self.reference_time = Some(reference_time);
        self
    }

    /// Search for `topic` and return the reranked results.
    ///
    /// `target` bounds both the fan-out budget and the output length; it
    /// defaults to `max_results` from the configuration.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Validation`] for an empty or over-long topic, or a
    ///   target outside `1..=50`
    /// - [`SearchError::AllVariantsFailed`] if every search call fails
    ///
    /// Metadata and scoring failures never surface as errors; affected
    /// items carry a diagnostic instead.
    pub async fn rerank(
        &self,
        topic: &str,
        target: Option<usize>,
        method: ScoringMethod,
    ) -> Result<SearchResultSet> {
        let topic = validate_topic(topic)?;
        let target = validate_target(target.unwrap_or(self.config.max_results))?;

        tracing::trace!(%topic, "rerank requested");
        let started = Instant::now();
        let variants = self.expander.expand(topic).await;
        let fetched = self.fanout.search(topic, target, &variants).await?;
        let raw_count = fetched.total_count();

        let query = fetched.query().to_owned();
        let filters = fetched.applied_filters().clone();
        let results = deduplicate(fetched.into_results());
        // expansion, fan-out and dedup
        let unique = SearchResultSet::new(query, results, started.elapsed(), filters);

        let scoring_started = Instant::now();
        let records = match method {
            ScoringMethod::RuleBased => {
                let metadata = self.enricher.enrich(unique.results()).await;
                let scorer = RuleScorer::at(self.reference_time.unwrap_or_else(Utc::now));
                scorer.score_all(topic, unique.results(), &metadata)
            }
            ScoringMethod::LlmBased => self.oracle.score_all(topic, unique.results()).await,
        };
        let degraded = records.iter().filter(|r| r.is_degraded()).count();

        let ranked = rank(
            unique,
            records,
            method,
            Some(target),
            scoring_started.elapsed(),
        );

        tracing::info!(
            method = %method,
            raw = raw_count,
            returned = ranked.total_count(),
            degraded,
            elapsed_ms = ranked.elapsed().as_millis() as u64,
            "rerank complete"
        );
        Ok(ranked)
    }
}

/// Trimmed topic, or a validation error.
fn validate_topic(topic: &str) -> Result<&str> {
    let trimmed = topic.trim();
    if trimmed.is_empty() {
        return Err(SearchError::Validation("topic must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_TOPIC_CHARS {
        return Err(SearchError::Validation(format!(
            "topic must be at most {MAX_TOPIC_CHARS} characters"
        )));
    }
    Ok(trimmed)
}

/// Target count within `1..=MAX_RESULTS_LIMIT`, or a validation error.
fn validate_target(target: usize) -> Result<usize> {
    if target == 0 {
        return Err(SearchError::Validation(
            "target count must be greater than 0".into(),
        ));
    }
    if target > MAX_RESULTS_LIMIT {
        return Err(SearchError::Validation(format!(
            "target count must be at most {MAX_RESULTS_LIMIT}"
        )));
    }
    Ok(target)
}
