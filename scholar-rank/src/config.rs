//! Rerank pipeline configuration with sensible defaults.
//!
//! [`RerankConfig`] is an explicit value handed to every component
//! constructor. It controls the fan-out shape, per-call and batch timeouts,
//! oracle batching, and the endpoints of the external collaborators.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Domains searched when `academic_only` is set and no allow list is given.
pub const ACADEMIC_DOMAINS: &[&str] = &["arxiv.org", "github.com", "huggingface.co"];

/// Largest result count a single rerank call may return.
pub const MAX_RESULTS_LIMIT: usize = 50;

/// Configuration for a rerank pipeline.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour. Deserializes from a partial table;
/// missing fields take their default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankConfig {
    /// Result count used when the caller gives no target count.
    pub max_results: usize,
    /// Maximum number of query variants dispatched to the search provider.
    pub max_query_variants: usize,
    /// Lower bound on results requested per query variant.
    pub min_results_per_variant: usize,
    /// Pacing delay in milliseconds between consecutive variant dispatches.
    pub dispatch_delay_ms: u64,
    /// Provider search depth (`basic` or `advanced`).
    pub search_depth: String,
    /// Restrict searches to academic domains when no allow list is given.
    pub academic_only: bool,
    /// Domain allow list passed to the search provider.
    pub include_domains: Vec<String>,
    /// Domain deny list passed to the search provider.
    pub exclude_domains: Vec<String>,
    /// Ask the oracle's text generator for query variants instead of the
    /// built-in academic expansion.
    pub generated_queries: bool,
    /// Per-call HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Overall deadline in seconds for one metadata enrichment batch.
    pub enrichment_timeout_secs: u64,
    /// Items per oracle scoring request.
    pub oracle_batch_size: usize,
    /// Pause in milliseconds between consecutive oracle batches.
    pub oracle_batch_pause_ms: u64,
    /// Custom User-Agent string for all outgoing requests.
    pub user_agent: Option<String>,
    /// Search provider base URL.
    pub search_base_url: String,
    /// Search provider API key.
    pub search_api_key: Option<String>,
    /// Paper metadata (arXiv query API) endpoint.
    pub paper_base_url: String,
    /// Repository metadata (GitHub REST API) base URL.
    pub repo_base_url: String,
    /// Optional GitHub token; raises the anonymous rate limit.
    pub repo_token: Option<String>,
    /// OpenAI-compatible chat completions base URL for the oracle.
    pub oracle_base_url: String,
    /// Oracle API key.
    pub oracle_api_key: Option<String>,
    /// Oracle model name.
    pub oracle_model: String,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            max_query_variants: 3,
            min_results_per_variant: 3,
            dispatch_delay_ms: 100,
            search_depth: "basic".into(),
            academic_only: true,
            include_domains: Vec::new(),
            exclude_domains: Vec::new(),
            generated_queries: false,
            timeout_seconds: 30,
            enrichment_timeout_secs: 30,
            oracle_batch_size: 5,
            oracle_batch_pause_ms: 1000,
            user_agent: None,
            search_base_url: "https://api.tavily.com".into(),
            search_api_key: None,
            paper_base_url: "http://export.arxiv.org/api/query".into(),
            repo_base_url: "https://api.github.com".into(),
            repo_token: None,
            oracle_base_url: "https://api.openai.com/v1".into(),
            oracle_api_key: None,
            oracle_model: "gpt-4o-mini".into(),
        }
    }
}

impl RerankConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_results`, `max_query_variants` and `oracle_batch_size` must be > 0
    /// - `max_results` must not exceed [`MAX_RESULTS_LIMIT`]
    /// - `timeout_seconds` and `enrichment_timeout_secs` must be > 0
    /// - `search_depth` must not be empty
    /// - endpoint base URLs must not be empty
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.max_results > MAX_RESULTS_LIMIT {
            return Err(SearchError::Config(format!(
                "max_results must be at most {MAX_RESULTS_LIMIT}"
            )));
        }
        if self.max_query_variants == 0 {
            return Err(SearchError::Config(
                "max_query_variants must be greater than 0".into(),
            ));
        }
        if self.oracle_batch_size == 0 {
            return Err(SearchError::Config(
                "oracle_batch_size must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.enrichment_timeout_secs == 0 {
            return Err(SearchError::Config(
                "enrichment_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.search_depth.trim().is_empty() {
            return Err(SearchError::Config("search_depth must not be empty".into()));
        }
        for (name, value) in [
            ("search_base_url", &self.search_base_url),
            ("paper_base_url", &self.paper_base_url),
            ("repo_base_url", &self.repo_base_url),
            ("oracle_base_url", &self.oracle_base_url),
        ] {
            if value.trim().is_empty() {
                return Err(SearchError::Config(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }

    /// The allow list actually sent to the provider.
    ///
    /// An explicit allow list wins; otherwise academic mode restricts the
    /// search to [`ACADEMIC_DOMAINS`].
    pub fn effective_include_domains(&self) -> Vec<String> {
        if !self.include_domains.is_empty() {
            self.include_domains.clone()
        } else if self.academic_only {
            ACADEMIC_DOMAINS.iter().map(|d| (*d).to_owned()).collect()
        } else {
            Vec::new()
        }
    }
}
