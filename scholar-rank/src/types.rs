//! Core types for search results, result sets and scoring method selection.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::SearchError;
use crate::scoring::ScoreRecord;

/// A single search hit, identified by its canonical URL.
///
/// Records are never mutated once built. Reranking produces a new record via
/// [`SearchResult::with_score`].
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// The title of the result page.
    pub title: String,
    /// Canonical URL exactly as returned by the search provider.
    pub url: String,
    /// Content excerpt returned by the provider.
    pub content: String,
    /// Current ranking score in `[0, 1]`. Equal to `original_score` until
    /// the result has been reranked.
    pub score: f64,
    /// Provider-assigned relevance score in `[0, 1]`.
    pub original_score: f64,
    /// Source category derived from the URL.
    pub source: SourceType,
    /// Publication date reported by the provider, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    /// Score breakdown attached by the ranker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank: Option<ScoreRecord>,
}

impl SearchResult {
    /// Build a result from provider fields. Out-of-range provider scores
    /// are clamped to `[0, 1]`; non-finite scores become `0.0`.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
        provider_score: f64,
        published_date: Option<String>,
    ) -> Self {
        let url = url.into();
        let score = clamp_unit(provider_score);
        Self {
            title: title.into(),
            source: SourceType::from_url(&url),
            url,
            content: content.into(),
            score,
            original_score: score,
            published_date,
            rerank: None,
        }
    }

    /// Return a copy of this result carrying `record` as its score.
    pub fn with_score(&self, record: ScoreRecord) -> Self {
        Self {
            score: record.total,
            rerank: Some(record),
            ..self.clone()
        }
    }
}

/// Clamp a value into `[0, 1]`, mapping non-finite input to `0.0`.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Source category of a search hit, derived from its URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// arXiv paper pages.
    Arxiv,
    /// GitHub repositories.
    Github,
    /// Hugging Face models and datasets.
    #[serde(rename = "huggingface")]
    HuggingFace,
    /// Stack Overflow questions.
    #[serde(rename = "stackoverflow")]
    StackOverflow,
    /// Documentation sites.
    Documentation,
    /// Blogs and article platforms.
    Blog,
    /// Video platforms.
    Video,
    /// Discussion forums.
    Forum,
    /// Anything else.
    Website,
}

impl SourceType {
    /// Returns the lower-case tag used in serialized output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Arxiv => "arxiv",
            Self::Github => "github",
            Self::HuggingFace => "huggingface",
            Self::StackOverflow => "stackoverflow",
            Self::Documentation => "documentation",
            Self::Blog => "blog",
            Self::Video => "video",
            Self::Forum => "forum",
            Self::Website => "website",
        }
    }

    /// Classify a URL. Matching is case-insensitive and substring based,
    /// checked in a fixed priority order.
    pub fn from_url(url: &str) -> Self {
        let lower = url.to_lowercase();
        let has_any = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if lower.contains("github.com") {
            Self::Github
        } else if lower.contains("stackoverflow.com") {
            Self::StackOverflow
        } else if lower.contains("arxiv.org") {
            Self::Arxiv
        } else if lower.contains("huggingface.co") {
            Self::HuggingFace
        } else if has_any(&["docs.", "documentation"]) {
            Self::Documentation
        } else if has_any(&["blog", "medium.com", "dev.to"]) {
            Self::Blog
        } else if has_any(&["youtube.com", "youtu.be"]) {
            Self::Video
        } else if has_any(&["reddit.com", "news.ycombinator.com"]) {
            Self::Forum
        } else {
            Self::Website
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which scoring strategy the reranker applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    /// Deterministic weighted heuristic over enriched metadata.
    #[default]
    RuleBased,
    /// Sub-scores delegated to the external reasoning oracle.
    LlmBased,
}

impl ScoringMethod {
    /// Returns the wire name of this method.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RuleBased => "rule_based",
            Self::LlmBased => "llm_based",
        }
    }
}

impl fmt::Display for ScoringMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScoringMethod {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "rule_based" => Ok(Self::RuleBased),
            "llm_based" => Ok(Self::LlmBased),
            other => Err(SearchError::Validation(format!(
                "scoring method must be 'rule_based' or 'llm_based', got '{other}'"
            ))),
        }
    }
}

/// An ordered set of results produced by one pipeline stage.
///
/// `total_count` always equals the number of results; it is computed by the
/// constructor and cannot be set independently.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResultSet {
    query: String,
    results: Vec<SearchResult>,
    total_count: usize,
    #[serde(rename = "search_time", serialize_with = "serialize_secs")]
    elapsed: Duration,
    #[serde(rename = "filters_applied")]
    applied_filters: BTreeMap<String, serde_json::Value>,
}

impl SearchResultSet {
    /// Build a result set; `total_count` is derived from `results`.
    pub fn new(
        query: impl Into<String>,
        results: Vec<SearchResult>,
        elapsed: Duration,
        applied_filters: BTreeMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            query: query.into(),
            total_count: results.len(),
            results,
            elapsed,
            applied_filters,
        }
    }

    /// The query this set was produced for.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Results in ranking order.
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    /// Number of results in the set.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Cumulative time spent producing this set.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Provenance recorded by the stages that produced this set.
    pub fn applied_filters(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.applied_filters
    }

    /// Consume the set, returning its results.
    pub fn into_results(self) -> Vec<SearchResult> {
        self.results
    }
}

fn serialize_secs<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.as_secs_f64())
}
