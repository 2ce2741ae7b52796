//! Source-specific metadata records fetched during enrichment.
//!
//! Records live only for the duration of one rerank call: they are fetched
//! per item, consumed by the rule-based scorer, and dropped.

use chrono::{DateTime, Utc};

/// Structured record for an arXiv paper.
#[derive(Debug, Clone, PartialEq)]
pub struct PaperMetadata {
    /// arXiv identifier, e.g. `2101.00001v2`.
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub abstract_text: String,
    /// Category terms such as `cs.LG`.
    pub categories: Vec<String>,
    pub published: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub comment: Option<String>,
    pub journal_ref: Option<String>,
}

/// Structured record for a GitHub repository.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoMetadata {
    /// `owner/repo`.
    pub full_name: String,
    pub description: String,
    pub stars: u64,
    pub forks: u64,
    /// Primary language, empty when GitHub reports none.
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub topics: Vec<String>,
    pub has_issues: bool,
    pub has_wiki: bool,
    pub has_pages: bool,
    /// Repository size in kilobytes.
    pub size: u64,
}

/// Why an item carries no metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbsentReason {
    /// The URL is not on a domain the enricher understands.
    UnrecognizedSource,
    /// The provider reported that the paper or repository does not exist.
    NotFound,
    /// The fetch failed (network, status or parse error).
    FetchFailed(String),
    /// The enrichment deadline elapsed before the fetch completed.
    TimedOut,
}

/// Enrichment outcome for one item.
#[derive(Debug, Clone, PartialEq)]
pub enum Metadata {
    Paper(PaperMetadata),
    Repo(RepoMetadata),
    Absent(AbsentReason),
}

impl Metadata {
    /// Whether a recognised source failed to yield metadata.
    ///
    /// Unrecognised sources are not degraded: they never had metadata to
    /// fetch.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            Self::Absent(
                AbsentReason::NotFound | AbsentReason::FetchFailed(_) | AbsentReason::TimedOut
            )
        )
    }
}
