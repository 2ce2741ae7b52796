//! Rule-based scoring over enriched metadata.
//!
//! Each item gets four sub-scores in `[0, 1]`:
//!
//! - **relevance**: query term overlap with the source-appropriate text,
//!   blended with the provider score, plus an exact-phrase bonus
//! - **authority**: paper categories, authorship and publication venue, or
//!   repository popularity and project features
//! - **recency**: bucketed decay on the age of the source date
//! - **completeness**: how much descriptive material the record carries
//!
//! Items without metadata take the basic path: relevance over title and
//! content, with neutral authority, recency and completeness.

use chrono::{DateTime, Utc};

use crate::metadata::{AbsentReason, Metadata, PaperMetadata, RepoMetadata};
use crate::scoring::{Diagnostic, ScoreBreakdown, ScoreRecord};
use crate::types::SearchResult;

/// Categories that earn the paper authority bonus.
const HIGH_IMPACT_CATEGORIES: &[&str] = &["cs.AI", "cs.LG", "cs.CV", "cs.CL", "stat.ML"];

/// Languages that earn the repository authority bonus.
const POPULAR_LANGUAGES: &[&str] = &["Python", "JavaScript", "TypeScript", "Go", "Rust", "C++"];

/// Score used for every dimension the basic path cannot measure.
const NEUTRAL: f64 = 0.5;

/// Deterministic heuristic scorer.
///
/// Recency is measured against a fixed reference time captured at
/// construction, so two scorers built with the same reference time produce
/// identical output for identical input.
#[derive(Debug, Clone, Copy)]
pub struct RuleScorer {
    reference_time: DateTime<Utc>,
}

impl Default for RuleScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleScorer {
    /// Scorer measuring recency against the current time.
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Scorer measuring recency against `reference_time`.
    pub fn at(reference_time: DateTime<Utc>) -> Self {
        Self { reference_time }
    }

    /// Score every result against its metadata.
    ///
    /// `metadata` is matched to `results` by index. A result with no
    /// matching entry is scored on the basic path.
    pub fn score_all(
        &self,
        query: &str,
        results: &[SearchResult],
        metadata: &[Metadata],
    ) -> Vec<ScoreRecord> {
        let fallback = Metadata::Absent(AbsentReason::UnrecognizedSource);
        results
            .iter()
            .enumerate()
            .map(|(i, result)| self.score(query, result, metadata.get(i).unwrap_or(&fallback)))
            .collect()
    }

    /// Score one result. Never fails: a computation that produces a
    /// non-finite value falls back to the result's original score.
    pub fn score(&self, query: &str, result: &SearchResult, metadata: &Metadata) -> ScoreRecord {
        let breakdown = match metadata {
            Metadata::Paper(paper) => self.paper_breakdown(query, result, paper),
            Metadata::Repo(repo) => self.repo_breakdown(query, result, repo),
            Metadata::Absent(_) => self.basic_breakdown(query, result),
        };

        if let Some(reason) = invalid_input(result, &breakdown) {
            tracing::warn!(url = %result.url, reason = %reason, "rule scoring failed, keeping original score");
            return ScoreRecord::degraded_rule(result.original_score, Diagnostic::ScoringFailed(reason));
        }

        let record = ScoreRecord::from_breakdown(breakdown);
        if metadata.is_degraded() {
            record.with_diagnostic(Diagnostic::MetadataUnavailable)
        } else {
            record
        }
    }

    fn paper_breakdown(
        &self,
        query: &str,
        result: &SearchResult,
        paper: &PaperMetadata,
    ) -> ScoreBreakdown {
        let text = format!("{} {}", paper.title, paper.abstract_text);
        ScoreBreakdown::Rule {
            relevance: text_relevance(query, &text, result.original_score),
            authority: paper_authority(paper),
            recency: self.recency(Some(paper.published)),
            completeness: paper_completeness(paper),
        }
    }

    fn repo_breakdown(
        &self,
        query: &str,
        result: &SearchResult,
        repo: &RepoMetadata,
    ) -> ScoreBreakdown {
        let text = format!(
            "{} {} {}",
            repo.full_name,
            repo.description,
            repo.topics.join(" ")
        );
        ScoreBreakdown::Rule {
            relevance: text_relevance(query, &text, result.original_score),
            authority: repo_authority(repo),
            recency: self.recency(Some(repo.updated_at)),
            completeness: self.repo_completeness(repo),
        }
    }

    fn basic_breakdown(&self, query: &str, result: &SearchResult) -> ScoreBreakdown {
        let text = format!("{} {}", result.title, result.content);
        ScoreBreakdown::Rule {
            relevance: text_relevance(query, &text, result.original_score),
            authority: NEUTRAL,
            recency: NEUTRAL,
            completeness: NEUTRAL,
        }
    }

    /// Bucketed age decay; `None` scores neutral.
    fn recency(&self, date: Option<DateTime<Utc>>) -> f64 {
        let Some(date) = date else {
            return NEUTRAL;
        };
        match (self.reference_time - date).num_days() {
            i64::MIN..=30 => 1.0,
            31..=90 => 0.9,
            91..=365 => 0.7,
            366..=730 => 0.5,
            731..=1825 => 0.3,
            _ => 0.1,
        }
    }

    fn repo_completeness(&self, repo: &RepoMetadata) -> f64 {
        let mut score: f64 = 0.0;

        let description_len = repo.description.chars().count();
        if description_len > 50 {
            score += 0.3;
        } else if description_len > 0 {
            score += 0.15;
        }

        match repo.topics.len() {
            0 => {}
            1 | 2 => score += 0.15,
            _ => score += 0.25,
        }

        if (100..=100_000).contains(&repo.size) {
            score += 0.2;
        }
        if self.recency(Some(repo.updated_at)) > 0.7 {
            score += 0.15;
        }
        if repo.has_wiki {
            score += 0.05;
        }
        if repo.has_pages {
            score += 0.05;
        }

        score.min(1.0)
    }
}

/// Returns why a breakdown cannot be trusted, if it cannot.
fn invalid_input(result: &SearchResult, breakdown: &ScoreBreakdown) -> Option<String> {
    if !result.original_score.is_finite() {
        return Some(format!("non-finite original score {}", result.original_score));
    }
    breakdown
        .sub_scores()
        .iter()
        .find(|v| !v.is_finite())
        .map(|v| format!("non-finite sub-score {v}"))
}

/// Blend of query term overlap, provider score and exact-phrase match.
///
/// The pre-clamp sum can exceed 1.0; the clamp is authoritative.
fn text_relevance(query: &str, text: &str, original_score: f64) -> f64 {
    let query = query.trim().to_lowercase();
    let text = text.to_lowercase();

    let words: Vec<&str> = query.split_whitespace().collect();
    let overlap = if words.is_empty() {
        0.0
    } else {
        let matches = words.iter().filter(|w| text.contains(*w)).count();
        matches as f64 / words.len() as f64
    };
    let exact_bonus = if !query.is_empty() && text.contains(query.as_str()) {
        0.2
    } else {
        0.0
    };

    (overlap * 0.6 + original_score * 0.4 + exact_bonus).clamp(0.0, 1.0)
}

fn paper_authority(paper: &PaperMetadata) -> f64 {
    let mut score: f64 = 0.0;

    if paper
        .categories
        .iter()
        .any(|c| HIGH_IMPACT_CATEGORIES.contains(&c.as_str()))
    {
        score += 0.3;
    }
    match paper.authors.len() {
        2..=6 => score += 0.2,
        n if n > 6 => score += 0.1,
        _ => {}
    }
    if paper.journal_ref.is_some() {
        score += 0.3;
    }
    if paper.updated > paper.published {
        score += 0.2;
    }

    score.min(1.0)
}

fn repo_authority(repo: &RepoMetadata) -> f64 {
    let mut score: f64 = 0.0;

    if repo.stars > 0 {
        score += ((repo.stars as f64 + 1.0).log10() / 4.0).min(0.5);
    }
    if repo.forks > 0 {
        score += ((repo.forks as f64 + 1.0).log10() / 5.0).min(0.2);
    }
    if POPULAR_LANGUAGES.contains(&repo.language.as_str()) {
        score += 0.1;
    }
    if repo.has_wiki {
        score += 0.05;
    }
    if repo.has_issues {
        score += 0.05;
    }
    if !repo.topics.is_empty() {
        score += 0.1;
    }

    score.min(1.0)
}

fn paper_completeness(paper: &PaperMetadata) -> f64 {
    let mut score: f64 = 0.0;

    let abstract_len = paper.abstract_text.chars().count();
    if abstract_len > 500 {
        score += 0.3;
    } else if abstract_len > 200 {
        score += 0.2;
    }

    let title_len = paper.title.chars().count();
    if (50..=150).contains(&title_len) {
        score += 0.2;
    } else if (30..=200).contains(&title_len) {
        score += 0.1;
    }

    match paper.categories.len() {
        0 => {}
        1 => score += 0.1,
        _ => score += 0.2,
    }

    if paper.comment.is_some() {
        score += 0.15;
    }
    if paper.journal_ref.is_some() {
        score += 0.15;
    }

    score.min(1.0)
}
