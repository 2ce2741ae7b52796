//! Final ranking: merge scores into results, sort, truncate, record provenance.

use std::time::Duration;

use serde_json::json;

use crate::scoring::{Diagnostic, ScoreRecord, ORACLE_WEIGHTS, RULE_WEIGHTS};
use crate::types::{ScoringMethod, SearchResult, SearchResultSet};

/// Merge `records` into `upstream`'s results and produce the ranked set.
///
/// Records pair with results by index. Sorting is stable and descending on
/// the total score, so equal scores keep their upstream order. The output
/// is truncated to `target` when given. Elapsed time is the upstream time
/// plus `scoring_time`; provenance keys are merged over the upstream
/// filters.
///
/// A record count that differs from the result count is an invariant
/// violation: it is logged, surplus records are dropped, and results
/// without a record keep their original score with a
/// [`Diagnostic::ScoringFailed`] marker.
pub fn rank(
    upstream: SearchResultSet,
    records: Vec<ScoreRecord>,
    method: ScoringMethod,
    target: Option<usize>,
    scoring_time: Duration,
) -> SearchResultSet {
    let query = upstream.query().to_owned();
    let elapsed = upstream.elapsed() + scoring_time;
    let mut filters = upstream.applied_filters().clone();
    let results = upstream.into_results();

    if records.len() != results.len() {
        tracing::error!(
            results = results.len(),
            scores = records.len(),
            "score count does not match result count"
        );
    }

    let mut records = records.into_iter();
    let mut ranked: Vec<SearchResult> = results
        .iter()
        .map(|result| {
            let record = records
                .next()
                .unwrap_or_else(|| missing_record(result.original_score, method));
            result.with_score(record)
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    if let Some(target) = target {
        ranked.truncate(target);
    }

    filters.insert("reranked".to_owned(), json!(true));
    filters.insert("scoring_method".to_owned(), json!(method.name()));
    let weights = match method {
        ScoringMethod::RuleBased => json!(RULE_WEIGHTS),
        ScoringMethod::LlmBased => json!(ORACLE_WEIGHTS),
    };
    filters.insert("reranking_weights".to_owned(), weights);

    SearchResultSet::new(query, ranked, elapsed, filters)
}

fn missing_record(original_score: f64, method: ScoringMethod) -> ScoreRecord {
    let diagnostic = Diagnostic::ScoringFailed("no score produced".into());
    match method {
        ScoringMethod::RuleBased => ScoreRecord::degraded_rule(original_score, diagnostic),
        ScoringMethod::LlmBased => ScoreRecord::degraded_oracle(original_score, diagnostic),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoreBreakdown;
    use std::collections::BTreeMap;

    fn make_set(scores: &[f64]) -> SearchResultSet {
        let results = scores
            .iter()
            .enumerate()
            .map(|(i, s)| SearchResult::new(format!("r{i}"), format!("https://r{i}.com"), "", *s, None))
            .collect();
        let mut filters = BTreeMap::new();
        filters.insert("academic_only".to_owned(), json!(true));
        SearchResultSet::new("gnn", results, Duration::from_millis(400), filters)
    }

    fn record(total: f64) -> ScoreRecord {
        ScoreRecord::from_breakdown(ScoreBreakdown::Rule {
            relevance: total,
            authority: total,
            recency: total,
            completeness: total,
        })
    }

    fn titles(set: &SearchResultSet) -> Vec<&str> {
        set.results().iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn sorts_descending_and_truncates() {
        let set = make_set(&[0.1, 0.2, 0.3, 0.4]);
        let ranked = rank(
            set,
            vec![record(0.2), record(0.9), record(0.5), record(0.7)],
            ScoringMethod::RuleBased,
            Some(3),
            Duration::from_millis(100),
        );
        assert_eq!(titles(&ranked), vec!["r1", "r3", "r2"]);
        assert_eq!(ranked.total_count(), 3);
        assert_eq!(ranked.elapsed(), Duration::from_millis(500));
    }

    #[test]
    fn ties_keep_upstream_order() {
        let set = make_set(&[0.5, 0.5, 0.5, 0.5]);
        let ranked = rank(
            set,
            vec![record(0.5), record(0.8), record(0.5), record(0.8)],
            ScoringMethod::RuleBased,
            None,
            Duration::ZERO,
        );
        assert_eq!(titles(&ranked), vec!["r1", "r3", "r0", "r2"]);
    }

    #[test]
    fn provenance_merged_over_upstream() {
        let ranked = rank(
            make_set(&[0.5]),
            vec![record(0.5)],
            ScoringMethod::LlmBased,
            None,
            Duration::ZERO,
        );
        let filters = ranked.applied_filters();
        assert_eq!(filters["reranked"], json!(true));
        assert_eq!(filters["scoring_method"], json!("llm_based"));
        assert_eq!(filters["reranking_weights"]["quality"], json!(0.25));
        assert_eq!(filters["academic_only"], json!(true));
    }

    #[test]
    fn missing_scores_fall_back_to_original() {
        let ranked = rank(
            make_set(&[0.3, 0.6]),
            vec![record(0.1)],
            ScoringMethod::RuleBased,
            None,
            Duration::ZERO,
        );
        assert_eq!(ranked.total_count(), 2);
        let r1 = &ranked.results()[0];
        assert_eq!(r1.title, "r1");
        assert!((r1.score - 0.6).abs() < f64::EPSILON);
        assert!(matches!(
            r1.rerank.as_ref().and_then(|r| r.diagnostic.clone()),
            Some(Diagnostic::ScoringFailed(_))
        ));
    }

    #[test]
    fn surplus_scores_dropped() {
        let ranked = rank(
            make_set(&[0.3]),
            vec![record(0.9), record(0.1)],
            ScoringMethod::RuleBased,
            None,
            Duration::ZERO,
        );
        assert_eq!(ranked.total_count(), 1);
        assert!((ranked.results()[0].score - 0.9).abs() < 1e-12);
    }

    #[test]
    fn original_score_preserved() {
        let ranked = rank(
            make_set(&[0.3]),
            vec![record(0.9)],
            ScoringMethod::RuleBased,
            None,
            Duration::ZERO,
        );
        assert!((ranked.results()[0].original_score - 0.3).abs() < f64::EPSILON);
    }
}
