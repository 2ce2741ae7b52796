//! Oracle-delegated scoring.
//!
//! Results are scored in fixed-size batches, one oracle call per batch.
//! Batches run strictly one after another with a pause in between so the
//! oracle's rate limits are respected. A batch whose call fails, or whose
//! reply does not yield one finite entry per item, degrades as a whole:
//! every item keeps its original score with neutral sub-scores and a
//! diagnostic.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use crate::config::RerankConfig;
use crate::provider::ScoringOracle;
use crate::scoring::decode::{decode_reply, OracleEntry};
use crate::scoring::{Diagnostic, ScoreBreakdown, ScoreRecord};
use crate::types::{clamp_unit, SearchResult};

/// Maximum characters of content excerpt sent per item.
const EXCERPT_CHARS: usize = 500;

/// Batch scorer backed by a [`ScoringOracle`].
pub struct OracleScorer {
    oracle: Arc<dyn ScoringOracle>,
    batch_size: usize,
    pause: Duration,
}

impl OracleScorer {
    /// Scorer using the batch size and pause from `config`.
    pub fn new(oracle: Arc<dyn ScoringOracle>, config: &RerankConfig) -> Self {
        Self::with_batching(
            oracle,
            config.oracle_batch_size,
            Duration::from_millis(config.oracle_batch_pause_ms),
        )
    }

    /// Scorer with explicit batching. A zero batch size is treated as 1.
    pub fn with_batching(oracle: Arc<dyn ScoringOracle>, batch_size: usize, pause: Duration) -> Self {
        Self {
            oracle,
            batch_size: batch_size.max(1),
            pause,
        }
    }

    /// Score every result. The output has one record per input, in order.
    pub async fn score_all(&self, query: &str, results: &[SearchResult]) -> Vec<ScoreRecord> {
        let mut records = Vec::with_capacity(results.len());

        for (batch_no, batch) in results.chunks(self.batch_size).enumerate() {
            if batch_no > 0 && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }

            let prompt = build_prompt(query, batch);
            let batch_records = match self.oracle.complete(&prompt).await {
                Ok(reply) => records_from_reply(batch, &reply),
                Err(e) => {
                    tracing::warn!(batch = batch_no, error = %e, "oracle call failed");
                    degrade(batch, &Diagnostic::OracleCallFailed(e.to_string()))
                }
            };
            records.extend(batch_records);
        }

        tracing::debug!(items = results.len(), "oracle scoring complete");
        records
    }
}

/// Build the scoring request for one batch.
pub(crate) fn build_prompt(query: &str, batch: &[SearchResult]) -> String {
    let mut prompt = format!(
        "You are an expert research librarian. Rate how useful each search result \
         below is for someone researching \"{query}\".\n\n\
         Score each result from 0.0 to 1.0 on four dimensions:\n\
         - relevance: how directly it addresses the research topic\n\
         - authority: credibility of the source and its authors\n\
         - quality: depth, rigour and clarity of the content\n\
         - utility: practical value for learning or implementing the topic\n\n\
         Results:\n"
    );

    for (i, result) in batch.iter().enumerate() {
        let excerpt: String = result.content.chars().take(EXCERPT_CHARS).collect();
        let _ = write!(
            prompt,
            "\n[{index}] {title}\nSource: {source}\nURL: {url}\nDate: {date}\n\
             Original score: {score:.3}\nContent: {excerpt}\n",
            index = i + 1,
            title = result.title,
            source = result.source,
            url = result.url,
            date = result.published_date.as_deref().unwrap_or("unknown"),
            score = result.original_score,
        );
    }

    let _ = write!(
        prompt,
        "\nReply with JSON only, one entry per result, using this exact format:\n\
         {{\"scores\": [{{\"index\": 1, \"relevance\": 0.0, \"authority\": 0.0, \
         \"quality\": 0.0, \"utility\": 0.0, \"reasoning\": \"one short sentence\"}}]}}\n\
         Include all {count} results.",
        count = batch.len()
    );
    prompt
}

/// Turn a reply into one record per batch item, or degrade the batch.
pub(crate) fn records_from_reply(batch: &[SearchResult], reply: &str) -> Vec<ScoreRecord> {
    let decoded = decode_reply(reply);
    match assign_entries(batch.len(), &decoded.entries) {
        Some(entries) => entries.into_iter().map(record_from_entry).collect(),
        None => {
            tracing::warn!(
                items = batch.len(),
                entries = decoded.entries.len(),
                stage = ?decoded.stage,
                "oracle reply does not cover the batch"
            );
            degrade(batch, &Diagnostic::ParseFailed)
        }
    }
}

/// Map decoded entries onto batch positions.
///
/// Entries carrying a 1-based index go to that slot; entries without one
/// fill slots by position. Out-of-range indices are ignored and the first
/// entry for a slot wins. Returns `None` unless every slot is filled with
/// finite values.
fn assign_entries(len: usize, entries: &[OracleEntry]) -> Option<Vec<&OracleEntry>> {
    let mut slots: Vec<Option<&OracleEntry>> = vec![None; len];

    for (pos, entry) in entries.iter().enumerate() {
        let slot = match entry.index {
            Some(i) if (1..=len).contains(&i) => i - 1,
            Some(_) => continue,
            None if pos < len => pos,
            None => continue,
        };
        if slots[slot].is_none() {
            slots[slot] = Some(entry);
        }
    }

    slots
        .into_iter()
        .map(|slot| slot.filter(|e| is_finite(e)))
        .collect()
}

fn is_finite(entry: &OracleEntry) -> bool {
    [entry.relevance, entry.authority, entry.quality, entry.utility]
        .iter()
        .all(|v| v.is_finite())
}

fn record_from_entry(entry: &OracleEntry) -> ScoreRecord {
    ScoreRecord::from_breakdown(ScoreBreakdown::Oracle {
        relevance: clamp_unit(entry.relevance),
        authority: clamp_unit(entry.authority),
        quality: clamp_unit(entry.quality),
        utility: clamp_unit(entry.utility),
        reasoning: entry.reasoning.clone(),
    })
}

fn degrade(batch: &[SearchResult], diagnostic: &Diagnostic) -> Vec<ScoreRecord> {
    batch
        .iter()
        .map(|result| ScoreRecord::degraded_oracle(result.original_score, diagnostic.clone()))
        .collect()
}
