//! Multi-dimensional scoring strategies and their shared output contract.
//!
//! Both strategies produce a [`ScoreRecord`]: a total in `[0, 1]`, the
//! sub-score breakdown that produced it, and an optional [`Diagnostic`]
//! marking reduced-confidence entries. Downstream ranking only ever looks
//! at `total`, so it is agnostic of which strategy ran.
//!
//! ```text
//! rule   total = 0.35·relevance + 0.30·authority + 0.20·recency + 0.15·completeness
//! oracle total = 0.30·relevance + 0.25·authority + 0.25·quality + 0.20·utility
//! ```

pub mod decode;
pub mod oracle;
pub mod rule;

use serde::{Serialize, Serializer};
use std::fmt;

use crate::types::clamp_unit;

/// Weight table for the rule-based strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RuleWeights {
    pub relevance: f64,
    pub authority: f64,
    pub recency: f64,
    pub completeness: f64,
}

impl RuleWeights {
    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        self.relevance + self.authority + self.recency + self.completeness
    }
}

/// Weight table for the oracle-delegated strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OracleWeights {
    pub relevance: f64,
    pub authority: f64,
    pub quality: f64,
    pub utility: f64,
}

impl OracleWeights {
    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        self.relevance + self.authority + self.quality + self.utility
    }
}

/// Fixed rule-based weights.
pub const RULE_WEIGHTS: RuleWeights = RuleWeights {
    relevance: 0.35,
    authority: 0.30,
    recency: 0.20,
    completeness: 0.15,
};

/// Fixed oracle weights.
pub const ORACLE_WEIGHTS: OracleWeights = OracleWeights {
    relevance: 0.30,
    authority: 0.25,
    quality: 0.25,
    utility: 0.20,
};

/// Sub-scores produced by one strategy. Every value lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ScoreBreakdown {
    /// Rule-based heuristic sub-scores.
    Rule {
        relevance: f64,
        authority: f64,
        recency: f64,
        completeness: f64,
    },
    /// Oracle-assigned sub-scores with the oracle's justification.
    Oracle {
        relevance: f64,
        authority: f64,
        quality: f64,
        utility: f64,
        reasoning: String,
    },
}

impl ScoreBreakdown {
    /// Weighted sum of the sub-scores under the strategy's weight table.
    pub fn weighted_total(&self) -> f64 {
        match self {
            Self::Rule {
                relevance,
                authority,
                recency,
                completeness,
            } => {
                relevance * RULE_WEIGHTS.relevance
                    + authority * RULE_WEIGHTS.authority
                    + recency * RULE_WEIGHTS.recency
                    + completeness * RULE_WEIGHTS.completeness
            }
            Self::Oracle {
                relevance,
                authority,
                quality,
                utility,
                ..
            } => {
                relevance * ORACLE_WEIGHTS.relevance
                    + authority * ORACLE_WEIGHTS.authority
                    + quality * ORACLE_WEIGHTS.quality
                    + utility * ORACLE_WEIGHTS.utility
            }
        }
    }

    /// The four numeric sub-scores in declaration order.
    pub fn sub_scores(&self) -> [f64; 4] {
        match self {
            Self::Rule {
                relevance,
                authority,
                recency,
                completeness,
            } => [*relevance, *authority, *recency, *completeness],
            Self::Oracle {
                relevance,
                authority,
                quality,
                utility,
                ..
            } => [*relevance, *authority, *quality, *utility],
        }
    }
}

/// Marker attached to entries scored with reduced confidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Rule-based scoring failed for this item.
    ScoringFailed(String),
    /// The item's source is recognised but its metadata could not be fetched.
    MetadataUnavailable,
    /// The oracle's reply for this item's batch could not be decoded.
    ParseFailed,
    /// The oracle call for this item's batch failed.
    OracleCallFailed(String),
}

impl Diagnostic {
    /// Short fixed phrase naming the failure, without any detail.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ScoringFailed(_) => "scoring failed",
            Self::MetadataUnavailable => "metadata unavailable",
            Self::ParseFailed => "parse failed",
            Self::OracleCallFailed(_) => "oracle call failed",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScoringFailed(reason) => write!(f, "scoring failed: {reason}"),
            Self::MetadataUnavailable => f.write_str("metadata unavailable"),
            Self::ParseFailed => f.write_str("parse failed"),
            Self::OracleCallFailed(reason) => write!(f, "oracle call failed: {reason}"),
        }
    }
}

impl Serialize for Diagnostic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Normalised output of either scoring strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    /// Total score in `[0, 1]`, the only value the ranker sorts on.
    pub total: f64,
    /// Sub-scores that produced `total`.
    pub breakdown: ScoreBreakdown,
    /// Set when the entry was scored on a degraded path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

impl ScoreRecord {
    /// Score from a breakdown using the strategy's weight table.
    pub fn from_breakdown(breakdown: ScoreBreakdown) -> Self {
        Self {
            total: clamp_unit(breakdown.weighted_total()),
            breakdown,
            diagnostic: None,
        }
    }

    /// Attach a diagnostic without changing the scores.
    pub fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostic = Some(diagnostic);
        self
    }

    /// Rule-based fallback: total is the original score, sub-scores zeroed.
    pub fn degraded_rule(original_score: f64, diagnostic: Diagnostic) -> Self {
        Self {
            total: clamp_unit(original_score),
            breakdown: ScoreBreakdown::Rule {
                relevance: 0.0,
                authority: 0.0,
                recency: 0.0,
                completeness: 0.0,
            },
            diagnostic: Some(diagnostic),
        }
    }

    /// Oracle fallback: neutral sub-scores, total is the original score.
    pub fn degraded_oracle(original_score: f64, diagnostic: Diagnostic) -> Self {
        Self {
            total: clamp_unit(original_score),
            breakdown: ScoreBreakdown::Oracle {
                relevance: 0.5,
                authority: 0.5,
                quality: 0.5,
                utility: 0.5,
                reasoning: diagnostic.label().to_owned(),
            },
            diagnostic: Some(diagnostic),
        }
    }

    /// Whether this entry was scored on a degraded path.
    pub fn is_degraded(&self) -> bool {
        self.diagnostic.is_some()
    }
}
