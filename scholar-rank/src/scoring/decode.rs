//! Defensive decoding of oracle scoring replies.
//!
//! The oracle is asked for
//! `{"scores": [{"index": 1, "relevance": .., "authority": .., "quality": ..,
//! "utility": .., "reasoning": ".."}]}` but replies are free text. Decoding
//! tries, in order:
//!
//! 1. **strict**: the whole reply is the envelope or a bare entry array
//! 2. **embedded**: the first `{` to last `}` (or `[` to `]`) slice, which
//!    strips markdown fences and surrounding prose
//! 3. **pattern**: regex extraction of the four score fields per entry
//! 4. **empty**: nothing usable
//!
//! Decoding never fails; an empty entry list is the failure signal.

use serde::Deserialize;
use std::sync::LazyLock;

use regex::Regex;

/// One per-item entry from an oracle reply. Values are unclamped.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OracleEntry {
    /// 1-based position of the item in its batch, when the oracle gave one.
    #[serde(default)]
    pub index: Option<usize>,
    pub relevance: f64,
    pub authority: f64,
    pub quality: f64,
    pub utility: f64,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Deserialize)]
struct Envelope {
    scores: Vec<OracleEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Reply {
    Envelope(Envelope),
    Bare(Vec<OracleEntry>),
}

impl Reply {
    fn into_entries(self) -> Vec<OracleEntry> {
        match self {
            Self::Envelope(envelope) => envelope.scores,
            Self::Bare(entries) => entries,
        }
    }
}

/// Which stage of the chain produced the entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    Strict,
    Embedded,
    Pattern,
    Empty,
}

/// Outcome of decoding one reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub entries: Vec<OracleEntry>,
    pub stage: DecodeStage,
}

const NUMBER: &str = r#""?(-?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?)"?"#;

static SCORE_ENTRY: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?s)"relevance"\s*:\s*{NUMBER}.*?"authority"\s*:\s*{NUMBER}.*?"quality"\s*:\s*{NUMBER}.*?"utility"\s*:\s*{NUMBER}(?:[^{{}}]*?"reasoning"\s*:\s*"((?:[^"\\]|\\.)*)")?"#
    ))
});

/// Run the decoder chain over `reply`.
pub fn decode_reply(reply: &str) -> Decoded {
    match serde_json::from_str::<Reply>(reply.trim()) {
        Ok(parsed) => {
            tracing::debug!(stage = "strict", "oracle reply decoded");
            return Decoded {
                entries: parsed.into_entries(),
                stage: DecodeStage::Strict,
            };
        }
        Err(e) => tracing::debug!(stage = "strict", error = %e, "oracle reply decode attempt failed"),
    }

    if let Some(entries) = decode_embedded(reply) {
        tracing::debug!(stage = "embedded", "oracle reply decoded");
        return Decoded {
            entries,
            stage: DecodeStage::Embedded,
        };
    }
    tracing::debug!(stage = "embedded", "oracle reply decode attempt failed");

    let entries = decode_pattern(reply);
    if !entries.is_empty() {
        tracing::debug!(stage = "pattern", count = entries.len(), "oracle reply decoded");
        return Decoded {
            entries,
            stage: DecodeStage::Pattern,
        };
    }
    tracing::debug!(stage = "pattern", "oracle reply decode attempt failed");

    Decoded {
        entries: Vec::new(),
        stage: DecodeStage::Empty,
    }
}

fn decode_embedded(reply: &str) -> Option<Vec<OracleEntry>> {
    [('{', '}'), ('[', ']')].into_iter().find_map(|(open, close)| {
        let start = reply.find(open)?;
        let end = reply.rfind(close)?;
        if end <= start {
            return None;
        }
        serde_json::from_str::<Reply>(&reply[start..=end])
            .ok()
            .map(Reply::into_entries)
    })
}

fn decode_pattern(reply: &str) -> Vec<OracleEntry> {
    let Ok(pattern) = SCORE_ENTRY.as_ref() else {
        return Vec::new();
    };
    pattern
        .captures_iter(reply)
        .filter_map(|caps| {
            let number = |i: usize| caps.get(i)?.as_str().parse::<f64>().ok();
            Some(OracleEntry {
                index: None,
                relevance: number(1)?,
                authority: number(2)?,
                quality: number(3)?,
                utility: number(4)?,
                reasoning: caps
                    .get(5)
                    .map(|m| m.as_str().replace("\\\"", "\""))
                    .unwrap_or_default(),
            })
        })
        .collect()
}
