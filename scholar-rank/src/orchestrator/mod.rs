//! Pipeline stages: expansion, fan-out, dedup, enrichment and ranking.
//!
//! Each stage is a pure transformation over its input; no state is shared
//! between stages or between calls. Scoring lives in [`crate::scoring`].

pub mod dedup;
pub mod enrich;
pub mod expand;
pub mod ranking;
pub mod search;
pub mod source;

pub use dedup::deduplicate;
pub use enrich::MetadataEnricher;
pub use expand::{AcademicExpander, GeneratedExpander, QueryExpander};
pub use ranking::rank;
pub use search::SearchFanout;
