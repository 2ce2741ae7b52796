//! Error types for the scholar host.

use scholar_rank::SearchError;

/// Top-level error type for the command-line host.
#[derive(Debug, thiserror::Error)]
pub enum ScholarError {
    /// Configuration file could not be parsed or written.
    #[error("config error: {0}")]
    Config(String),

    /// Search or reranking failed.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ScholarError>;
