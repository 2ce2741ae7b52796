//! Error types for the scholar-rank crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. No API keys or sensitive data appear in
//! error messages.

/// Errors that can surface from the search and rerank pipeline.
///
/// Only [`SearchError::AllVariantsFailed`], [`SearchError::Validation`] and
/// [`SearchError::Config`] ever escape [`crate::Reranker::rerank`]; the other
/// variants are produced by individual provider calls and are contained by
/// the stage that issued them.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Every query variant in the fan-out failed.
    #[error("all query variants failed: {0}")]
    AllVariantsFailed(String),

    /// A search, metadata or oracle transport call failed.
    #[error("provider error: {0}")]
    Provider(String),

    /// A provider replied with something that could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// Empty or invalid query or parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// A bounded operation ran out of time.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Invalid pipeline configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for scholar-rank results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_all_variants_failed() {
        let err = SearchError::AllVariantsFailed("3 variants".into());
        assert_eq!(err.to_string(), "all query variants failed: 3 variants");
    }

    #[test]
    fn display_provider() {
        let err = SearchError::Provider("connection refused".into());
        assert_eq!(err.to_string(), "provider error: connection refused");
    }

    #[test]
    fn display_parse() {
        let err = SearchError::Parse("missing entry element".into());
        assert_eq!(err.to_string(), "parse error: missing entry element");
    }

    #[test]
    fn display_validation() {
        let err = SearchError::Validation("topic must not be empty".into());
        assert_eq!(err.to_string(), "validation error: topic must not be empty");
    }

    #[test]
    fn display_timeout() {
        let err = SearchError::Timeout("enrichment exceeded 30s".into());
        assert_eq!(err.to_string(), "timed out: enrichment exceeded 30s");
    }

    #[test]
    fn display_config() {
        let err = SearchError::Config("max_results must be > 0".into());
        assert_eq!(err.to_string(), "config error: max_results must be > 0");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
