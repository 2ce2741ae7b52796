//! Shared HTTP client for provider and oracle requests.
//!
//! Provides a configured [`reqwest::Client`] with the per-call timeout and an
//! identifying User-Agent. Metadata APIs (GitHub in particular) reject
//! requests that carry no User-Agent.

use crate::config::RerankConfig;
use crate::error::SearchError;
use std::time::Duration;

/// User-Agent sent when the config does not override it.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "scholar-rank/",
    env!("CARGO_PKG_VERSION"),
    " (academic research tool)"
);

/// Build a [`reqwest::Client`] for provider calls.
///
/// The client has:
/// - Per-call timeout from `config.timeout_seconds`
/// - The configured User-Agent (or [`DEFAULT_USER_AGENT`])
/// - gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Config`] if the client cannot be constructed.
pub fn build_client(config: &RerankConfig) -> Result<reqwest::Client, SearchError> {
    let ua = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Config(format!("failed to build HTTP client: {e}")))
}

/// Map a transport error to a provider error, tagging timeouts.
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> SearchError {
    if err.is_timeout() {
        SearchError::Timeout(format!("{provider} request timed out"))
    } else {
        SearchError::Provider(format!("{provider} request failed: {err}"))
    }
}
