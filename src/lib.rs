//! Command-line host for `scholar-rank`.
//!
//! Owns the pieces a library should not: the config file, environment
//! overrides for credentials, and the global tracing subscriber.

pub mod config;
pub mod error;

pub use config::{AppConfig, LoggingConfig};
pub use error::{Result, ScholarError};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` wins over `default_filter` when it is set and valid. Logs go
/// to stderr so stdout stays clean for JSON output.
pub fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
