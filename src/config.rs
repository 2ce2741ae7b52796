//! Host configuration: a TOML file plus environment overrides for secrets.
//!
//! ```toml
//! [rerank]
//! max_results = 10
//! academic_only = true
//! oracle_model = "gpt-4o-mini"
//!
//! [logging]
//! filter = "scholar=info,scholar_rank=info"
//! ```
//!
//! API keys are normally supplied through the environment rather than the
//! file; see [`AppConfig::apply_env_overrides`].

use std::path::{Path, PathBuf};

use scholar_rank::RerankConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScholarError};

/// Environment variable holding the search provider key.
pub const SEARCH_KEY_ENV: &str = "TAVILY_API_KEY";
/// Environment variable holding the oracle key.
pub const ORACLE_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable overriding the oracle base URL.
pub const ORACLE_URL_ENV: &str = "OPENAI_BASE_URL";
/// Environment variable holding the GitHub token.
pub const REPO_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Top-level host configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Pipeline settings handed to `scholar-rank`.
    pub rerank: RerankConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Logging settings. `RUST_LOG` takes precedence when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive string.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "scholar=info,scholar_rank=info".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ScholarError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ScholarError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/scholar/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("scholar").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("scholar")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/scholar-config/config.toml")
        }
    }

    /// Load from `path` if given, otherwise from the default path when it
    /// exists, otherwise fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit path is missing or any chosen file
    /// fails to parse.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Self::default_config_path();
                if default.is_file() {
                    Self::from_file(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Fill credentials and endpoints from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup. Empty values are
    /// ignored; set values replace whatever the file held.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(SEARCH_KEY_ENV) {
            self.rerank.search_api_key = Some(key);
        }
        if let Some(key) = get(ORACLE_KEY_ENV) {
            self.rerank.oracle_api_key = Some(key);
        }
        if let Some(url) = get(ORACLE_URL_ENV) {
            self.rerank.oracle_base_url = url;
        }
        if let Some(token) = get(REPO_TOKEN_ENV) {
            self.rerank.repo_token = Some(token);
        }
    }
}
