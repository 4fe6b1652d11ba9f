//! Configuration management.
//!
//! Settings come from an optional TOML file layered under environment variables
//! prefixed with `GET_PAPERS` (nested keys use `__`, e.g.
//! `GET_PAPERS_FETCH__MAX_RESULTS=20`). Every field has a default, so running
//! without any configuration is fine.
//!
//! ```toml
//! [eutils]
//! api_key = "your-ncbi-key"
//! email = "you@example.org"
//!
//! [fetch]
//! max_results = 200
//! max_concurrent_requests = 3
//! requests_per_second = 3.0
//! timeout_secs = 30
//! max_attempts = 1
//!
//! [logging]
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::DEFAULT_MAX_RESULTS;

/// NCBI E-utilities base URL
pub const DEFAULT_EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "get-papers-list.toml";

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "GET_PAPERS";

/// NCBI's request ceiling without an API key
const ANONYMOUS_REQUESTS_PER_SECOND: f32 = 3.0;

/// NCBI's request ceiling with an API key
const KEYED_REQUESTS_PER_SECOND: f32 = 10.0;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// E-utilities endpoint and identification
    #[serde(default)]
    pub eutils: EutilsConfig,

    /// Search and fetch behavior
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Logging defaults
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// E-utilities endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EutilsConfig {
    /// Base URL; `esearch.fcgi` and `efetch.fcgi` are appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// NCBI API key (raises the rate limit)
    #[serde(default = "default_api_key")]
    pub api_key: Option<String>,

    /// Tool name reported to NCBI
    #[serde(default = "default_tool")]
    pub tool: String,

    /// Contact email reported to NCBI
    #[serde(default)]
    pub email: Option<String>,
}

impl Default for EutilsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: default_api_key(),
            tool: default_tool(),
            email: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_EUTILS_BASE_URL.to_string()
}

fn default_api_key() -> Option<String> {
    std::env::var("NCBI_API_KEY").ok().filter(|k| !k.is_empty())
}

fn default_tool() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

/// Search and fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum number of identifiers requested from a search
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Maximum number of detail fetches in flight
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,

    /// Request rate ceiling; derived from the API key when unset
    #[serde(default)]
    pub requests_per_second: Option<f32>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per request; 1 disables retries
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            max_concurrent_requests: default_max_concurrent(),
            requests_per_second: None,
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl FetchConfig {
    /// Rate ceiling to apply, honoring NCBI's limits when not set explicitly
    pub fn effective_requests_per_second(&self, has_api_key: bool) -> f32 {
        match self.requests_per_second {
            Some(rps) if rps > 0.0 => rps,
            _ if has_api_key => KEYED_REQUESTS_PER_SECOND,
            _ => ANONYMOUS_REQUESTS_PER_SECOND,
        }
    }
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_max_concurrent() -> usize {
    3
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    1
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] config::ConfigError),
}

/// Load configuration from an optional file plus environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Find a config file in the working directory or the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("config.toml"))
        .filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Serializes tests that read or write `GET_PAPERS_*` variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.eutils.base_url, DEFAULT_EUTILS_BASE_URL);
        assert_eq!(config.fetch.max_results, 100);
        assert_eq!(config.fetch.max_concurrent_requests, 3);
        assert_eq!(config.fetch.max_attempts, 1);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_effective_requests_per_second() {
        let mut fetch = FetchConfig::default();
        assert_eq!(fetch.effective_requests_per_second(false), 3.0);
        assert_eq!(fetch.effective_requests_per_second(true), 10.0);

        fetch.requests_per_second = Some(1.5);
        assert_eq!(fetch.effective_requests_per_second(true), 1.5);

        fetch.requests_per_second = Some(0.0);
        assert_eq!(fetch.effective_requests_per_second(false), 3.0);
    }

    #[test]
    fn test_load_config_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(
            &path,
            r#"
[eutils]
base_url = "http://localhost:9999/eutils"
email = "analyst@example.org"

[fetch]
max_results = 20
max_concurrent_requests = 5
requests_per_second = 2.0

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.eutils.base_url, "http://localhost:9999/eutils");
        assert_eq!(config.eutils.email.as_deref(), Some("analyst@example.org"));
        assert_eq!(config.eutils.tool, "get-papers-list");
        assert_eq!(config.fetch.max_results, 20);
        assert_eq!(config.fetch.max_concurrent_requests, 5);
        assert_eq!(config.fetch.requests_per_second, Some(2.0));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Some(Path::new("/nonexistent/get-papers-list.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.toml");
        std::fs::write(&path, "invalid = toml = content").unwrap();

        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_env_override() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("GET_PAPERS_FETCH__TIMEOUT_SECS", "7");
        std::env::set_var("GET_PAPERS_EUTILS__EMAIL", "env@example.org");
        let config = load_config(None);
        std::env::remove_var("GET_PAPERS_FETCH__TIMEOUT_SECS");
        std::env::remove_var("GET_PAPERS_EUTILS__EMAIL");

        let config = config.unwrap();
        assert_eq!(config.fetch.timeout_secs, 7);
        assert_eq!(config.eutils.email.as_deref(), Some("env@example.org"));
    }

    #[test]
    fn test_env_overrides_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[fetch]\nmax_results = 20\n").unwrap();

        std::env::set_var("GET_PAPERS_FETCH__MAX_RESULTS", "5");
        let config = load_config(Some(&path));
        std::env::remove_var("GET_PAPERS_FETCH__MAX_RESULTS");

        assert_eq!(config.unwrap().fetch.max_results, 5);
    }
}
