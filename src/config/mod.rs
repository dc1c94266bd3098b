//! Configuration management.

mod file_config;

pub use file_config::{find_config_file, ConfigFileError, CONFIG_FILE_NAME};

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::classify::KeywordSets;
use crate::fetch::default_concurrency;
use crate::models::DEFAULT_MAX_RESULTS;
use crate::utils::{RetryConfig, DEFAULT_REQUEST_TIMEOUT};

/// Environment variable prefix, e.g. `PUBMED_INDUSTRY_FETCH__MAX_ATTEMPTS=5`
pub const ENV_PREFIX: &str = "PUBMED_INDUSTRY";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// Search settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum identifiers requested per search
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

/// Detail-fetch settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Attempts per identifier, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Cap on a single retry delay, in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Fetches in flight at once
    #[serde(default = "default_concurrency")]
    pub max_concurrent_requests: usize,

    /// Per-request HTTP timeout, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_delay_ms: default_max_delay_ms(),
            max_concurrent_requests: default_concurrency(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl FetchConfig {
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts.max(1),
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            backoff_multiplier: self.backoff_multiplier.max(1.0),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_max_attempts() -> u32 {
    RetryConfig::default().max_attempts
}

fn default_initial_delay_ms() -> u64 {
    RetryConfig::default().initial_delay.as_millis() as u64
}

fn default_backoff_multiplier() -> f64 {
    RetryConfig::default().backoff_multiplier
}

fn default_max_delay_ms() -> u64 {
    RetryConfig::default().max_delay.as_millis() as u64
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

/// Keyword overrides for the affiliation classifier
///
/// A missing list keeps the built-in one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub academic_keywords: Option<Vec<String>>,

    #[serde(default)]
    pub non_academic_keywords: Option<Vec<String>>,
}

impl ClassifierConfig {
    pub fn keyword_sets(&self) -> KeywordSets {
        let defaults = KeywordSets::default();
        KeywordSets::new(
            self.academic_keywords
                .clone()
                .unwrap_or(defaults.academic),
            self.non_academic_keywords
                .clone()
                .unwrap_or(defaults.non_academic),
        )
    }
}

/// `PUBMED_INDUSTRY_<SECTION>__<KEY>` variables
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

/// Load configuration from a file, with `PUBMED_INDUSTRY_*` environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(environment())
        .build()?;

    settings.try_deserialize()
}

/// Get the configuration from environment variables and defaults only
pub fn get_config() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(environment())
        .build()?
        .try_deserialize()
}
