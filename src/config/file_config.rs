//! Configuration file support.
//!
//! # Configuration File Format
//!
//! ```toml
//! [search]
//! max_results = 200
//!
//! [fetch]
//! max_attempts = 3
//! initial_delay_ms = 500
//! backoff_multiplier = 2.0
//! max_delay_ms = 30000
//! max_concurrent_requests = 8
//! request_timeout_secs = 10
//!
//! [classifier]
//! academic_keywords = ["university", "hospital"]
//! non_academic_keywords = ["inc.", "ltd.", "pharmaceutical"]
//! ```

use std::path::{Path, PathBuf};

use super::Config;

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "pubmed-industry.toml";

/// Locate a configuration file in the usual places
///
/// Checks `./pubmed-industry.toml`, then `<config_dir>/pubmed-industry/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("pubmed-industry").join("config.toml"))
        .filter(|path| path.is_file())
}

impl Config {
    /// Load configuration from a TOML file, without environment overrides
    pub fn load_file(path: &Path) -> Result<Self, ConfigFileError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigFileError::Parse(e.to_string()))
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigFileError> {
        toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        std::fs::write(path, self.to_toml()?).map_err(|e| ConfigFileError::Io(e.to_string()))
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}
