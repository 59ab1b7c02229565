use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{NewsError, Result};

/// Default location of the saved-article archive, relative to the working directory.
pub const DEFAULT_ARCHIVE_FILE: &str = "saved_articles.json";

/// Default news API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Static key sent with every news API request
    pub api_key: Option<String>,

    /// Base URL of the news API, without a trailing slash
    pub base_url: String,

    /// JSON file holding the saved articles
    pub archive_path: PathBuf,

    /// Country used for headlines when none is given
    pub default_country: String,

    /// Per-request timeout in seconds, 0 disables it
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            archive_path: PathBuf::from(DEFAULT_ARCHIVE_FILE),
            default_country: "tr".to_string(),
            request_timeout_secs: 0,
        }
    }
}

impl Config {
    /// Loads configuration from an explicit file, or from the platform config
    /// directory when that file exists, falling back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(NewsError::ConfigError {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Config::default())
            }
        }
    }

    /// Reads a JSON config file. Missing keys take their default values.
    pub fn from_file(path: &Path) -> Result<Config> {
        info!("Loading config from {}", path.display());
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| NewsError::ConfigError {
            message: format!("invalid config file {}: {}", path.display(), e),
        })
    }

    /// `config.json` inside the platform-specific config directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "newsarchive").map(|dirs| dirs.config_dir().join("config.json"))
    }

    // Remote subcommands cannot run without a key
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(NewsError::ConfigError {
                message: "no API key configured (use --api-key or NEWS_API_KEY)".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "api_key": "abc", "default_country": "us" }"#).unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.default_country, "us");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.archive_path, PathBuf::from(DEFAULT_ARCHIVE_FILE));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(dir.path().join("nope.json").as_path())).unwrap_err();
        assert!(matches!(err, NewsError::ConfigError { .. }));
    }

    #[test]
    fn blank_api_key_is_rejected() {
        let config = Config {
            api_key: Some("  ".to_string()),
            ..Config::default()
        };
        assert!(config.require_api_key().is_err());
    }
}
