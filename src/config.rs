use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_IMAGE_BASE_URL, DEFAULT_QUERY_THROTTLE_MS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SEARCH_RESULT_LIMIT,
};
use crate::core::viewmodels::filters::FilterChainMode;

/// Environment variable that overrides `api.api_key`.
pub const API_KEY_ENV: &str = "MARQUEE_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub lists: ListsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListsConfig {
    /// Minimum spacing between two query evaluations.
    #[serde(default = "default_query_throttle")]
    pub query_throttle_ms: u64,

    #[serde(default = "default_search_result_limit")]
    pub search_result_limit: usize,

    #[serde(default)]
    pub filter_chain: FilterChainMode,
}

impl Config {
    /// Load from the user config directory, writing defaults on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            info!("No config file found, using defaults");
            let config = Config::default();
            config.save_to(&config_path)?;
            config
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
        info!("Config loaded successfully");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).context("Failed to write config file")?;

        debug!("Config saved to {:?}", path);
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("marquee").join("config.toml"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            self.api.apply_key_override(key);
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn apply_key_override(&mut self, key: String) {
        let key = key.trim();
        if !key.is_empty() {
            debug!("Using API key from {}", API_KEY_ENV);
            self.api_key = key.to_string();
        }
    }
}

impl ListsConfig {
    pub fn query_throttle(&self) -> Duration {
        Duration::from_millis(self.query_throttle_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            image_base_url: default_image_base_url(),
            timeout_secs: default_timeout(),
            language: None,
        }
    }
}

impl Default for ListsConfig {
    fn default() -> Self {
        Self {
            query_throttle_ms: default_query_throttle(),
            search_result_limit: default_search_result_limit(),
            filter_chain: FilterChainMode::default(),
        }
    }
}

// Default value functions
fn default_base_url() -> String { DEFAULT_API_BASE_URL.to_string() }
fn default_image_base_url() -> String { DEFAULT_IMAGE_BASE_URL.to_string() }
fn default_timeout() -> u64 { DEFAULT_REQUEST_TIMEOUT_SECS }
fn default_query_throttle() -> u64 { DEFAULT_QUERY_THROTTLE_MS }
fn default_search_result_limit() -> usize { DEFAULT_SEARCH_RESULT_LIMIT }

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[api]\napi_key = \"abc\"\n\n[lists]\nfilter_chain = \"restart_on_empty\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api.api_key, "abc");
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert_eq!(config.lists.filter_chain, FilterChainMode::RestartOnEmpty);
        assert_eq!(config.lists.query_throttle(), Duration::from_millis(1000));
        assert_eq!(config.lists.search_result_limit, 12);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.api.language = Some("en-US".to_string());
        config.lists.search_result_limit = 20;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api.language.as_deref(), Some("en-US"));
        assert_eq!(loaded.lists.search_result_limit, 20);
        assert_eq!(loaded.lists.filter_chain, FilterChainMode::Strict);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[lists\nquery_throttle_ms = ").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_blank_key_override_is_ignored() {
        let mut api = ApiConfig {
            api_key: "from-file".to_string(),
            ..ApiConfig::default()
        };
        api.apply_key_override("   ".to_string());
        assert_eq!(api.api_key, "from-file");
        api.apply_key_override(" from-env ".to_string());
        assert_eq!(api.api_key, "from-env");
    }
}
