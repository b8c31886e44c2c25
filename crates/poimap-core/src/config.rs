//! Application configuration management.
//!
//! This module handles loading the configuration: the POI API base URL, the
//! mapping-provider API key used by the rendering layer, and tuning knobs for
//! request timeout, debounce window and cache TTL.
//!
//! Configuration is read from `~/.config/poimap/config.json` (platform config
//! dir) and then overridden by the `POIMAP_API_BASE_URL` and
//! `POIMAP_MAPS_API_KEY` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::client::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::cache::CACHE_TTL_MINUTES;
use crate::tracker::DEFAULT_DEBOUNCE_MS;

/// Application name used for config directory paths
const APP_NAME: &str = "poimap";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding `api_base_url`
pub const ENV_API_BASE_URL: &str = "POIMAP_API_BASE_URL";

/// Environment variable overriding `maps_api_key`
pub const ENV_MAPS_API_KEY: &str = "POIMAP_MAPS_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub maps_api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub debounce_ms: u64,
    pub cache_ttl_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: None,
            maps_api_key: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            cache_ttl_minutes: CACHE_TTL_MINUTES,
        }
    }
}

impl Config {
    /// Load from the default config file, then apply environment overrides.
    pub fn load() -> Result<Self> {
        Ok(Self::load_from(&Self::config_path()?)?.with_env_overrides())
    }

    /// Apply `POIMAP_API_BASE_URL` and `POIMAP_MAPS_API_KEY` if set.
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(
            std::env::var(ENV_API_BASE_URL).ok(),
            std::env::var(ENV_MAPS_API_KEY).ok(),
        );
        self
    }

    /// Load a config file, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            debug!(path = %path.display(), "Config loaded");
            Ok(config)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Apply environment overrides; blank values are ignored.
    pub fn apply_overrides(&mut self, api_base_url: Option<String>, maps_api_key: Option<String>) {
        if let Some(url) = api_base_url.filter(|v| !v.trim().is_empty()) {
            self.api_base_url = Some(url);
        }
        if let Some(key) = maps_api_key.filter(|v| !v.trim().is_empty()) {
            self.maps_api_key = Some(key);
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Base URL without a trailing slash. Required by the core.
    pub fn api_base_url(&self) -> Result<String> {
        self.api_base_url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                anyhow::anyhow!("API base URL is not configured (set {})", ENV_API_BASE_URL)
            })
    }

    /// The maps API key. Its absence is fatal for the rendering layer only.
    pub fn require_maps_api_key(&self) -> Result<&str> {
        self.maps_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Maps API key is not configured (set {})",
                    ENV_MAPS_API_KEY
                )
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.cache_ttl_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert_eq!(config.cache_ttl(), chrono::Duration::hours(1));
        assert!(config.api_base_url().is_err());
        assert!(config.require_maps_api_key().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("poimap-test-missing").join(CONFIG_FILE);
        let config = Config::load_from(&path).expect("defaults");
        assert_eq!(config.debounce_ms, DEFAULT_DEBOUNCE_MS);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let json = r#"{"api_base_url": "https://pois.example.com/api/", "debounce_ms": 250}"#;
        let config: Config = serde_json::from_str(json).expect("Failed to parse config test JSON");
        assert_eq!(config.api_base_url().expect("url"), "https://pois.example.com/api");
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.cache_ttl_minutes, CACHE_TTL_MINUTES);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config {
            api_base_url: Some("https://file.example.com".to_string()),
            ..Config::default()
        };
        config.apply_overrides(Some("https://env.example.com".to_string()), Some("key-123".to_string()));
        assert_eq!(config.api_base_url().expect("url"), "https://env.example.com");
        assert_eq!(config.require_maps_api_key().expect("key"), "key-123");

        // Blank overrides leave existing values alone
        config.apply_overrides(Some("  ".to_string()), None);
        assert_eq!(config.api_base_url().expect("url"), "https://env.example.com");
    }
}
