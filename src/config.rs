//! Configuration management for the wenku8 client.
//!
//! Handles loading, saving, and validating configuration from the
//! platform-specific config directory.

use crate::error::ConfigError;
use crate::lang::{Lang, LoginValidity};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application name used for config directory.
const APP_NAME: &str = "Wenku8";

/// Default config filename.
const CONFIG_FILENAME: &str = "config.toml";

/// Browser user agent sent with every request.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site addresses and language.
    pub site: SiteConfig,

    /// Login credentials.
    pub account: AccountConfig,

    /// HTTP client behavior.
    pub client: ClientConfig,
}

/// Site addresses and language.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL of the site.
    pub endpoint: String,

    /// Base URL of the cover image host.
    pub image_host: String,

    /// Page language used when none is given.
    pub lang: Lang,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.wenku8.net".to_string(),
            image_host: "https://img.wenku8.com".to_string(),
            lang: Lang::default(),
        }
    }
}

/// Login credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub username: String,
    pub password: String,

    /// How long the site keeps the login alive.
    pub validity: LoginValidity,
}

impl AccountConfig {
    /// Checks that both username and password are filled in.
    pub fn is_configured(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

/// HTTP client behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Minimum seconds between the end of one search and the next.
    pub search_cooldown_sec: f64,

    /// Request timeout in seconds.
    pub timeout_sec: u64,

    /// User agent header.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            search_cooldown_sec: 5.0,
            timeout_sec: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Negative and NaN values mean no cooldown; values too large for a
    /// `Duration` saturate.
    pub fn search_cooldown(&self) -> Duration {
        Duration::try_from_secs_f64(self.search_cooldown_sec.max(0.0)).unwrap_or(Duration::MAX)
    }
}

impl Config {
    /// Returns the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the full path to the config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILENAME))
    }

    /// Loads configuration from the default location.
    ///
    /// If the config file doesn't exist, creates a default one.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("site.endpoint", &self.site.endpoint),
            ("site.image_host", &self.site.image_host),
        ] {
            url::Url::parse(value).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        }

        if self.client.timeout_sec == 0 {
            return Err(ConfigError::InvalidValue {
                key: "client.timeout_sec".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        Duration::try_from_secs_f64(self.client.search_cooldown_sec).map_err(|e| {
            ConfigError::InvalidValue {
                key: "client.search_cooldown_sec".to_string(),
                message: format!("must be a non-negative number of seconds ({e})"),
            }
        })?;

        Ok(())
    }

    /// Validates the configuration and requires login credentials.
    pub fn validate_with_account(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if !self.account.is_configured() {
            return Err(ConfigError::MissingValue(
                "account.username / account.password (set them in the config file)".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.account.is_configured());
        assert_eq!(config.site.lang, Lang::ZhCn);
        assert_eq!(config.client.search_cooldown(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
        assert!(config.validate_with_account().is_err());
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = Config::default();
        config.site.lang = Lang::ZhTw;
        config.account.username = "reader".to_string();
        config.account.validity = LoginValidity::OneMonth;
        let file = NamedTempFile::new().unwrap();

        config.save_to(file.path()).unwrap();

        let loaded = Config::load_from(file.path()).unwrap();
        assert_eq!(loaded.site.lang, Lang::ZhTw);
        assert_eq!(loaded.account.username, "reader");
        assert_eq!(loaded.account.validity, LoginValidity::OneMonth);
    }

    #[test]
    fn test_missing_file_creates_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILENAME);

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.site.endpoint, "https://www.wenku8.net");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[site]\nlang = \"zh_TW\"\n").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.site.lang, Lang::ZhTw);
        assert_eq!(config.client.timeout_sec, 30);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.client.timeout_sec = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.client.search_cooldown_sec = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.site.endpoint = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_cooldown_is_rejected_not_panicking() {
        let mut config = Config::default();
        config.client.search_cooldown_sec = 1e20;
        assert!(config.validate().is_err());
        assert_eq!(config.client.search_cooldown(), Duration::MAX);

        config.client.search_cooldown_sec = f64::NAN;
        assert!(config.validate().is_err());
        assert_eq!(config.client.search_cooldown(), Duration::ZERO);
    }
}
