use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::KanriError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Environment variable that overrides `api.base_url`.
pub const BASE_URL_ENV: &str = "KANRI_API_BASE_URL";

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub logging: LoggingConfig,
    pub appearance: AppearanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    pub file: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppearanceConfig {
    pub poll_interval_secs: u64,
}

impl AppConfig {
    /// Load config: user file (if exists) over built-in defaults, then the
    /// base URL environment override.
    pub fn load() -> Result<Self, KanriError> {
        let user_path = Self::config_path();
        let mut config = if user_path.exists() {
            let user_str = std::fs::read_to_string(&user_path)?;
            Self::from_toml(&user_str)?
        } else {
            Self::from_toml(DEFAULT_CONFIG)?
        };

        if let Some(base_url) = Self::base_url_override() {
            config.api.base_url = base_url;
        }

        config.validate()?;
        Ok(config)
    }

    /// The non-empty value of the base URL environment variable.
    pub fn base_url_override() -> Option<String> {
        std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
    }

    /// Parse a config from TOML without touching the filesystem.
    pub fn from_toml(source: &str) -> Result<Self, KanriError> {
        toml::from_str(source).map_err(|e| KanriError::Config(e.to_string()))
    }

    /// Reject configs the HTTP client cannot work with.
    pub fn validate(&self) -> Result<(), KanriError> {
        let url = url::Url::parse(&self.api.base_url)
            .map_err(|e| KanriError::Config(format!("invalid api.base_url: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(KanriError::Config(format!(
                "api.base_url must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.appearance.poll_interval_secs == 0 {
            return Err(KanriError::Config(
                "appearance.poll_interval_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Path to the persisted key-value file holding the token and theme.
    pub fn storage_path() -> PathBuf {
        Self::data_dir().join("storage.json")
    }

    /// Directory for log files and persisted state.
    pub fn data_dir() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "kanri")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.logging.filter, "kanri=info");
        assert!(!config.logging.file);
        assert_eq!(config.appearance.poll_interval_secs, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_roundtrip() {
        let config = AppConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized = AppConfig::from_toml(&serialized).unwrap();
        assert_eq!(deserialized.api.base_url, config.api.base_url);
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let mut config = AppConfig::default();
        config.api.base_url = "not a url".into();
        assert!(matches!(config.validate(), Err(KanriError::Config(_))));

        config.api.base_url = "ftp://example.com".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_poll_interval() {
        let mut config = AppConfig::default();
        config.appearance.poll_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_section_is_an_error() {
        let err = AppConfig::from_toml("[api]\nbase_url = \"http://x\"\n").unwrap_err();
        assert!(err.to_string().starts_with("config error"));
    }
}
