use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://v6.exchangerate-api.com";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// exchangerate-api.com API key. Absence is surfaced as a failed fetch,
    /// not a load error, so the rest of the CLI still works.
    pub api_key: Option<String>,
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default = "default_target_currency")]
    pub target_currency: String,
    #[serde(default)]
    pub provider: ProviderConfig,
}

fn default_base_currency() -> String {
    "USD".to_string()
}

fn default_target_currency() -> String {
    "IDR".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_key: None,
            base_currency: default_base_currency(),
            target_currency: default_target_currency(),
            provider: ProviderConfig::default(),
        }
    }
}

// The config is logged at debug level; the key must not reach the logs.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_currency", &self.base_currency)
            .field("target_currency", &self.target_currency)
            .field("provider", &self.provider)
            .finish()
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to built-in
    /// defaults when no file exists there. An API key passed on the command
    /// line is enough to run without a config file.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fxconv", "fxconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
api_key: "abc123"
base_currency: "EUR"
target_currency: "GBP"
provider:
  base_url: "http://example.com/rates"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.base_currency, "EUR");
        assert_eq!(config.target_currency, "GBP");
        assert_eq!(config.provider.base_url, "http://example.com/rates");
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: AppConfig = serde_yaml::from_str("api_key: \"abc123\"").unwrap();
        assert_eq!(config.base_currency, "USD");
        assert_eq!(config.target_currency, "IDR");
        assert_eq!(config.provider.base_url, DEFAULT_PROVIDER_BASE_URL);
    }

    #[test]
    fn test_config_without_api_key() {
        let config: AppConfig = serde_yaml::from_str("base_currency: \"INR\"").unwrap();
        assert!(config.api_key.is_none());
        assert_eq!(config.base_currency, "INR");
    }

    #[test]
    fn test_default_config_values() {
        let config = AppConfig::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.base_currency, "USD");
        assert_eq!(config.target_currency, "IDR");
        assert_eq!(config.provider.base_url, DEFAULT_PROVIDER_BASE_URL);
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = AppConfig::load_from_path("/nonexistent/fxconv-config.yaml");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config: AppConfig = serde_yaml::from_str("api_key: \"super-secret\"").unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
