use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf, time::Duration};
use tracing::warn;

use crate::{
    DEFAULT_PROVIDER,
    provider::{
        ProviderRegistry,
        openweathermap::{DEFAULT_TIMEOUT, OpenWeatherMapProvider},
    },
};

/// Endpoint overrides for a single provider. Never holds credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optional default provider id, e.g. "openweathermap".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,

    /// Example TOML:
    /// [providers.openweathermap]
    /// base_url = "https://api.openweathermap.org"
    /// timeout_secs = 10
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Config {
    /// Configured default provider, or the built-in one.
    pub fn default_provider_name(&self) -> &str {
        self.default_provider.as_deref().unwrap_or(DEFAULT_PROVIDER)
    }

    pub fn set_default_provider(&mut self, name: &str) {
        self.default_provider = Some(name.to_lowercase());
    }

    pub fn provider_config(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(&name.to_lowercase())
    }

    pub fn upsert_provider(&mut self, name: &str, cfg: ProviderConfig) {
        self.providers.insert(name.to_lowercase(), cfg);
    }

    /// Build the provider registry, applying any endpoint overrides.
    pub fn provider_registry(&self) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry.register(self.openweathermap());

        for name in self.providers.keys() {
            if !registry.contains(name) {
                warn!(provider = %name, "ignoring configuration for unknown provider");
            }
        }

        registry
    }

    fn openweathermap(&self) -> OpenWeatherMapProvider {
        let mut owm = OpenWeatherMapProvider::new();
        let Some(cfg) = self.provider_config("openweathermap") else {
            return owm;
        };

        if let Some(base_url) = &cfg.base_url {
            owm = owm.with_base_url(base_url);
        }
        match cfg.timeout_secs {
            Some(0) => warn!(provider = "openweathermap", "ignoring timeout_secs = 0, keeping default"),
            Some(secs) => owm = owm.with_timeout(Duration::from_secs(secs)),
            None => {}
        }
        owm
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-tool", "weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_provider_falls_back_to_builtin() {
        let cfg = Config::default();
        assert_eq!(cfg.default_provider_name(), "openweathermap");
    }

    #[test]
    fn set_default_provider_lowercases() {
        let mut cfg = Config::default();
        cfg.set_default_provider("OpenWeatherMap");
        assert_eq!(cfg.default_provider_name(), "openweathermap");
    }

    #[test]
    fn parses_overrides_from_toml() {
        let cfg: Config = toml::from_str(
            r#"
            default_provider = "openweathermap"

            [providers.openweathermap]
            base_url = "http://localhost:9999"
            timeout_secs = 3
            "#,
        )
        .unwrap();

        let owm = cfg.provider_config("OPENWEATHERMAP").unwrap();
        assert_eq!(owm.base_url.as_deref(), Some("http://localhost:9999"));
        assert_eq!(owm.timeout_secs, Some(3));
    }

    #[test]
    fn empty_toml_is_a_default_config() {
        let cfg: Config = toml::from_str("").unwrap();
        assert!(cfg.default_provider.is_none());
        assert!(cfg.providers.is_empty());
    }

    #[test]
    fn timeout_override_is_applied() {
        let mut cfg = Config::default();
        cfg.upsert_provider(
            "openweathermap",
            ProviderConfig { base_url: Some("http://localhost:9999/".into()), timeout_secs: Some(3) },
        );

        let owm = cfg.openweathermap();
        assert_eq!(owm.timeout(), Duration::from_secs(3));
        assert_eq!(owm.endpoint(), "http://localhost:9999/data/2.5/weather");
    }

    #[test]
    fn zero_timeout_keeps_the_default() {
        let mut cfg = Config::default();
        cfg.upsert_provider(
            "openweathermap",
            ProviderConfig { base_url: None, timeout_secs: Some(0) },
        );

        assert_eq!(cfg.openweathermap().timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn registry_ignores_unknown_provider_sections() {
        let mut cfg = Config::default();
        cfg.upsert_provider("weatherapi", ProviderConfig::default());

        let registry = cfg.provider_registry();
        assert_eq!(registry.names(), vec!["openweathermap"]);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let path = std::env::temp_dir()
            .join(format!("weather-tool-config-{}", std::process::id()))
            .join("config.toml");

        let mut cfg = Config::default();
        cfg.set_default_provider("openweathermap");
        cfg.upsert_provider(
            "openweathermap",
            ProviderConfig {
                base_url: Some("http://localhost:1234".into()),
                timeout_secs: None,
            },
        );
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.default_provider.as_deref(), Some("openweathermap"));
        assert_eq!(loaded.provider_config("openweathermap"), cfg.provider_config("openweathermap"));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let path = std::env::temp_dir().join("weather-tool-does-not-exist/config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(cfg.providers.is_empty());
    }
}
