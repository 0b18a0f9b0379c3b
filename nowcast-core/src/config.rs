use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{model::TemperatureUnit, query::DEFAULT_BASE_URL};

/// Environment variable that overrides the API key from the config file.
pub const API_KEY_ENV: &str = "WEATHERAPI_KEY";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationMode {
    /// Look the position up from the public IP address.
    #[default]
    Ip,
    /// Use `latitude`/`longitude` from this file.
    Fixed,
    Disabled,
}

impl LocationMode {
    pub const fn all() -> &'static [LocationMode] {
        &[LocationMode::Ip, LocationMode::Fixed, LocationMode::Disabled]
    }
}

impl std::fmt::Display for LocationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LocationMode::Ip => "ip",
            LocationMode::Fixed => "fixed",
            LocationMode::Disabled => "disabled",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub mode: LocationMode,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// unit = "fahrenheit"
///
/// [location]
/// mode = "fixed"
/// latitude = 51.5
/// longitude = -0.12
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,

    /// Override for the WeatherAPI.com base, mostly for testing.
    pub base_url: Option<String>,

    #[serde(default)]
    pub unit: TemperatureUnit,

    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub location: LocationConfig,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
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
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
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

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "nowcast", "nowcast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// API key from the environment, falling back to the file.
    pub fn api_key(&self) -> Result<String> {
        self.api_key_with(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::api_key`] with an injectable environment lookup.
    pub fn api_key_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<String> {
        env(API_KEY_ENV)
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|key| !key.trim().is_empty()))
            .map(|key| key.trim().to_string())
            .ok_or_else(|| {
                anyhow!(
                    "No WeatherAPI.com API key configured.\n\
                     Hint: set {API_KEY_ENV} or run `nowcast configure` and enter your API key."
                )
            })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Request timeout; never shorter than one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS).max(1))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        let trimmed = api_key.trim();
        self.api_key = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    pub fn set_fixed_location(&mut self, latitude: f64, longitude: f64) {
        self.location = LocationConfig {
            mode: LocationMode::Fixed,
            latitude: Some(latitude),
            longitude: Some(longitude),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key_with(no_env).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No WeatherAPI.com API key configured"));
        assert!(msg.contains("Hint: set WEATHERAPI_KEY"));
    }

    #[test]
    fn api_key_from_file() {
        let mut cfg = Config::default();
        cfg.set_api_key("  FILE_KEY ".into());

        assert_eq!(cfg.api_key_with(no_env).unwrap(), "FILE_KEY");
    }

    #[test]
    fn environment_overrides_file_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        let key = cfg
            .api_key_with(|name| (name == API_KEY_ENV).then(|| "ENV_KEY".to_string()))
            .unwrap();
        assert_eq!(key, "ENV_KEY");
    }

    #[test]
    fn blank_environment_value_is_ignored() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        let key = cfg.api_key_with(|_| Some("   ".to_string())).unwrap();
        assert_eq!(key, "FILE_KEY");
    }

    #[test]
    fn blank_key_clears_setting() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.set_api_key("".into());

        assert_eq!(cfg.api_key, None);
    }

    #[test]
    fn defaults_apply_to_empty_file() {
        let cfg: Config = toml::from_str("").unwrap();

        assert_eq!(cfg.unit, TemperatureUnit::Celsius);
        assert_eq!(cfg.location.mode, LocationMode::Ip);
        assert_eq!(cfg.base_url(), DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn parses_full_file() {
        let cfg: Config = toml::from_str(
            r#"
            api_key = "abc"
            base_url = "http://localhost:9000/v1/"
            unit = "fahrenheit"
            timeout_secs = 3

            [location]
            mode = "fixed"
            latitude = 51.5
            longitude = -0.12
            "#,
        )
        .unwrap();

        assert_eq!(cfg.api_key.as_deref(), Some("abc"));
        assert_eq!(cfg.base_url(), "http://localhost:9000/v1/");
        assert_eq!(cfg.unit, TemperatureUnit::Fahrenheit);
        assert_eq!(cfg.timeout(), Duration::from_secs(3));
        assert_eq!(cfg.location.mode, LocationMode::Fixed);
        assert_eq!(cfg.location.latitude, Some(51.5));
        assert_eq!(cfg.location.longitude, Some(-0.12));
    }

    #[test]
    fn zero_timeout_is_raised_to_one_second() {
        let cfg: Config = toml::from_str("timeout_secs = 0").unwrap();
        assert_eq!(cfg.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.unit = TemperatureUnit::Fahrenheit;
        cfg.set_fixed_location(40.7, -74.0);
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "unit = 42").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
