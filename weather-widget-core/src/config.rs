use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{error::MountError, model::Coordinates};

/// Environment variable that takes precedence over the key in the config file.
pub const API_KEY_ENV: &str = "WEATHER_WIDGET_API_KEY";

/// Widget configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// request_timeout_secs = 15
///
/// [home]
/// latitude = 52.52
/// longitude = 13.405
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// OpenWeather API key. The widget refuses to start without one.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Override for the provider endpoint root, mostly for testing against a local server.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Unset means weather requests may hang indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Directory for the persisted city list; defaults to the platform data dir.
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,

    /// Where "current location" resolves to when the host has no live position source.
    #[serde(default)]
    pub home: Option<Coordinates>,
}

impl Config {
    /// The usable API key, or the mount error the embedder must report.
    pub fn api_key(&self) -> Result<&str, MountError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(MountError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    /// Replace the stored key with `api_key` when one is given and non-blank.
    pub fn override_api_key(&mut self, api_key: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.set_api_key(key);
        }
    }

    /// Apply [`API_KEY_ENV`] if it is set.
    pub fn with_env_overrides(mut self) -> Self {
        self.override_api_key(std::env::var(API_KEY_ENV).ok());
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.filter(|s| *s > 0).map(Duration::from_secs)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
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
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding the persisted city list.
    pub fn storage_dir(&self) -> Result<PathBuf> {
        match &self.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.data_dir().to_path_buf()),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weather-widget", "weather-widget")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_a_mount_error() {
        let cfg = Config::default();
        assert!(matches!(cfg.api_key(), Err(MountError::MissingApiKey)));

        let cfg = Config { api_key: Some("   ".into()), ..Config::default() };
        assert!(matches!(cfg.api_key(), Err(MountError::MissingApiKey)));
    }

    #[test]
    fn api_key_is_trimmed() {
        let mut cfg = Config::default();
        cfg.set_api_key("  KEY \n".into());
        assert_eq!(cfg.api_key().expect("key present"), "KEY");
    }

    #[test]
    fn override_ignores_blank_values() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        cfg.override_api_key(Some("".into()));
        cfg.override_api_key(None);
        assert_eq!(cfg.api_key().unwrap(), "FILE_KEY");

        cfg.override_api_key(Some("FLAG_KEY".into()));
        assert_eq!(cfg.api_key().unwrap(), "FLAG_KEY");
    }

    #[test]
    fn zero_timeout_means_none() {
        let cfg = Config { request_timeout_secs: Some(0), ..Config::default() };
        assert_eq!(cfg.request_timeout(), None);

        let cfg = Config { request_timeout_secs: Some(15), ..Config::default() };
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("config.toml");

        let cfg = Config {
            api_key: Some("KEY".into()),
            home: Some(Coordinates::new(52.52, 13.405)),
            ..Config::default()
        };
        cfg.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_from_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn explicit_storage_dir_wins() {
        let cfg = Config { storage_dir: Some(PathBuf::from("/tmp/w")), ..Config::default() };
        assert_eq!(cfg.storage_dir().unwrap(), PathBuf::from("/tmp/w"));
    }
}
