//! Configuration Management
//!
//! Handles persistent configuration storage for isctl and resolves the
//! effective settings from flags, environment and the config file.

use crate::bulk::DEFAULT_DEADLINE;
use crate::error::{Error, Result};
use crate::intersight::client::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_KEY_ID: &str = "INTERSIGHT_API_KEY_ID";
pub const ENV_SECRET_KEY_FILE: &str = "INTERSIGHT_SECRET_KEY_FILE";
pub const ENV_BASE_URL: &str = "INTERSIGHT_BASE_URL";

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api_key_id: Option<String>,
    #[serde(default)]
    pub secret_key_file: Option<PathBuf>,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Mutation requests in flight at once
    #[serde(default)]
    pub concurrency: Option<usize>,
    /// Bound on a bulk mutation phase, in seconds
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

/// Settings after precedence has been applied
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_key_id: String,
    pub secret_key_file: PathBuf,
    pub base_url: String,
    pub concurrency: usize,
    pub deadline: Duration,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_key_id: Option<String>,
    pub secret_key_file: Option<PathBuf>,
    pub base_url: Option<String>,
    pub concurrency: Option<usize>,
    pub deadline_secs: Option<u64>,
}

impl From<Overrides> for Config {
    fn from(overrides: Overrides) -> Self {
        Self {
            api_key_id: overrides.api_key_id,
            secret_key_file: overrides.secret_key_file,
            base_url: overrides.base_url,
            concurrency: overrides.concurrency,
            deadline_secs: overrides.deadline_secs,
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("isctl").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`; a missing or unreadable file yields defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unparseable config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Merge set values of `other` over this config
    pub fn update(&mut self, other: Config) {
        if other.api_key_id.is_some() {
            self.api_key_id = other.api_key_id;
        }
        if other.secret_key_file.is_some() {
            self.secret_key_file = other.secret_key_file;
        }
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.concurrency.is_some() {
            self.concurrency = other.concurrency;
        }
        if other.deadline_secs.is_some() {
            self.deadline_secs = other.deadline_secs;
        }
    }

    /// Resolve settings (CLI > environment > config > default), reading the
    /// process environment
    pub fn resolve(&self, overrides: Overrides) -> Result<Settings> {
        self.resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve settings with an explicit environment lookup
    pub fn resolve_with(
        &self,
        overrides: Overrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Settings> {
        let api_key_id = overrides
            .api_key_id
            .or_else(|| env(ENV_API_KEY_ID))
            .or_else(|| self.api_key_id.clone())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "no API key id configured. Use --api-key-id or set {}",
                    ENV_API_KEY_ID
                ))
            })?;

        let secret_key_file = overrides
            .secret_key_file
            .or_else(|| env(ENV_SECRET_KEY_FILE).map(PathBuf::from))
            .or_else(|| self.secret_key_file.clone())
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "no secret key file configured. Use --secret-key-file or set {}",
                    ENV_SECRET_KEY_FILE
                ))
            })?;

        let base_url = overrides
            .base_url
            .or_else(|| env(ENV_BASE_URL))
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let concurrency = overrides.concurrency.or(self.concurrency).unwrap_or(1);
        if concurrency == 0 {
            return Err(Error::Configuration(
                "concurrency must be at least 1".to_string(),
            ));
        }

        let deadline = overrides
            .deadline_secs
            .or(self.deadline_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_DEADLINE);

        Ok(Settings {
            api_key_id,
            secret_key_file,
            base_url,
            concurrency,
            deadline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn file_config() -> Config {
        Config {
            api_key_id: Some("file-key".into()),
            secret_key_file: Some(PathBuf::from("/etc/isctl/key.pem")),
            base_url: None,
            concurrency: Some(4),
            deadline_secs: None,
        }
    }

    #[test]
    fn test_defaults_apply() {
        let settings = file_config().resolve_with(Overrides::default(), no_env).unwrap();
        assert_eq!(settings.api_key_id, "file-key");
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.concurrency, 4);
        assert_eq!(settings.deadline, DEFAULT_DEADLINE);
    }

    #[test]
    fn test_cli_beats_env_beats_file() {
        let env = |key: &str| match key {
            ENV_API_KEY_ID => Some("env-key".to_string()),
            ENV_BASE_URL => Some("http://env.example/api/v1".to_string()),
            _ => None,
        };

        let settings = file_config().resolve_with(Overrides::default(), env).unwrap();
        assert_eq!(settings.api_key_id, "env-key");
        assert_eq!(settings.base_url, "http://env.example/api/v1");

        let overrides = Overrides {
            api_key_id: Some("cli-key".into()),
            ..Default::default()
        };
        let settings = file_config().resolve_with(overrides, env).unwrap();
        assert_eq!(settings.api_key_id, "cli-key");
    }

    #[test]
    fn test_missing_key_id_is_configuration_error() {
        let err = Config::default()
            .resolve_with(Overrides::default(), no_env)
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains(ENV_API_KEY_ID)));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let overrides = Overrides {
            concurrency: Some(0),
            ..Default::default()
        };
        assert!(file_config().resolve_with(overrides, no_env).is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = file_config();
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_unparseable_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_update_only_overwrites_set_values() {
        let mut config = file_config();
        config.update(Config {
            base_url: Some("http://localhost/api/v1".into()),
            ..Default::default()
        });
        assert_eq!(config.api_key_id.as_deref(), Some("file-key"));
        assert_eq!(config.base_url.as_deref(), Some("http://localhost/api/v1"));
    }
}
