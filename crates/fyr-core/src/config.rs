//! Engine configuration management.
//!
//! Handles loading, saving, and validating fyr configuration:
//! - API base URL for the beacon authority
//! - Region radius applied to every monitored region
//! - Background sync interval
//! - Notification channel for proximity alerts

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{FyrError, Result};
use crate::events::NEARBY_BEACON_ALERTS_CHANNEL;

/// Environment variable overriding the configured API base URL.
pub const API_BASE_URL_ENV: &str = "FYR_API_BASE_URL";

/// Main engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FyrConfig {
    /// Base URL of the beacon authority (scheme + host).
    pub api_base_url: String,

    /// Radius in meters applied to every monitored region.
    pub region_radius_m: f64,

    /// Minimum interval between background sync ticks, in minutes.
    pub background_interval_minutes: u64,

    /// Notification channel id for proximity alerts.
    pub notification_channel: String,
}

impl Default for FyrConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.fyr.app".to_string(),
            region_radius_m: 100.0,
            background_interval_minutes: 15,
            notification_channel: NEARBY_BEACON_ALERTS_CHANNEL.to_string(),
        }
    }
}

impl FyrConfig {
    /// Load configuration from the default path, falling back to defaults
    /// when no file exists. `FYR_API_BASE_URL` overrides the base URL
    /// either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if
    /// the resulting configuration is invalid.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Same conditions as [`FyrConfig::load`].
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        if let Ok(base) = std::env::var(API_BASE_URL_ENV) {
            config.api_base_url = base;
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path.
    ///
    /// # Errors
    ///
    /// Same conditions as [`FyrConfig::save`].
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate field values.
    ///
    /// # Errors
    ///
    /// Returns [`FyrError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.api_base_url)
            .map_err(|err| FyrError::Config(format!("api_base_url: {err}")))?;

        if self.region_radius_m <= 0.0 {
            return Err(FyrError::Config(
                "region_radius_m: must be positive".to_string(),
            ));
        }

        if self.background_interval_minutes == 0 {
            return Err(FyrError::Config(
                "background_interval_minutes: must be at least 1".to_string(),
            ));
        }

        if self.notification_channel.is_empty() {
            return Err(FyrError::Config(
                "notification_channel: must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the configuration file path.
    fn config_path() -> Result<PathBuf> {
        // On a dedicated host: /etc/fyr/config.toml
        // For development: ~/.config/fyr/config.toml
        #[cfg(target_os = "linux")]
        {
            Ok(PathBuf::from("/etc/fyr/config.toml"))
        }
        #[cfg(not(target_os = "linux"))]
        {
            let dirs = directories::ProjectDirs::from("", "", "fyr").ok_or_else(|| {
                FyrError::Config("cannot determine config directory".to_string())
            })?;
            Ok(dirs.config_dir().join("config.toml"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        FyrConfig::default().validate().unwrap();
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = FyrConfig {
            api_base_url: "https://beacons.example.com".to_string(),
            region_radius_m: 250.0,
            background_interval_minutes: 30,
            notification_channel: "alerts".to_string(),
        };
        config.save_to(&path).unwrap();

        let loaded = FyrConfig::load_from(&path).unwrap();
        assert_eq!(loaded.api_base_url, "https://beacons.example.com");
        assert!((loaded.region_radius_m - 250.0).abs() < f64::EPSILON);
        assert_eq!(loaded.background_interval_minutes, 30);
        assert_eq!(loaded.notification_channel, "alerts");
    }

    #[test]
    fn test_missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = FyrConfig::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(loaded.api_base_url, FyrConfig::default().api_base_url);
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = FyrConfig {
            api_base_url: "not a url".to_string(),
            ..FyrConfig::default()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            FyrError::Config(_)
        ));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let config = FyrConfig {
            background_interval_minutes: 0,
            ..FyrConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_base_url = [").unwrap();

        assert!(matches!(
            FyrConfig::load_from(&path).unwrap_err(),
            FyrError::Config(_)
        ));
    }
}
