//! Configuration storage

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::popup::PopupFeatures;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Integrations backend base URL
    pub backend_url: String,
    /// Provider path segment (`/integrations/{provider}/...`)
    pub provider: String,
    /// Tag written to and matched against integration params `type`
    pub integration_type: String,
    /// Name used in user-facing labels and messages
    pub display_name: String,
    /// Popup closure polling cadence
    pub poll_interval_ms: u64,
    /// HubSpot public API base (contacts listing)
    pub hubspot_api_url: String,
    /// Authorization popup window features
    pub popup: PopupFeatures,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            provider: "hubspot".to_string(),
            integration_type: "HubSpot".to_string(),
            display_name: "HubSpot".to_string(),
            poll_interval_ms: 500,
            hubspot_api_url: "https://api.hubapi.com".to_string(),
            popup: PopupFeatures::default(),
        }
    }
}

impl Config {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "hubspot-connect", "hubspot-connect")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, defaults if the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(path, perms).context("Failed to set config permissions")?;
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("hubspot-connect-test-{}-{}", name, std::process::id()))
            .join("config.toml")
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load_from(&scratch_path("missing")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = scratch_path("partial");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            "backend_url = \"https://integrations.example.com\"\n\n[popup]\nwidth = 800\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.backend_url, "https://integrations.example.com");
        assert_eq!(config.provider, "hubspot");
        assert_eq!(config.popup.width, 800);
        assert_eq!(config.popup.height, 600);
        assert!(config.popup.scrollbars);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_save_and_reload() {
        let path = scratch_path("save");
        let config = Config {
            poll_interval_ms: 250,
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let path = scratch_path("invalid");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "poll_interval_ms = \"fast\"").unwrap();

        assert!(Config::load_from(&path).is_err());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
