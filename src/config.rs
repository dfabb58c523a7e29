use crate::constants::{DEFAULT_API_URL, DEFAULT_RANGE_DAYS, DEFAULT_TIMEOUT_SECS, MAX_RANGE_DAYS};
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.yaml";

/// Client settings, read once at startup
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub timeout_secs: u64,
    /// Sent as a bearer token when present
    pub auth_token: Option<String>,
    pub default_range_days: i64,
    /// Where CSV exports land; the user's download directory when unset
    pub export_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            auth_token: None,
            default_range_days: DEFAULT_RANGE_DAYS,
            export_dir: None,
        }
    }
}

impl ClientConfig {
    /// Directory holding the config file (`~/.stockroom`)
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".stockroom")
    }

    /// Load `~/.stockroom/config.yaml`, falling back to defaults when it
    /// does not exist, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_dir().join(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            ClientConfig::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Load a specific file, no environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ClientConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Reject values the client cannot work with
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (0..=MAX_RANGE_DAYS).contains(&self.default_range_days),
            "default_range_days must be between 0 and {}, got {}",
            MAX_RANGE_DAYS,
            self.default_range_days
        );
        Ok(())
    }

    /// `STOCKROOM_API_URL` and `STOCKROOM_TOKEN` win over the file
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("STOCKROOM_API_URL") {
            if !url.is_empty() {
                self.api_base_url = url;
            }
        }
        if let Ok(token) = std::env::var("STOCKROOM_TOKEN") {
            if !token.is_empty() {
                self.auth_token = Some(token);
            }
        }
    }

    /// Export directory, resolved against the platform download folder
    pub fn resolved_export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Write the config back to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "api_base_url: https://inventory.example.com/api\n").unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.api_base_url, "https://inventory.example.com/api");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.default_range_days, DEFAULT_RANGE_DAYS);
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let config = ClientConfig {
            auth_token: Some("abc".into()),
            timeout_secs: 5,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(ClientConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_range_days_out_of_bounds_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        fs::write(&path, "default_range_days: 100000000\n").unwrap();
        let err = ClientConfig::from_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("default_range_days"));

        fs::write(&path, "default_range_days: -5\n").unwrap();
        assert!(ClientConfig::from_file(&path).is_err());

        fs::write(&path, "default_range_days: 0\n").unwrap();
        assert_eq!(ClientConfig::from_file(&path).unwrap().default_range_days, 0);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "timeout_secs: [not, a, number]\n").unwrap();
        assert!(ClientConfig::from_file(&path).is_err());
    }
}
