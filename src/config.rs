use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::form::DEFAULT_TOAST_DURATION;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
pub const SERVER_URL_ENV: &str = "BDDGEN_SERVER_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub server_url: Option<String>,
    pub download_dir: Option<PathBuf>,
    pub toast_millis: Option<u64>,
}

/// Values the app runs with after applying flags, environment and config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub download_dir: PathBuf,
    pub toast_duration: Duration,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    pub fn save_server_url(url: &str) -> Result<PathBuf> {
        let path = Self::get_config_path()?;
        let mut config = Self::load_from(&path).unwrap_or_else(|_| Self::new());
        config.server_url = Some(url.to_string());
        config.save_to(&path)?;
        Ok(path)
    }

    /// Resolve settings. Precedence: CLI flag, then environment, then file, then defaults.
    pub fn resolve(&self, cli_server: Option<&str>, env_server: Option<&str>) -> Settings {
        let server_url = cli_server
            .or(env_server)
            .or(self.server_url.as_deref())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SERVER_URL)
            .to_string();

        let download_dir = self
            .download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let toast_duration = self
            .toast_millis
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TOAST_DURATION);

        Settings {
            server_url,
            download_dir,
            toast_duration,
        }
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("bddgen").join("config.json"))
    }
}
