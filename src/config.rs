//! Application configuration management.
//!
//! Persistent settings for the wavebridge CLI: how fast the segment-end poll
//! runs, which log level the binary starts with, and an optional log file.
//! Configuration is stored in the user's config directory (typically
//! ~/.config/wavebridge/config.toml); a missing file means defaults.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<String>,
}

fn default_poll_interval_ms() -> u64 {
    crate::constants::SEGMENT_POLL_INTERVAL.as_millis() as u64
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            log_level: default_log_level(),
            log_file: None,
        }
    }

    pub fn config_dir() -> Result<PathBuf, Box<dyn Error>> {
        // Check for XDG_CONFIG_HOME first (useful for testing)
        let config_dir = if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config).join("wavebridge")
        } else {
            dirs::config_dir()
                .ok_or("Unable to find config directory")?
                .join("wavebridge")
        };
        Ok(config_dir)
    }

    pub fn config_path() -> Result<PathBuf, Box<dyn Error>> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self, Box<dyn Error>> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            // Return default config instead of error
            return Ok(Default::default());
        }

        let contents = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), Box<dyn Error>> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        let config_path = Self::config_path()?;
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(&config_path, toml_string)?;

        Ok(())
    }

    pub fn exists() -> Result<bool, Box<dyn Error>> {
        Ok(Self::config_path()?.exists())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        match key {
            "poll_interval_ms" => {
                let parsed: u64 = value
                    .parse()
                    .map_err(|_| format!("poll_interval_ms must be a number, got '{value}'"))?;
                if parsed == 0 {
                    return Err("poll_interval_ms must be greater than zero".into());
                }
                self.poll_interval_ms = parsed;
            }
            "log_level" => {
                if !["off", "error", "warn", "info", "debug", "trace"].contains(&value) {
                    return Err(format!("unknown log level '{value}'").into());
                }
                self.log_level = value.to_string();
            }
            "log_file" => {
                self.log_file = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            _ => return Err(format!("unknown configuration key '{key}'").into()),
        }
        Ok(())
    }
}
