//! Configuration management for finscrape
//!
//! Supports environment variables, a config file, and runtime overrides.
//! Credentials are not part of this config; see [`crate::core::Credentials`].
//!
//! Config file location: ~/.config/finscrape/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::{Result, ScrapeError};

/// Main configuration for finscrape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Browser configuration
    #[serde(default)]
    pub browser: BrowserConfig,
    /// Scrape sequence configuration
    #[serde(default)]
    pub scrape: ScrapeConfig,
}

/// Browser automation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// agent-browser executable
    pub binary: String,
    /// Session name for agent-browser
    pub session_name: String,
    /// Whether to run in headed mode (visible browser)
    pub headed: bool,
    /// Timeout for a single browser command in ms
    pub timeout_ms: u64,
}

/// Settings for the login / scrape / logout sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// `.env` file holding the site credentials
    pub env_file: PathBuf,
    /// Fixed wait between page steps, in seconds
    pub wait_secs: u64,
    /// Attempts for the login sequence
    pub login_attempts: u32,
    /// Attempts for reading balances
    pub data_attempts: u32,
    /// Attempts for logout verification
    pub logout_attempts: u32,
    /// Pause between attempts of a failed stage, in ms
    pub retry_delay_ms: u64,
    /// Delay before closing the browser, in ms
    pub quit_delay_ms: u64,
    /// Wait for Enter before the process exits
    pub pause_on_exit: bool,
}

/// Prefix of the environment variables that configure finscrape
pub const ENV_PREFIX: &str = "FINSCRAPE_";

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            binary: env::var("FINSCRAPE_BROWSER_BIN")
                .unwrap_or_else(|_| "agent-browser".to_string()),
            session_name: env::var("FINSCRAPE_BROWSER_SESSION")
                .unwrap_or_else(|_| "finscrape".to_string()),
            headed: env_flag("FINSCRAPE_BROWSER_HEADED", false),
            timeout_ms: 30000,
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            env_file: PathBuf::from(".env"),
            wait_secs: 3,
            login_attempts: 3,
            data_attempts: 2,
            logout_attempts: 3,
            retry_delay_ms: 0,
            quit_delay_ms: 1000,
            pause_on_exit: env_flag("FINSCRAPE_PAUSE", false),
        }
    }
}

impl ScrapeConfig {
    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.wait_secs)
    }

    /// `None` when stages retry immediately
    pub fn retry_delay(&self) -> Option<Duration> {
        (self.retry_delay_ms > 0).then(|| Duration::from_millis(self.retry_delay_ms))
    }

    pub fn quit_delay(&self) -> Duration {
        Duration::from_millis(self.quit_delay_ms)
    }
}

impl BrowserConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("finscrape")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Export the `FINSCRAPE_*` entries of an env file into the process environment
    ///
    /// Every other key, credentials included, stays out of the environment
    /// so spawned browser processes never inherit it. A missing file is not
    /// an error. Returns the number of variables set.
    pub fn load_env_overrides(path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(0);
        }

        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            ScrapeError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut count = 0;
        for item in iter {
            let (key, value) = item.map_err(|e| {
                ScrapeError::config(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            if key.starts_with(ENV_PREFIX) && env::var_os(&key).is_none() {
                env::set_var(&key, value);
                count += 1;
            }
        }

        Ok(count)
    }

    /// Load configuration from file, falling back to defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Result<Self> {
        if !Self::config_exists() {
            return Ok(Self::default());
        }
        Self::load_from_file()
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(ScrapeError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| ScrapeError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ScrapeError::config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<PathBuf> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| ScrapeError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ScrapeError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| ScrapeError::config(format!("Failed to write config: {}", e)))?;

        Ok(config_path)
    }

    /// Check if a config file exists
    pub fn config_exists() -> bool {
        Self::config_file().exists()
    }

    /// Reject settings the scrape sequence cannot run with
    pub fn validate(&self) -> Result<()> {
        let attempts = [
            ("login_attempts", self.scrape.login_attempts),
            ("data_attempts", self.scrape.data_attempts),
            ("logout_attempts", self.scrape.logout_attempts),
        ];
        for (name, value) in attempts {
            if value == 0 {
                return Err(ScrapeError::config(format!(
                    "scrape.{} must be at least 1",
                    name
                )));
            }
        }

        if self.browser.timeout_ms == 0 {
            return Err(ScrapeError::config("browser.timeout_ms must be positive"));
        }

        if self.browser.session_name.trim().is_empty() {
            return Err(ScrapeError::config("browser.session_name must not be empty"));
        }

        Ok(())
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        toml::to_string_pretty(&Config::default())
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}
