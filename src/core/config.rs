use super::conversion::BASE_CURRENCY;
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_RATE_SOURCE_URL: &str = "http://www.floatrates.com";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RateSourceConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RateSourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RateSourceConfig {
    fn default() -> Self {
        RateSourceConfig {
            base_url: DEFAULT_RATE_SOURCE_URL.to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen: "0.0.0.0:3000".to_string(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_target_currencies() -> Vec<String> {
    ["EUR", "CHF", "JPY"].iter().map(|c| c.to_string()).collect()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub rate_source: RateSourceConfig,
    #[serde(default = "default_target_currencies")]
    pub target_currencies: Vec<String>,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            rate_source: RateSourceConfig::default(),
            target_currencies: default_target_currencies(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, or the built-in defaults if no file exists there.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file found, using defaults");
            return Self::default().validated();
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "pecan", "pecan")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        let config = config
            .validated()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Normalises currency codes to uppercase and checks the target list.
    pub fn validated(mut self) -> Result<Self> {
        self.target_currencies = self
            .target_currencies
            .iter()
            .map(|c| c.trim().to_uppercase())
            .collect();

        if self.target_currencies.is_empty() {
            bail!("target_currencies must list at least one currency");
        }
        let mut seen = HashSet::new();
        for code in &self.target_currencies {
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                bail!("'{code}' is not a three-letter currency code");
            }
            // USD is always the first entry of a response, so it cannot also be a target
            if code == BASE_CURRENCY {
                bail!("target_currencies must not contain the base currency {BASE_CURRENCY}");
            }
            if !seen.insert(code.clone()) {
                bail!("Duplicate target currency: {code}");
            }
        }
        if self.rate_source.timeout_secs == 0 {
            bail!("rate_source.timeout_secs must be greater than zero");
        }
        // The provider appends its own path
        self.rate_source.base_url = self.rate_source.base_url.trim_end_matches('/').to_string();
        Ok(self)
    }
}
