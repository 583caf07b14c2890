use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    net::IpAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::blocker::{AppIdentifiers, AppTable};
use crate::hosts::{default_hosts_path, DEFAULT_REDIRECT_IP};
use focusmode_storage::history::DEFAULT_HISTORY_FILE;

/// Seconds between two watchdog passes
pub const DEFAULT_WATCHDOG_INTERVAL_SECS: u64 = 10;

/// Get the local data directory for focusmode.
///
/// # Errors
///
/// Returns an error if the local data directory cannot be determined.
pub fn get_data_dir() -> Result<PathBuf> {
    let mut path =
        dirs::data_local_dir().ok_or_else(|| anyhow::anyhow!("Failed to get local data dir"))?;
    path.push("focusmode");
    Ok(path)
}

/// Location of the optional configuration file
///
/// # Errors
///
/// Returns an error if the local data directory cannot be determined.
pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("config.toml"))
}

/// Runtime settings, read from `config.toml` when present
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FocusConfig {
    pub watchdog_interval_secs: u64,
    pub history_file: PathBuf,
    pub hosts_file: PathBuf,
    pub redirect_ip: String,
    /// Extra or overriding app identifiers, keyed by app name
    pub apps: BTreeMap<String, AppIdentifiers>,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            watchdog_interval_secs: DEFAULT_WATCHDOG_INTERVAL_SECS,
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
            hosts_file: default_hosts_path(),
            redirect_ip: DEFAULT_REDIRECT_IP.to_string(),
            apps: BTreeMap::new(),
        }
    }
}

impl FocusConfig {
    /// Load the configuration.
    ///
    /// An explicit path must exist. Without one the default location is used
    /// if present, otherwise built-in defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Ok(path) if path.exists() => path,
                _ => {
                    log::debug!("No config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// Returns an error on malformed TOML or out-of-range values
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.watchdog_interval_secs == 0 {
            anyhow::bail!("watchdog_interval_secs must be at least 1");
        }
        self.redirect_ip
            .parse::<IpAddr>()
            .with_context(|| format!("redirect_ip is not an IP address: {}", self.redirect_ip))?;
        Ok(())
    }

    #[must_use]
    pub fn watchdog_interval(&self) -> Duration {
        Duration::from_secs(self.watchdog_interval_secs)
    }

    #[must_use]
    pub fn app_table(&self) -> AppTable {
        AppTable::with_overrides(&self.apps)
    }
}
