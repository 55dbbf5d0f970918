//! Node observer configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::coordinator::CoordinatorConfig;

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = ".node-observer.yml";

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Coordinator settings
    pub coordinator: CoordinatorConfig,
}

impl Config {
    /// Fallback locations, most specific first
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("node-observer").join("node-observer.yml"));
        }
        paths
    }

    /// Load configuration
    ///
    /// An explicit path must load. Otherwise the first readable file from
    /// [`Config::search_paths`] wins, and broken ones are skipped with a
    /// warning.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        debug!(?config_path, "Config::load: called");
        if let Some(path) = config_path {
            return Self::read(path).with_context(|| format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::search_paths().iter().filter(|p| p.exists()) {
            match Self::read(candidate) {
                Ok(config) => return Ok(config),
                Err(e) => warn!(path = %candidate.display(), error = %e, "Config::load: skipping config"),
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Log level to hand to [`setup_logging`](crate::logging::setup_logging)
    pub fn log_level(&self) -> Option<&str> {
        self.log_level.as_deref()
    }
}
