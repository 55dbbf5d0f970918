//! Coordinator configuration

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Coordinator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Capacity both subject sets are pre-sized to
    #[serde(rename = "initial-capacity", default = "default_initial_capacity")]
    pub initial_capacity: usize,

    /// Log duplicate register calls at warn instead of debug
    #[serde(rename = "warn-on-duplicate-register", default)]
    pub warn_on_duplicate_register: bool,
}

fn default_initial_capacity() -> usize {
    debug!("default_initial_capacity: called");
    64
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        debug!("CoordinatorConfig::default: called");
        Self {
            initial_capacity: default_initial_capacity(),
            warn_on_duplicate_register: false,
        }
    }
}
