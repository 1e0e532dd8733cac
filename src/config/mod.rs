//! Runtime configuration
//!
//! Settings for the runtime host and logging, layered from defaults, an
//! optional TOML file and `DATAFLOW__*` environment variables.

mod facade;
mod sources;

pub use facade::ConfigLoader;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub(crate) const DEFAULT_QUEUE_CAPACITY: usize = 10;
pub(crate) const DEFAULT_SETTLE_TIMEOUT_MS: u64 = 5000;

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_settle_timeout_ms() -> u64 {
    DEFAULT_SETTLE_TIMEOUT_MS
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataflowConfig {
    /// Queue capacity of each parallel agent built from an agent definition
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// How long to wait for a cascade of publishes to settle (milliseconds)
    #[serde(default = "default_settle_timeout_ms")]
    pub settle_timeout_ms: u64,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DataflowConfig {
    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }
}

impl Default for DataflowConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            settle_timeout_ms: default_settle_timeout_ms(),
            logging: LoggingConfig::default(),
        }
    }
}
