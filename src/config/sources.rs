//! Configuration sources and their precedence.
//!
//! Defaults (lowest) -> optional file -> `DATAFLOW` environment (highest).

use super::{DEFAULT_QUEUE_CAPACITY, DEFAULT_SETTLE_TIMEOUT_MS};
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File};
use std::path::Path;

/// Builder seeded with the scalar defaults.
pub(super) fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("queue_capacity", DEFAULT_QUEUE_CAPACITY as i64)?
        .set_default("settle_timeout_ms", DEFAULT_SETTLE_TIMEOUT_MS as i64)
}

/// Add a configuration file; its format follows the extension.
pub(super) fn add_file(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
    required: bool,
) -> ConfigBuilder<DefaultState> {
    builder.add_source(File::from(path).required(required))
}

/// Environment overlay: `DATAFLOW__QUEUE_CAPACITY`, `DATAFLOW__LOGGING__LEVEL`, ...
pub(super) fn add_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("DATAFLOW")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
