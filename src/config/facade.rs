//! ConfigLoader facade over the layered sources.

use super::sources;
use super::DataflowConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults plus environment, and `path` when given (must exist).
    pub fn load(path: Option<&Path>) -> Result<DataflowConfig, ConfigError> {
        let mut builder = sources::builder_with_defaults()?;
        if let Some(path) = path {
            builder = sources::add_file(builder, path, true);
        }
        let builder = sources::add_environment(builder);

        builder.build()?.try_deserialize()
    }

    /// Load from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<DataflowConfig, ConfigError> {
        Self::load(Some(path))
    }

    /// Create default configuration.
    pub fn default() -> DataflowConfig {
        DataflowConfig::default()
    }
}
