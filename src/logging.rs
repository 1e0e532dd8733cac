//! Logging System
//!
//! Structured logging on top of `tracing`. Level, format and destination come
//! from [`LoggingConfig`] and can be overridden with `DATAFLOW_LOG*`
//! environment variables.

use crate::error::DataflowError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Line format of emitted events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = DataflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(DataflowError::ConfigError(format!(
                "Invalid log format: {} (must be 'json' or 'text')",
                other
            ))),
        }
    }
}

/// Where events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum LogOutput {
    #[serde(rename = "stdout")]
    Stdout,
    #[serde(rename = "stderr")]
    Stderr,
    #[serde(rename = "file")]
    File,
    #[serde(rename = "file+stderr")]
    #[value(name = "file+stderr")]
    FileAndStderr,
    /// stdout and stderr
    #[serde(rename = "both")]
    Both,
}

impl LogOutput {
    fn to_stdout(self) -> bool {
        matches!(self, LogOutput::Stdout | LogOutput::Both)
    }

    fn to_stderr(self) -> bool {
        matches!(self, LogOutput::Stderr | LogOutput::FileAndStderr | LogOutput::Both)
    }

    fn to_file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::FileAndStderr)
    }
}

impl FromStr for LogOutput {
    type Err = DataflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "stdout" => Ok(LogOutput::Stdout),
            "stderr" => Ok(LogOutput::Stderr),
            "file" => Ok(LogOutput::File),
            "file+stderr" => Ok(LogOutput::FileAndStderr),
            "both" => Ok(LogOutput::Both),
            other => Err(DataflowError::ConfigError(format!(
                "Invalid log output: {} (must be 'stdout', 'stderr', 'file', 'file+stderr', or 'both')",
                other
            ))),
        }
    }
}

/// Logging section of [`crate::config::DataflowConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    /// trace, debug, info, warn, error or off
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default = "default_format")]
    pub format: LogFormat,

    #[serde(default = "default_output")]
    pub output: LogOutput,

    /// Log file when `output` includes a file; `None` uses the state dir.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// ANSI colours for text output on terminals
    #[serde(default = "enabled_by_default")]
    pub color: bool,

    /// Per-module levels, e.g. `dataflow::agent = "trace"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn enabled_by_default() -> bool {
    true
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> LogFormat {
    LogFormat::Text
}

fn default_output() -> LogOutput {
    LogOutput::Stderr
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: true,
            modules: HashMap::new(),
        }
    }
}

/// Log file path, first match wins: CLI flag, `DATAFLOW_LOG_FILE`, config,
/// then `dataflow.log` in the platform state directory.
pub fn resolve_log_file_path(
    cli_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
) -> Result<PathBuf, DataflowError> {
    let env_file = std::env::var_os("DATAFLOW_LOG_FILE").map(PathBuf::from);
    [cli_file, env_file, config_file]
        .into_iter()
        .flatten()
        .find(|p| !p.as_os_str().is_empty())
        .map(Ok)
        .unwrap_or_else(state_dir_log_file)
}

fn state_dir_log_file() -> Result<PathBuf, DataflowError> {
    let dirs = directories::ProjectDirs::from("", "dataflow", "dataflow").ok_or_else(|| {
        DataflowError::ConfigError("No home directory to place the log file in".to_string())
    })?;
    // state_dir is Linux-only.
    let dir = dirs.state_dir().unwrap_or_else(|| dirs.data_local_dir());
    Ok(dir.join("dataflow.log"))
}

/// Install the global subscriber.
///
/// `DATAFLOW_LOG`, `DATAFLOW_LOG_FORMAT` and `DATAFLOW_LOG_OUTPUT` take
/// precedence over `config`; `None` means defaults. Fails if a global
/// subscriber is already set.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), DataflowError> {
    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);

    let installed = if !config.enabled {
        Registry::default()
            .with(EnvFilter::new("off"))
            .with(fmt::layer().with_writer(std::io::sink))
            .try_init()
    } else {
        let filter = build_env_filter(config)?;
        let format = env_override("DATAFLOW_LOG_FORMAT")?.unwrap_or(config.format);
        let output = env_override("DATAFLOW_LOG_OUTPUT")?.unwrap_or(config.output);
        let writer = build_writer(output, config.file.clone())?;

        let layer = fmt::layer()
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(writer);

        match format {
            LogFormat::Json => Registry::default().with(filter).with(layer.json()).try_init(),
            LogFormat::Text => Registry::default()
                .with(filter)
                .with(layer.with_ansi(config.color && !output.to_file()))
                .try_init(),
        }
    };

    installed.map_err(|e| DataflowError::ConfigError(format!("Logging already initialized: {}", e)))
}

fn env_override<T: FromStr<Err = DataflowError>>(var: &str) -> Result<Option<T>, DataflowError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => value.parse().map(Some),
        _ => Ok(None),
    }
}

fn build_writer(output: LogOutput, config_file: Option<PathBuf>) -> Result<BoxMakeWriter, DataflowError> {
    if output.to_file() {
        let file = open_log_file(resolve_log_file_path(None, config_file)?)?;
        return Ok(if output.to_stderr() {
            BoxMakeWriter::new(file.and(std::io::stderr))
        } else {
            BoxMakeWriter::new(file)
        });
    }

    Ok(match (output.to_stdout(), output.to_stderr()) {
        (true, true) => BoxMakeWriter::new(std::io::stdout.and(std::io::stderr)),
        (true, false) => BoxMakeWriter::new(std::io::stdout),
        _ => BoxMakeWriter::new(std::io::stderr),
    })
}

fn open_log_file(path: PathBuf) -> Result<Arc<std::fs::File>, DataflowError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            DataflowError::ConfigError(format!("Failed to create log directory: {}", e))
        })?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map(Arc::new)
        .map_err(|e| DataflowError::ConfigError(format!("Failed to open log file {:?}: {}", path, e)))
}

/// `DATAFLOW_LOG` replaces everything; otherwise the configured level plus
/// module directives from config and `DATAFLOW_LOG_MODULES`.
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, DataflowError> {
    if let Ok(filter) = EnvFilter::try_from_env("DATAFLOW_LOG") {
        return Ok(filter);
    }
    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let from_env = std::env::var("DATAFLOW_LOG_MODULES").unwrap_or_default();
    let env_pairs = from_env
        .split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(module, level)| (module.trim().to_string(), level.trim().to_string()));
    let config_pairs = config.modules.iter().map(|(m, l)| (m.clone(), l.clone()));

    config_pairs
        .chain(env_pairs)
        .try_fold(EnvFilter::new(&config.level), |filter, (module, level)| {
            let directive = format!("{}={}", module, level);
            directive
                .parse()
                .map(|d| filter.add_directive(d))
                .map_err(|e| {
                    DataflowError::ConfigError(format!("Invalid log directive '{}': {}", directive, e))
                })
        })
}
