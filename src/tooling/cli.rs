//! CLI Tooling
//!
//! Every command loads an agent definition into a fresh [`Runtime`], so runs
//! never share topics.

use crate::agent::AgentFactory;
use crate::config::{ConfigLoader, DataflowConfig};
use crate::error::DataflowError;
use crate::graph::{Graph, GraphView, NodeKind};
use crate::logging::{LogFormat, LogOutput, LoggingConfig};
use crate::pipeline::PipelineSpec;
use crate::runtime::{Runtime, TopicValue};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Dataflow CLI - reactive topic/agent networks
#[derive(Parser, Debug)]
#[command(name = "dataflow")]
#[command(about = "Build, inspect and drive reactive topic/agent networks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Log output
    #[arg(long, value_enum)]
    pub log_output: Option<LogOutput>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply the `--log-*` flags on top of the configured logging section.
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.format = format;
        }
        if let Some(output) = self.log_output {
            config.output = output;
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the agents in a definition file and report the wiring
    Validate {
        /// Agent definition file
        agents: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Render the topic/agent graph of a definition file
    Graph {
        /// Agent definition file
        agents: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Publish values and print every topic once the agents settle
    Publish {
        /// Agent definition file
        agents: PathBuf,
        /// Value to publish, as topic=value (repeatable, applied in order)
        #[arg(long = "set", value_name = "TOPIC=VALUE")]
        set: Vec<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List the registered agent type names
    Types,
}

/// Result of `validate`.
#[derive(Debug, Serialize)]
pub struct ValidateOutput {
    pub agents: usize,
    pub topics: usize,
    pub has_cycles: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<Vec<String>>,
}

/// CLI context for executing commands
pub struct CliContext {
    config: DataflowConfig,
}

impl CliContext {
    /// Load configuration from `config_path`, or defaults plus environment.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, DataflowError> {
        let config = ConfigLoader::load(config_path.as_deref())?;
        Ok(Self { config })
    }

    pub fn with_config(config: DataflowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DataflowConfig {
        &self.config
    }

    /// Execute a CLI command and return its rendered output.
    pub fn execute(&self, command: &Commands) -> Result<String, DataflowError> {
        match command {
            Commands::Validate { agents, format } => {
                check_format(format)?;
                let runtime = self.load(agents)?;
                let graph = runtime.graph();
                let output = ValidateOutput {
                    agents: runtime.agent_count(),
                    topics: runtime.registry().len(),
                    has_cycles: graph.has_cycles(),
                    cycle: graph.find_cycle(),
                };
                if format == "json" {
                    to_json(&output)
                } else {
                    Ok(format_validate_text(&output))
                }
            }
            Commands::Graph { agents, format } => {
                check_format(format)?;
                let runtime = self.load(agents)?;
                let graph = runtime.graph();
                if format == "json" {
                    to_json(&graph.view())
                } else {
                    Ok(format_graph_text(&graph))
                }
            }
            Commands::Publish { agents, set, format } => {
                check_format(format)?;
                let assignments = set
                    .iter()
                    .map(|raw| parse_assignment(raw))
                    .collect::<Result<Vec<_>, _>>()?;

                let runtime = self.load(agents)?;
                for (topic, value) in &assignments {
                    runtime.publish(topic, value);
                    runtime.wait_idle()?;
                }
                let topics = runtime.topics();
                if format == "json" {
                    to_json(&topics)
                } else {
                    Ok(format_topics_text(&topics))
                }
            }
            Commands::Types => Ok(AgentFactory::with_builtins().type_names().join("\n")),
        }
    }

    fn load(&self, path: &Path) -> Result<Runtime, DataflowError> {
        let spec = PipelineSpec::from_file(path)?;
        let runtime = Runtime::new(self.config.clone());
        let count = runtime.load(&spec)?;
        info!(path = %path.display(), agents = count, "Agent definition loaded");
        Ok(runtime)
    }
}

/// Split `topic=value`; the value may itself contain `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), DataflowError> {
    let (topic, value) = raw.split_once('=').ok_or_else(|| {
        DataflowError::InvalidArgument(format!("expected TOPIC=VALUE, got '{}'", raw))
    })?;
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(DataflowError::InvalidArgument(format!(
            "missing topic name in '{}'",
            raw
        )));
    }
    Ok((topic.to_string(), value.trim().to_string()))
}

fn check_format(format: &str) -> Result<(), DataflowError> {
    match format {
        "text" | "json" => Ok(()),
        other => Err(DataflowError::InvalidArgument(format!(
            "unknown format '{}' (expected text or json)",
            other
        ))),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, DataflowError> {
    serde_json::to_string_pretty(value).map_err(|e| DataflowError::Output(e.to_string()))
}

fn format_cycle_warning(cycle: &[String]) -> String {
    format!(
        "{} cycle detected: {}",
        "warning:".yellow().bold(),
        cycle.join(" -> ")
    )
}

fn format_validate_text(output: &ValidateOutput) -> String {
    let mut out = format!(
        "{} agents, {} topics\n",
        output.agents, output.topics
    );
    match &output.cycle {
        Some(cycle) => out.push_str(&format_cycle_warning(cycle)),
        None => out.push_str("no cycles"),
    }
    out
}

fn format_graph_text(graph: &Graph) -> String {
    let view: GraphView = graph.view();
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Node", "Kind", "Value / Equation", "Edges to"]);
    for node in graph.nodes() {
        let detail = match node.kind() {
            NodeKind::Topic => node.last_message().map(|m| m.text().to_string()),
            NodeKind::Agent => node.equation().map(|m| m.text().to_string()),
        };
        let targets: Vec<&str> = graph.neighbours(node).map(|n| n.id()).collect();
        table.add_row(vec![
            node.id().to_string(),
            format!("{:?}", node.kind()).to_lowercase(),
            detail.unwrap_or_else(|| "-".to_string()),
            targets.join(", "),
        ]);
    }

    let mut out = format!("{}\n", table);
    out.push_str(&format!(
        "{} nodes, {} edges\n",
        view.nodes.len(),
        view.edges.len()
    ));
    match &view.cycle {
        Some(cycle) => out.push_str(&format_cycle_warning(cycle)),
        None => out.push_str("no cycles"),
    }
    out
}

fn format_topics_text(topics: &[TopicValue]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Topic", "Value"]);
    for topic in topics {
        table.add_row(vec![
            topic.name.clone(),
            topic.value.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("A=3").unwrap(),
            ("A".to_string(), "3".to_string())
        );
        assert_eq!(
            parse_assignment(" note = a=b ").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_assignment("A").is_err());
        assert!(parse_assignment("=3").is_err());
    }

    #[test]
    fn test_check_format() {
        assert!(check_format("text").is_ok());
        assert!(check_format("json").is_ok());
        assert!(check_format("yaml").is_err());
    }

    #[test]
    fn test_logging_flags_override_config() {
        let cli = Cli::try_parse_from([
            "dataflow",
            "--log-level",
            "debug",
            "--log-output",
            "stdout",
            "types",
        ])
        .unwrap();
        let merged = cli.logging_config(&LoggingConfig::default());
        assert_eq!(merged.level, "debug");
        assert_eq!(merged.output, LogOutput::Stdout);
        assert_eq!(merged.format, LogFormat::Text);
    }

    #[test]
    fn test_cycle_warning_lists_path() {
        let text = format_cycle_warning(&["TA".to_string(), "TB".to_string()]);
        assert!(text.contains("TA -> TB"));
    }
}
