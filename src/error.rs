//! Error types for the dataflow engine.
//!
//! Construction problems (bad arity, unknown agent types, malformed agent
//! files) are returned to the caller and abort configuration loading.
//! Computation problems never leave an agent: they are logged and the agent
//! skips its publish.

use thiserror::Error;

/// Errors raised while constructing or wiring an agent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// Wrong number of subscribed or published topics.
    #[error(
        "{agent} requires exactly {expected_subs} input(s) and {expected_pubs} output(s), got {subs} and {pubs}"
    )]
    Arity {
        agent: String,
        expected_subs: usize,
        expected_pubs: usize,
        subs: usize,
        pubs: usize,
    },

    /// A topic name was empty after trimming.
    #[error("{agent}: topic names must not be empty")]
    EmptyTopicName { agent: String },

    /// No constructor is registered for the requested type name.
    #[error("Unknown agent type: {0}")]
    UnknownType(String),

    /// Queue capacity for a parallel agent must be at least one.
    #[error("Invalid queue capacity {0} for parallel agent (must be >= 1)")]
    InvalidCapacity(usize),

    /// The worker thread could not be spawned.
    #[error("Failed to spawn worker for {agent}: {cause}")]
    WorkerSpawn { agent: String, cause: String },
}

/// Conditions under which an agent declines to publish.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ComputeError {
    #[error("division by zero ({numerator} / 0)")]
    DivisionByZero { numerator: f64 },

    #[error("zero base with negative exponent {exponent}")]
    ZeroToNegativePower { exponent: f64 },

    #[error("result is not a finite number")]
    NonFinite,

    #[error("input is not a number")]
    NonNumeric,
}

/// Errors raised while parsing or building an agent pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The definition does not consist of complete three-line groups.
    #[error("Agent definition has {lines} non-blank lines, expected a multiple of 3")]
    IncompleteGroup { lines: usize },

    /// An agent in the definition could not be constructed.
    #[error("Agent #{index} ({type_name}) failed: {source}")]
    Agent {
        index: usize,
        type_name: String,
        #[source]
        source: AgentError,
    },

    #[error("Failed to read agent definition {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level error for the runtime host and CLI.
#[derive(Error, Debug)]
pub enum DataflowError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Timed out after {0} ms waiting for agents to settle")]
    SettleTimeout(u64),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to render output: {0}")]
    Output(String),
}

impl From<config::ConfigError> for DataflowError {
    fn from(err: config::ConfigError) -> Self {
        DataflowError::ConfigError(err.to_string())
    }
}
