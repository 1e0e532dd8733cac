//! Dataflow: Reactive Topic/Agent Networks
//!
//! Named topics carry messages; agents subscribe to input topics, compute and
//! publish to output topics. Agents can be decoupled from their publishers with
//! a bounded worker queue, and the resulting wiring can be inspected as a
//! directed graph with cycle detection.

pub mod agent;
pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod message;
pub mod pipeline;
pub mod registry;
pub mod runtime;
pub mod tooling;
pub mod topic;

pub use agent::{
    Agent, AgentFactory, AgentHandle, BinaryAgent, BinaryOp, IncrementAgent, ParallelAgent,
};
pub use error::{AgentError, ComputeError, DataflowError, PipelineError};
pub use graph::{Graph, GraphBuilder, GraphView};
pub use message::Message;
pub use pipeline::{Pipeline, PipelineSpec};
pub use registry::TopicRegistry;
pub use runtime::Runtime;
pub use topic::Topic;
