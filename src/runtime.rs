//! Runtime host
//!
//! Owns the topic registry, the agent factory and the currently loaded
//! pipeline. Loading a new definition tears down the previous agents and
//! clears the registry first, so each configuration starts from empty topics.

use crate::agent::AgentFactory;
use crate::config::DataflowConfig;
use crate::error::DataflowError;
use crate::graph::{Graph, GraphBuilder};
use crate::message::Message;
use crate::pipeline::{Pipeline, PipelineSpec};
use crate::registry::TopicRegistry;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Name and latest value of one topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicValue {
    pub name: String,
    pub value: Option<String>,
}

pub struct Runtime {
    registry: Arc<TopicRegistry>,
    factory: AgentFactory,
    config: DataflowConfig,
    pipeline: Mutex<Option<Pipeline>>,
}

impl Runtime {
    pub fn new(config: DataflowConfig) -> Self {
        Self::with_factory(config, AgentFactory::with_builtins())
    }

    /// Runtime with a custom set of agent constructors.
    pub fn with_factory(config: DataflowConfig, factory: AgentFactory) -> Self {
        Self {
            registry: TopicRegistry::shared(),
            factory,
            config,
            pipeline: Mutex::new(None),
        }
    }

    pub fn registry(&self) -> &Arc<TopicRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &DataflowConfig {
        &self.config
    }

    /// Replace the running pipeline with one built from `spec`.
    ///
    /// Returns the number of agents built. The previous pipeline is always
    /// torn down first, so on error the runtime has no pipeline and an empty
    /// registry.
    pub fn load(&self, spec: &PipelineSpec) -> Result<usize, DataflowError> {
        let mut current = self.pipeline.lock();
        if let Some(mut previous) = current.take() {
            info!(agents = previous.len(), "Closing previous pipeline");
            previous.close();
        }
        self.registry.clear();

        let result = Pipeline::build(
            spec,
            &self.registry,
            &self.factory,
            self.config.queue_capacity,
        );
        match result {
            Ok(pipeline) => {
                let count = pipeline.len();
                *current = Some(pipeline);
                Ok(count)
            }
            Err(e) => {
                self.registry.clear();
                Err(e.into())
            }
        }
    }

    /// Parse and load a definition in the three-line group format.
    ///
    /// A definition that does not parse also tears down the previous
    /// pipeline, like any other failed load.
    pub fn load_str(&self, text: &str) -> Result<usize, DataflowError> {
        match PipelineSpec::parse(text) {
            Ok(spec) => self.load(&spec),
            Err(e) => {
                self.shutdown();
                Err(e.into())
            }
        }
    }

    /// Publish `text` on `topic`, creating the topic if needed.
    pub fn publish(&self, topic: &str, text: &str) {
        self.registry
            .get_topic(topic)
            .publish(Message::from_text(text));
    }

    /// Wait for queued work to finish, bounded by the configured timeout.
    pub fn wait_idle(&self) -> Result<(), DataflowError> {
        let timeout = self.config.settle_timeout();
        let settled = match &*self.pipeline.lock() {
            Some(pipeline) => pipeline.wait_idle(timeout),
            None => true,
        };
        if settled {
            Ok(())
        } else {
            Err(DataflowError::SettleTimeout(self.config.settle_timeout_ms))
        }
    }

    /// Latest value of every topic, sorted by name.
    pub fn topics(&self) -> Vec<TopicValue> {
        self.registry
            .all_topics()
            .iter()
            .map(|topic| TopicValue {
                name: topic.name().to_string(),
                value: topic.last_message().map(|m| m.text().to_string()),
            })
            .collect()
    }

    pub fn graph(&self) -> Graph {
        GraphBuilder::build_from_registry(&self.registry)
    }

    pub fn agent_count(&self) -> usize {
        self.pipeline.lock().as_ref().map(Pipeline::len).unwrap_or(0)
    }

    /// Close the pipeline and clear all topics.
    pub fn shutdown(&self) {
        if let Some(mut pipeline) = self.pipeline.lock().take() {
            pipeline.close();
        }
        self.registry.clear();
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.shutdown();
    }
}
