//! Agent factory: type name to constructor table used by the pipeline loader.

use super::{AgentHandle, BinaryAgent, BinaryOp, IncrementAgent};
use crate::error::AgentError;
use crate::registry::TopicRegistry;
use std::collections::HashMap;
use std::sync::Arc;

/// Constructor shared by every agent type: registry, inputs, outputs.
pub type AgentConstructor =
    fn(Arc<TopicRegistry>, Vec<String>, Vec<String>) -> Result<AgentHandle, AgentError>;

/// Registry of agent constructors keyed by type name.
#[derive(Clone, Default)]
pub struct AgentFactory {
    constructors: HashMap<String, AgentConstructor>,
}

impl AgentFactory {
    /// Empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory with every built-in agent type and its aliases.
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        factory.register("IncAgent", |r, s, p| Ok(IncrementAgent::new(r, s, p)?));
        factory.register("IncrementAgent", |r, s, p| Ok(IncrementAgent::new(r, s, p)?));
        factory.register("AddAgent", |r, s, p| Ok(BinaryAgent::add(r, s, p)?));
        factory.register("PlusAgent", |r, s, p| Ok(BinaryAgent::add(r, s, p)?));
        factory.register("MinusAgent", |r, s, p| Ok(BinaryAgent::minus(r, s, p)?));
        factory.register("MultiplyAgent", |r, s, p| Ok(BinaryAgent::multiply(r, s, p)?));
        factory.register("DivideAgent", |r, s, p| Ok(BinaryAgent::divide(r, s, p)?));
        factory.register("PowerAgent", |r, s, p| Ok(BinaryAgent::power(r, s, p)?));
        debug_assert!(BinaryOp::ALL
            .iter()
            .all(|op| factory.contains(op.agent_name())));
        factory
    }

    /// Register (or replace) the constructor for `type_name`.
    pub fn register(&mut self, type_name: &str, constructor: AgentConstructor) {
        self.constructors
            .insert(Self::normalize(type_name).to_string(), constructor);
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(Self::normalize(type_name))
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Construct and wire an agent of type `type_name`.
    pub fn create(
        &self,
        type_name: &str,
        registry: Arc<TopicRegistry>,
        subs: Vec<String>,
        pubs: Vec<String>,
    ) -> Result<AgentHandle, AgentError> {
        let constructor = self
            .constructors
            .get(Self::normalize(type_name))
            .ok_or_else(|| AgentError::UnknownType(type_name.trim().to_string()))?;
        constructor(registry, subs, pubs)
    }

    /// Strip a module path: `agents.IncAgent` and `dataflow::IncAgent` both
    /// resolve to `IncAgent`.
    fn normalize(type_name: &str) -> &str {
        let trimmed = type_name.trim();
        trimmed
            .rsplit(|c: char| c == '.' || c == ':')
            .next()
            .unwrap_or(trimmed)
    }
}
