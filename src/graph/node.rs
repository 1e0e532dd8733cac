//! Graph node types and id computation

use crate::message::Message;
use serde::Serialize;
use uuid::Uuid;

/// Prefix marking topic node ids.
pub const TOPIC_PREFIX: char = 'T';
/// Prefix marking agent node ids.
pub const AGENT_PREFIX: char = 'A';

/// Length of the UUID prefix used to tell agents of the same type apart.
const UUID_PREFIX_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Topic,
    Agent,
}

/// Vertex of a wiring graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: String,
    pub(crate) kind: NodeKind,
    pub(crate) label: String,
    pub(crate) edges: Vec<usize>,
    pub(crate) last_message: Option<Message>,
    pub(crate) equation: Option<Message>,
}

impl Node {
    pub(crate) fn topic(name: &str, last_message: Option<Message>) -> Self {
        Self {
            id: topic_id(name),
            kind: NodeKind::Topic,
            label: name.to_string(),
            edges: Vec::new(),
            last_message,
            equation: None,
        }
    }

    pub(crate) fn agent(name: &str, uuid: &Uuid, equation: Message) -> Self {
        Self {
            id: agent_id(name, uuid),
            kind: NodeKind::Agent,
            label: name.to_string(),
            edges: Vec::new(),
            last_message: None,
            equation: Some(equation),
        }
    }

    /// `T<topic>` or `A<agent>_<uuid prefix>`.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Topic name or agent type label, without prefix.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Indices of outgoing neighbours in the owning graph, in insertion order.
    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    /// Last value published on the topic; always `None` for agents.
    pub fn last_message(&self) -> Option<&Message> {
        self.last_message.as_ref()
    }

    /// Agent equation at snapshot time; always `None` for topics.
    pub fn equation(&self) -> Option<&Message> {
        self.equation.as_ref()
    }

    pub fn is_topic(&self) -> bool {
        self.kind == NodeKind::Topic
    }
}

pub fn topic_id(name: &str) -> String {
    format!("{}{}", TOPIC_PREFIX, name)
}

pub fn agent_id(name: &str, uuid: &Uuid) -> String {
    let uuid = uuid.simple().to_string();
    format!("{}{}_{}", AGENT_PREFIX, name, &uuid[..UUID_PREFIX_LEN])
}
