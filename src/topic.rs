//! Topics
//!
//! A topic is a named many-to-many channel. It remembers the last published
//! message and fans each publish out to its current subscribers on the
//! caller's thread.

use crate::agent::AgentHandle;
use crate::message::Message;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;
use uuid::Uuid;

/// Agents registered on a topic, keyed by instance UUID so that adding the
/// same agent twice is a no-op.
type AgentSet = RwLock<BTreeMap<Uuid, AgentHandle>>;

/// Named pub/sub channel.
pub struct Topic {
    name: String,
    subscribers: AgentSet,
    publishers: AgentSet,
    last_message: RwLock<Option<Message>>,
}

impl Topic {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subscribers: RwLock::new(BTreeMap::new()),
            publishers: RwLock::new(BTreeMap::new()),
            last_message: RwLock::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a subscriber. A handle with the same UUID replaces the existing
    /// entry, which is how a decorator takes over its inner agent's slot.
    pub fn subscribe(&self, agent: AgentHandle) {
        self.subscribers.write().insert(agent.uuid(), agent);
    }

    pub fn unsubscribe(&self, uuid: &Uuid) {
        self.subscribers.write().remove(uuid);
    }

    pub fn add_publisher(&self, agent: AgentHandle) {
        self.publishers.write().insert(agent.uuid(), agent);
    }

    pub fn remove_publisher(&self, uuid: &Uuid) {
        self.publishers.write().remove(uuid);
    }

    /// Store `message` as the last value, then invoke every subscriber.
    ///
    /// Subscribers are snapshotted before the fan-out and the lock is released,
    /// so callbacks may freely (un)subscribe or publish back into this topic.
    pub fn publish(&self, message: Message) {
        *self.last_message.write() = Some(message.clone());

        let subscribers = self.subscribers();
        trace!(
            topic = %self.name,
            subscribers = subscribers.len(),
            text = %message.text(),
            "Publishing message"
        );
        for agent in subscribers {
            agent.callback(&self.name, &message);
        }
    }

    pub fn last_message(&self) -> Option<Message> {
        self.last_message.read().clone()
    }

    /// Snapshot of the current subscribers, ordered by UUID.
    pub fn subscribers(&self) -> Vec<AgentHandle> {
        self.subscribers.read().values().cloned().collect()
    }

    /// Snapshot of the current publishers, ordered by UUID.
    pub fn publishers(&self) -> Vec<AgentHandle> {
        self.publishers.read().values().cloned().collect()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    pub fn publisher_count(&self) -> usize {
        self.publishers.read().len()
    }
}

impl fmt::Debug for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topic")
            .field("name", &self.name)
            .field("subscribers", &self.subscriber_count())
            .field("publishers", &self.publisher_count())
            .field("last_message", &*self.last_message.read())
            .finish()
    }
}
