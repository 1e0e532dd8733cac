//! Topic registry
//!
//! Thread-safe map from topic name to [`Topic`]. Topics are created lazily on
//! first reference and at most one instance ever exists per name. The registry
//! is an ordinary value shared through `Arc`, not a process global.

use crate::topic::Topic;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Registry of all topics known to a running system.
#[derive(Default)]
pub struct TopicRegistry {
    topics: RwLock<HashMap<String, Arc<Topic>>>,
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry already wrapped for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Get or create the topic called `name`.
    pub fn get_topic(&self, name: &str) -> Arc<Topic> {
        {
            let map = self.topics.read();
            if let Some(topic) = map.get(name) {
                return Arc::clone(topic);
            }
        }

        // Re-check under the write lock: another caller may have won the race.
        let mut map = self.topics.write();
        Arc::clone(map.entry(name.to_string()).or_insert_with(|| {
            debug!(topic = %name, "Created topic");
            Arc::new(Topic::new(name))
        }))
    }

    /// Look up a topic without creating it.
    pub fn find_topic(&self, name: &str) -> Option<Arc<Topic>> {
        self.topics.read().get(name).cloned()
    }

    /// All topics, sorted by name.
    pub fn all_topics(&self) -> Vec<Arc<Topic>> {
        let mut topics: Vec<Arc<Topic>> = self.topics.read().values().cloned().collect();
        topics.sort_by(|a, b| a.name().cmp(b.name()));
        topics
    }

    pub fn len(&self) -> usize {
        self.topics.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.read().is_empty()
    }

    /// Drop every topic. Callers must make sure no agent is publishing.
    pub fn clear(&self) {
        let dropped = {
            let mut map = self.topics.write();
            let count = map.len();
            map.clear();
            count
        };
        info!(topics = dropped, "Cleared topic registry");
    }
}
