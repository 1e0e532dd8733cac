//! Registration of an agent on its input and output topics.

use super::AgentHandle;
use crate::error::AgentError;
use crate::message::Message;
use crate::registry::TopicRegistry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Required number of subscribed and published topics.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Arity {
    pub subs: usize,
    pub pubs: usize,
}

/// Topic lists of one agent plus the registry they live in.
pub(crate) struct Wiring {
    registry: Arc<TopicRegistry>,
    subs: Vec<String>,
    pubs: Vec<String>,
    closed: AtomicBool,
}

impl Wiring {
    /// Validate topic lists for `agent` against `arity`. Names are trimmed.
    pub(crate) fn new(
        agent: &str,
        registry: Arc<TopicRegistry>,
        subs: Vec<String>,
        pubs: Vec<String>,
        arity: Arity,
    ) -> Result<Self, AgentError> {
        if subs.len() != arity.subs || pubs.len() != arity.pubs {
            return Err(AgentError::Arity {
                agent: agent.to_string(),
                expected_subs: arity.subs,
                expected_pubs: arity.pubs,
                subs: subs.len(),
                pubs: pubs.len(),
            });
        }

        let subs = normalize(agent, subs)?;
        let pubs = normalize(agent, pubs)?;

        Ok(Self {
            registry,
            subs,
            pubs,
            closed: AtomicBool::new(false),
        })
    }

    pub(crate) fn subs(&self) -> &[String] {
        &self.subs
    }

    pub(crate) fn pubs(&self) -> &[String] {
        &self.pubs
    }

    pub(crate) fn subscribes_to(&self, topic: &str) -> bool {
        self.subs.iter().any(|s| s == topic)
    }

    /// Subscribe `handle` to every input and register it on every output.
    pub(crate) fn attach(&self, handle: &AgentHandle) {
        register(&self.registry, &self.subs, &self.pubs, handle);
    }

    /// Undo [`Wiring::attach`] for the instance `uuid`. Only the first call
    /// has an effect. Topics dropped by a registry clear are not recreated.
    pub(crate) fn detach(&self, uuid: &Uuid) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        for name in &self.subs {
            if let Some(topic) = self.registry.find_topic(name) {
                topic.unsubscribe(uuid);
            }
        }
        for name in &self.pubs {
            if let Some(topic) = self.registry.find_topic(name) {
                topic.remove_publisher(uuid);
            }
        }
        debug!(agent = %uuid, "Detached agent from topics");
    }

    /// Publish `value` on every output topic.
    pub(crate) fn publish(&self, value: f64) {
        let message = Message::from_f64(value);
        for name in &self.pubs {
            self.registry.get_topic(name).publish(message.clone());
        }
    }
}

/// Register `handle` on the given topics. A handle whose UUID is already
/// present replaces the previous entry.
pub(crate) fn register(
    registry: &TopicRegistry,
    subs: &[String],
    pubs: &[String],
    handle: &AgentHandle,
) {
    for name in subs {
        registry.get_topic(name).subscribe(Arc::clone(handle));
    }
    for name in pubs {
        registry.get_topic(name).add_publisher(Arc::clone(handle));
    }
    debug!(
        agent = %handle.name(),
        uuid = %handle.uuid(),
        subs = ?subs,
        pubs = ?pubs,
        "Registered agent on topics"
    );
}

fn normalize(agent: &str, names: Vec<String>) -> Result<Vec<String>, AgentError> {
    names
        .into_iter()
        .map(|name| {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                Err(AgentError::EmptyTopicName {
                    agent: agent.to_string(),
                })
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_mismatch() {
        let err = Wiring::new(
            "DivideAgent",
            TopicRegistry::shared(),
            vec!["a".into()],
            vec!["out".into()],
            Arity { subs: 2, pubs: 1 },
        )
        .err()
        .unwrap();
        assert_eq!(
            err,
            AgentError::Arity {
                agent: "DivideAgent".to_string(),
                expected_subs: 2,
                expected_pubs: 1,
                subs: 1,
                pubs: 1,
            }
        );
    }

    #[test]
    fn test_names_are_trimmed_and_empty_rejected() {
        let wiring = Wiring::new(
            "IncAgent",
            TopicRegistry::shared(),
            vec![" in ".into()],
            vec!["out\t".into()],
            Arity { subs: 1, pubs: 1 },
        )
        .unwrap();
        assert_eq!(wiring.subs(), ["in".to_string()]);
        assert_eq!(wiring.pubs(), ["out".to_string()]);

        let err = Wiring::new(
            "IncAgent",
            TopicRegistry::shared(),
            vec!["  ".into()],
            vec!["out".into()],
            Arity { subs: 1, pubs: 1 },
        )
        .err()
        .unwrap();
        assert!(matches!(err, AgentError::EmptyTopicName { .. }));
    }
}
