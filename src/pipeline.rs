//! Agent pipelines
//!
//! A pipeline definition is plain text made of three-line groups:
//!
//! ```text
//! agents.PlusAgent
//! A,B
//! C
//! ```
//!
//! i.e. the agent type, its comma-separated input topics and its
//! comma-separated output topics. Blank lines and `#` comments are skipped.
//! Every agent built from a definition is wrapped in a [`ParallelAgent`].

use crate::agent::{Agent, AgentFactory, ParallelAgent};
use crate::error::PipelineError;
use crate::registry::TopicRegistry;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// One agent declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDecl {
    pub type_name: String,
    pub subs: Vec<String>,
    pub pubs: Vec<String>,
}

/// Parsed pipeline definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSpec {
    pub agents: Vec<AgentDecl>,
}

impl PipelineSpec {
    pub fn parse(text: &str) -> Result<Self, PipelineError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();

        if lines.len() % 3 != 0 {
            return Err(PipelineError::IncompleteGroup { lines: lines.len() });
        }

        let agents = lines
            .chunks(3)
            .map(|group| AgentDecl {
                type_name: group[0].to_string(),
                subs: split_topics(group[1]),
                pubs: split_topics(group[2]),
            })
            .collect();

        Ok(Self { agents })
    }

    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Empty entries are kept so that agent construction rejects them.
fn split_topics(line: &str) -> Vec<String> {
    line.split(',').map(|s| s.trim().to_string()).collect()
}

/// Live agents built from a [`PipelineSpec`].
pub struct Pipeline {
    agents: Vec<Arc<ParallelAgent>>,
}

impl Pipeline {
    /// Construct every declared agent, wrapped with a queue of `capacity`.
    ///
    /// Fails on the first bad declaration; agents already built are closed
    /// before the error is returned.
    pub fn build(
        spec: &PipelineSpec,
        registry: &Arc<TopicRegistry>,
        factory: &AgentFactory,
        capacity: usize,
    ) -> Result<Self, PipelineError> {
        let mut pipeline = Self { agents: Vec::with_capacity(spec.len()) };

        for (index, decl) in spec.agents.iter().enumerate() {
            let built = factory
                .create(
                    &decl.type_name,
                    Arc::clone(registry),
                    decl.subs.clone(),
                    decl.pubs.clone(),
                )
                .and_then(|inner| {
                    ParallelAgent::new(inner.clone(), capacity, registry).map_err(|e| {
                        inner.close();
                        e
                    })
                });

            match built {
                Ok(agent) => pipeline.agents.push(agent),
                Err(source) => {
                    warn!(index, type_name = %decl.type_name, error = %source, "Agent construction failed");
                    pipeline.close();
                    return Err(PipelineError::Agent {
                        index,
                        type_name: decl.type_name.clone(),
                        source,
                    });
                }
            }
        }

        info!(agents = pipeline.agents.len(), capacity, "Pipeline built");
        Ok(pipeline)
    }

    pub fn agents(&self) -> &[Arc<ParallelAgent>] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn is_idle(&self) -> bool {
        self.agents.iter().all(|a| a.is_idle())
    }

    /// Wait until no agent has queued or in-flight work.
    ///
    /// Requires two consecutive idle scans, since a worker can hand work to
    /// an agent that was already scanned. Returns false on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        let mut idle_scans = 0;
        loop {
            if self.is_idle() {
                idle_scans += 1;
                if idle_scans >= 2 {
                    return true;
                }
            } else {
                idle_scans = 0;
            }

            if start.elapsed() >= timeout {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    /// Close every agent in declaration order.
    pub fn close(&mut self) {
        for agent in self.agents.drain(..) {
            agent.close();
        }
        debug!("Pipeline closed");
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use crate::message::Message;

    const CHAIN: &str = "\
# product of A and B, then incremented
agents.MultiplyAgent
A, B
C

agents.IncAgent
C
D
";

    #[test]
    fn test_parse_groups() {
        let spec = PipelineSpec::parse(CHAIN).unwrap();
        assert_eq!(spec.len(), 2);
        assert_eq!(
            spec.agents[0],
            AgentDecl {
                type_name: "agents.MultiplyAgent".to_string(),
                subs: vec!["A".to_string(), "B".to_string()],
                pubs: vec!["C".to_string()],
            }
        );
        assert_eq!(spec.agents[1].subs, vec!["C".to_string()]);
    }

    #[test]
    fn test_incomplete_group_is_rejected() {
        let err = PipelineSpec::parse("IncAgent\nA\n").unwrap_err();
        assert!(matches!(err, PipelineError::IncompleteGroup { lines: 2 }));
    }

    #[test]
    fn test_build_runs_chain() {
        let registry = TopicRegistry::shared();
        let spec = PipelineSpec::parse(CHAIN).unwrap();
        let pipeline = Pipeline::build(&spec, &registry, &AgentFactory::with_builtins(), 4).unwrap();
        assert_eq!(pipeline.len(), 2);

        registry.get_topic("A").publish(Message::from_text("3"));
        registry.get_topic("B").publish(Message::from_text("4"));
        assert!(pipeline.wait_idle(Duration::from_secs(5)));

        assert_eq!(registry.get_topic("C").last_message().unwrap().numeric(), 12.0);
        assert_eq!(registry.get_topic("D").last_message().unwrap().numeric(), 13.0);
    }

    #[test]
    fn test_failed_build_closes_earlier_agents() {
        let registry = TopicRegistry::shared();
        let spec = PipelineSpec::parse("IncAgent\nA\nB\nDivideAgent\nA\nQ\n").unwrap();
        let err = Pipeline::build(&spec, &registry, &AgentFactory::with_builtins(), 4)
            .err()
            .unwrap();

        match err {
            PipelineError::Agent { index, source, .. } => {
                assert_eq!(index, 1);
                assert!(matches!(source, AgentError::Arity { .. }));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(registry.get_topic("A").subscriber_count(), 0);
        assert_eq!(registry.get_topic("B").publisher_count(), 0);
    }

    #[test]
    fn test_unknown_type_fails() {
        let registry = TopicRegistry::shared();
        let spec = PipelineSpec::parse("SqrtAgent\nA\nB\n").unwrap();
        let err = Pipeline::build(&spec, &registry, &AgentFactory::with_builtins(), 4)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            PipelineError::Agent { source: AgentError::UnknownType(_), .. }
        ));
    }

    #[test]
    fn test_empty_topic_name_fails() {
        let registry = TopicRegistry::shared();
        let spec = PipelineSpec::parse("AddAgent\nA,\nB\n").unwrap();
        let err = Pipeline::build(&spec, &registry, &AgentFactory::with_builtins(), 4)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            PipelineError::Agent { source: AgentError::EmptyTopicName { .. }, .. }
        ));
    }
}
