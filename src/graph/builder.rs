//! Build a wiring graph from the live topic registry.

use super::node::Node;
use super::Graph;
use crate::agent::AgentHandle;
use crate::registry::TopicRegistry;
use tracing::debug;

/// Snapshots a [`TopicRegistry`] into a [`Graph`].
pub struct GraphBuilder;

impl GraphBuilder {
    /// Walk every topic (sorted by name) and add `topic -> subscriber` and
    /// `publisher -> topic` edges. Agents are keyed by type label and UUID, so
    /// two instances of the same type stay distinct.
    ///
    /// Topic sets are read as snapshots; agents wired concurrently may or may
    /// not appear, but the graph is always internally consistent.
    pub fn build_from_registry(registry: &TopicRegistry) -> Graph {
        let mut graph = Graph::new();

        for topic in registry.all_topics() {
            let topic_idx = graph.insert(Node::topic(topic.name(), topic.last_message()));

            for agent in topic.subscribers() {
                let agent_idx = graph.insert(agent_node(&agent));
                graph.connect(topic_idx, agent_idx);
            }
            for agent in topic.publishers() {
                let agent_idx = graph.insert(agent_node(&agent));
                graph.connect(agent_idx, topic_idx);
            }
        }

        debug!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            "Built wiring graph"
        );
        graph
    }
}

fn agent_node(agent: &AgentHandle) -> Node {
    Node::agent(agent.name(), &agent.uuid(), agent.equation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, BinaryAgent, IncrementAgent};
    use crate::graph::NodeKind;
    use std::sync::Arc;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_agent_cycle_is_detected() {
        let registry = TopicRegistry::shared();
        let _x = IncrementAgent::new(Arc::clone(&registry), names(&["A"]), names(&["B"])).unwrap();
        let _y = IncrementAgent::new(Arc::clone(&registry), names(&["B"]), names(&["A"])).unwrap();

        let graph = GraphBuilder::build_from_registry(&registry);
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.has_cycles());
    }

    #[test]
    fn test_fan_out_to_two_agents_is_acyclic() {
        let registry = TopicRegistry::shared();
        let _x = IncrementAgent::new(Arc::clone(&registry), names(&["in"]), names(&["x"])).unwrap();
        let _y = IncrementAgent::new(Arc::clone(&registry), names(&["in"]), names(&["y"])).unwrap();

        let graph = GraphBuilder::build_from_registry(&registry);
        let topic = graph.node("Tin").unwrap();
        assert_eq!(topic.kind(), NodeKind::Topic);
        assert_eq!(graph.neighbours(topic).count(), 2);
        assert!(graph
            .neighbours(topic)
            .all(|n| n.kind() == NodeKind::Agent && n.label() == "IncAgent"));
        assert!(!graph.has_cycles());
    }

    #[test]
    fn test_topic_nodes_carry_last_message_and_agents_equation() {
        let registry = TopicRegistry::shared();
        let agent = BinaryAgent::divide(
            Arc::clone(&registry),
            names(&["num", "den"]),
            names(&["q"]),
        )
        .unwrap();
        registry
            .get_topic("num")
            .publish(crate::message::Message::from_text("3"));

        let graph = GraphBuilder::build_from_registry(&registry);
        assert_eq!(
            graph.node("Tnum").unwrap().last_message().unwrap().text(),
            "3"
        );
        assert!(graph.node("Tden").unwrap().last_message().is_none());

        let id = crate::graph::agent_id("DivideAgent", &agent.uuid());
        let node = graph.node(&id).unwrap();
        assert_eq!(node.equation().unwrap().text(), "3 / ?");
        assert_eq!(
            graph.neighbours(node).map(|n| n.id()).collect::<Vec<_>>(),
            vec!["Tq"]
        );
    }
}
