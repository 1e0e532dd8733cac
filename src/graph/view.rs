//! Serializable graph snapshot for renderers.

use super::node::NodeKind;
use super::Graph;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equation: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeView {
    pub from: String,
    pub to: String,
}

/// Nodes, edges and the cycle verdict of one graph.
#[derive(Debug, Clone, Serialize)]
pub struct GraphView {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub has_cycles: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<Vec<String>>,
}

impl GraphView {
    pub(crate) fn from_graph(graph: &Graph) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| NodeView {
                id: node.id().to_string(),
                kind: node.kind(),
                label: node.label().to_string(),
                value: node.last_message().map(|m| m.text().to_string()),
                equation: node.equation().map(|m| m.text().to_string()),
            })
            .collect();

        let edges = graph
            .nodes()
            .iter()
            .flat_map(|node| {
                graph.neighbours(node).map(move |target| EdgeView {
                    from: node.id().to_string(),
                    to: target.id().to_string(),
                })
            })
            .collect();

        let cycle = graph.find_cycle();
        Self {
            nodes,
            edges,
            has_cycles: cycle.is_some(),
            cycle,
        }
    }
}
