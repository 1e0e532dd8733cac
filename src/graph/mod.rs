//! Wiring graphs
//!
//! A graph is an on-demand snapshot of which agents read and write which
//! topics: an edge runs from a topic to each of its subscribers and from each
//! publisher to the topic. Graphs are rebuilt per request and never persisted.

mod builder;
mod node;
mod view;

pub use builder::GraphBuilder;
pub use node::{agent_id, topic_id, Node, NodeKind, AGENT_PREFIX, TOPIC_PREFIX};
pub use view::{EdgeView, GraphView, NodeView};

use std::collections::HashMap;

/// Directed graph of topic and agent nodes.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `node` unless a node with the same id exists; returns its index.
    pub(crate) fn insert(&mut self, node: Node) -> usize {
        if let Some(&idx) = self.index.get(&node.id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.index.insert(node.id.clone(), idx);
        self.nodes.push(node);
        idx
    }

    /// Add an edge `from -> to`. Repeated edges are ignored.
    pub(crate) fn connect(&mut self, from: usize, to: usize) {
        let edges = &mut self.nodes[from].edges;
        if !edges.contains(&to) {
            edges.push(to);
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    /// Outgoing neighbours of `node`.
    pub fn neighbours<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        node.edges.iter().map(move |&idx| &self.nodes[idx])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    pub fn has_cycles(&self) -> bool {
        self.find_cycle().is_some()
    }

    /// Ids of the nodes on one cycle, in edge order, or `None` for a DAG.
    ///
    /// Iterative depth-first search with an explicit stack, so deep chains do
    /// not exhaust the thread stack.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];

        for start in 0..self.nodes.len() {
            if marks[start] != Mark::Unvisited {
                continue;
            }
            marks[start] = Mark::OnPath;
            // (node, index of the next edge to explore)
            let mut stack: Vec<(usize, usize)> = vec![(start, 0)];

            while let Some(frame) = stack.last_mut() {
                let (node, next) = *frame;
                match self.nodes[node].edges.get(next) {
                    Some(&target) => {
                        frame.1 += 1;
                        match marks[target] {
                            Mark::OnPath => {
                                let from = stack
                                    .iter()
                                    .position(|&(n, _)| n == target)
                                    .unwrap_or(0);
                                return Some(
                                    stack[from..]
                                        .iter()
                                        .map(|&(n, _)| self.nodes[n].id.clone())
                                        .collect(),
                                );
                            }
                            Mark::Unvisited => {
                                marks[target] = Mark::OnPath;
                                stack.push((target, 0));
                            }
                            Mark::Done => {}
                        }
                    }
                    None => {
                        marks[node] = Mark::Done;
                        stack.pop();
                    }
                }
            }
        }

        None
    }

    /// Serializable form for renderers.
    pub fn view(&self) -> GraphView {
        GraphView::from_graph(self)
    }
}
