use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

pub mod error;
pub mod record;

pub use error::{GraphError, GraphResult, LayoutError};
pub use record::LogonRecord;

/// Default node size before styling runs.
pub const DEFAULT_NODE_SIZE: f64 = 10.0;

/// Canonical node identity: a short hostname or a raw IP address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Whether a node's IP could be mapped back to a hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeColor {
    #[serde(rename = "blue")]
    Resolved,
    #[serde(rename = "red")]
    Unresolved,
}

impl NodeColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeColor::Resolved => "blue",
            NodeColor::Unresolved => "red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub ip: Option<String>,
    pub color: Option<NodeColor>,
    pub size: f64,
    pub position: Position,
}

impl Node {
    pub fn new(id: NodeId, label: impl Into<String>, ip: Option<String>) -> Self {
        Self {
            id,
            label: label.into(),
            ip,
            color: None,
            size: DEFAULT_NODE_SIZE,
            position: Position::default(),
        }
    }
}

/// A single logon event from `source` to `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub user: String,
    /// CSS colour string, empty until styled.
    pub color: String,
}

impl Edge {
    pub fn touches(&self, id: &NodeId) -> bool {
        &self.source == id || &self.target == id
    }

    /// Unordered pair key shared by every edge of the same group.
    pub fn group_key(&self) -> (NodeId, NodeId) {
        if self.source <= self.target {
            (self.source.clone(), self.target.clone())
        } else {
            (self.target.clone(), self.source.clone())
        }
    }
}

/// Nodes and edges selected out of a snapshot by a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// The complete graph held by the server.
///
/// Construction validates that every edge endpoint names a node of the same
/// snapshot, so readers never see a dangling reference.
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_map: HashMap<NodeId, usize>,
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> GraphResult<Self> {
        let node_map: HashMap<NodeId, usize> = nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id.clone(), idx))
            .collect();

        for edge in &edges {
            for endpoint in [&edge.source, &edge.target] {
                if !node_map.contains_key(endpoint) {
                    return Err(GraphError::DanglingEdge(endpoint.0.clone()));
                }
            }
        }

        Ok(Self {
            nodes,
            edges,
            node_map,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.node_map.get(id).map(|&idx| &self.nodes[idx])
    }

    /// Overwrite node positions. Nodes missing from `positions` keep theirs.
    pub fn apply_positions(&mut self, positions: &HashMap<NodeId, Position>) -> Vec<NodeId> {
        let mut missing = Vec::new();
        for node in &mut self.nodes {
            match positions.get(&node.id) {
                Some(position) => node.position = *position,
                None => missing.push(node.id.clone()),
            }
        }
        missing
    }

    /// Edges accepted by `keep`, plus every endpoint node (and `anchor`, if
    /// it exists), both in snapshot order.
    pub fn subgraph<F>(&self, anchor: Option<&NodeId>, keep: F) -> SubGraph
    where
        F: Fn(&Edge) -> bool,
    {
        let edges: Vec<Edge> = self.edges.iter().filter(|e| keep(*e)).cloned().collect();

        let mut ids: HashSet<&NodeId> = HashSet::new();
        if let Some(anchor) = anchor {
            ids.insert(anchor);
        }
        for edge in &edges {
            ids.insert(&edge.source);
            ids.insert(&edge.target);
        }

        let nodes = self
            .nodes
            .iter()
            .filter(|n| ids.contains(&n.id))
            .cloned()
            .collect();

        SubGraph { nodes, edges }
    }
}
