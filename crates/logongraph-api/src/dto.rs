use crate::ids::NodeId;
use logongraph_core::{Edge, GraphSnapshot, Node, SubGraph};
use serde::{Deserialize, Serialize};
use specta::Type;

pub fn default_layout_name() -> String {
    "grid".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
pub struct GraphNodeDto {
    pub id: NodeId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// `blue` when the node's IP resolved to a hostname, `red` otherwise.
    pub color: String,
    pub size: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<&Node> for GraphNodeDto {
    fn from(node: &Node) -> Self {
        Self {
            id: NodeId::from(&node.id),
            label: node.label.clone(),
            ip: node.ip.clone(),
            color: node
                .color
                .map(|c| c.as_str().to_string())
                .unwrap_or_default(),
            size: node.size,
            x: node.position.x,
            y: node.position.y,
            z: node.position.z,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
pub struct GraphEdgeDto {
    pub source: NodeId,
    pub target: NodeId,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub user: String,
    /// `rgb(r, g, b)`; hotter means more logons between the same pair.
    pub color: String,
}

impl From<&Edge> for GraphEdgeDto {
    fn from(edge: &Edge) -> Self {
        Self {
            source: NodeId::from(&edge.source),
            target: NodeId::from(&edge.target),
            timestamp: edge.timestamp,
            user: edge.user.clone(),
            color: edge.color.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Type)]
pub struct GraphResponse {
    pub nodes: Vec<GraphNodeDto>,
    pub edges: Vec<GraphEdgeDto>,
}

impl From<&GraphSnapshot> for GraphResponse {
    fn from(snapshot: &GraphSnapshot) -> Self {
        Self {
            nodes: snapshot.nodes().iter().map(GraphNodeDto::from).collect(),
            edges: snapshot.edges().iter().map(GraphEdgeDto::from).collect(),
        }
    }
}

impl From<SubGraph> for GraphResponse {
    fn from(view: SubGraph) -> Self {
        Self {
            nodes: view.nodes.iter().map(GraphNodeDto::from).collect(),
            edges: view.edges.iter().map(GraphEdgeDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
pub struct NodeSummaryDto {
    pub id: NodeId,
    pub label: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Type)]
pub struct HighlightRequest {
    #[serde(default)]
    pub node_id: NodeId,
}

/// Local wall-clock bounds formatted as `YYYY-MM-DDTHH:MM`.
#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct DateFilterRequest {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct UserFilterRequest {
    pub user: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct LayoutRequest {
    #[serde(default = "default_layout_name")]
    pub layout: String,
}
