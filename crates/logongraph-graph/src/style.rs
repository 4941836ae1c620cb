//! Graph Styling
//!
//! Derives node colour and size from resolution status and degree, and edge
//! colour from how many logons share the same pair of hosts.

use crate::builder::BuiltGraph;
use crate::resolver::IdentityResolver;
use logongraph_core::{DEFAULT_NODE_SIZE, Node, NodeColor};
use std::fmt;

/// Size added on top of the base size for the busiest node.
pub const NODE_SIZE_RANGE: f64 = 20.0;

/// RGB color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn from_unit(r: f64, g: f64, b: f64) -> Self {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0) as u8;
        Self::rgb(channel(r), channel(g), channel(b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// The "jet" ramp: dark blue at 0, through cyan, green and yellow, to dark
/// red at 1. Inputs outside `[0, 1]` are clamped.
pub fn jet(t: f64) -> Color {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let ramp = |offset: f64| 1.5 - (4.0 * t - offset).abs();
    Color::from_unit(ramp(3.0), ramp(2.0), ramp(1.0))
}

/// Colour for an edge group holding `count` of at most `max_count` edges.
pub fn edge_color(count: usize, max_count: usize) -> Color {
    let density = count as f64 / max_count.max(1) as f64;
    jet(density)
}

/// `10` for an isolated node, `30` for the busiest one.
pub fn node_size(degree: usize, max_degree: usize) -> f64 {
    DEFAULT_NODE_SIZE + NODE_SIZE_RANGE * (degree as f64 / max_degree.max(1) as f64)
}

pub fn node_color(node: &Node, resolver: &IdentityResolver) -> NodeColor {
    match node.ip.as_deref() {
        Some(ip) if resolver.contains(ip) => NodeColor::Resolved,
        _ => NodeColor::Unresolved,
    }
}

/// Assign colours and sizes in place.
pub fn style_graph(graph: &mut BuiltGraph, resolver: &IdentityResolver) {
    let max_degree = graph.max_degree();
    for node in &mut graph.nodes {
        let degree = graph.degrees.get(&node.id).copied().unwrap_or(0);
        node.color = Some(node_color(node, resolver));
        node.size = node_size(degree, max_degree);
    }

    let max_group = graph.max_group_size();
    for members in graph.edge_groups.values() {
        let color = edge_color(members.len(), max_group).to_string();
        for &idx in members {
            let edge = &mut graph.edges[idx];
            tracing::debug!(
                source = %edge.source,
                target = %edge.target,
                %color,
                "Edge colored"
            );
            edge.color = color.clone();
        }
    }
}
