use logongraph_core::{Edge, LayoutError, Node, NodeId, Position};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::fmt;
use std::net::Ipv4Addr;

pub type Positions = HashMap<NodeId, Position>;

/// Assigns a 3D position to every node.
///
/// Layouters are stateless; the random source is passed in so callers can
/// seed it.
pub trait Layouter {
    fn execute(
        &self,
        nodes: &[Node],
        edges: &[Edge],
        rng: &mut dyn RngCore,
    ) -> Result<Positions, LayoutError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutAlgorithm {
    #[default]
    Grid,
    Circular,
    Random,
    Smart,
}

impl LayoutAlgorithm {
    /// Unknown names fall back to [`LayoutAlgorithm::Random`].
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "grid" => Self::Grid,
            "circular" => Self::Circular,
            "random" => Self::Random,
            "smart" => Self::Smart,
            other => {
                tracing::debug!(layout = other, "Unknown layout, using random");
                Self::Random
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Circular => "circular",
            Self::Random => "random",
            Self::Smart => "smart",
        }
    }

    pub fn layouter(&self) -> Box<dyn Layouter + Send + Sync> {
        match self {
            Self::Grid => Box::new(GridLayouter::default()),
            Self::Circular => Box::new(CircularLayouter::default()),
            Self::Random => Box::new(RandomLayouter::default()),
            Self::Smart => Box::new(SmartLayouter::default()),
        }
    }

    pub fn compute(
        &self,
        nodes: &[Node],
        edges: &[Edge],
        rng: &mut dyn RngCore,
    ) -> Result<Positions, LayoutError> {
        self.layouter().execute(nodes, edges, rng)
    }
}

impl fmt::Display for LayoutAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row-major square grid, `ceil(sqrt(n))` cells per side.
pub struct GridLayouter {
    pub spacing: f64,
}

impl GridLayouter {
    pub const DEFAULT_SPACING: f64 = 300.0;
}

impl Default for GridLayouter {
    fn default() -> Self {
        Self {
            spacing: Self::DEFAULT_SPACING,
        }
    }
}

impl Layouter for GridLayouter {
    fn execute(
        &self,
        nodes: &[Node],
        _edges: &[Edge],
        _rng: &mut dyn RngCore,
    ) -> Result<Positions, LayoutError> {
        let cols = grid_side(nodes.len());
        Ok(nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let row = (i / cols) as f64;
                let col = (i % cols) as f64;
                (
                    node.id.clone(),
                    Position::new(col * self.spacing, row * self.spacing, 0.0),
                )
            })
            .collect())
    }
}

fn grid_side(count: usize) -> usize {
    ((count as f64).sqrt().ceil() as usize).max(1)
}

/// Evenly spaced on a flat ring around the origin.
pub struct CircularLayouter {
    pub radius: f64,
}

impl CircularLayouter {
    pub const DEFAULT_RADIUS: f64 = 300.0;
}

impl Default for CircularLayouter {
    fn default() -> Self {
        Self {
            radius: Self::DEFAULT_RADIUS,
        }
    }
}

impl Layouter for CircularLayouter {
    fn execute(
        &self,
        nodes: &[Node],
        _edges: &[Edge],
        _rng: &mut dyn RngCore,
    ) -> Result<Positions, LayoutError> {
        Ok(nodes
            .iter()
            .zip(ring(nodes.len(), self.radius))
            .map(|(node, (x, y))| (node.id.clone(), Position::new(x, y, 0.0)))
            .collect())
    }
}

/// `count` points at angles `i * 2π / count` on a circle of `radius`.
fn ring(count: usize, radius: f64) -> impl Iterator<Item = (f64, f64)> {
    let step = if count == 0 { 0.0 } else { TAU / count as f64 };
    (0..count).map(move |i| {
        let angle = i as f64 * step;
        (radius * angle.cos(), radius * angle.sin())
    })
}

/// Independent uniform coordinates in `[-extent, extent]` on every axis.
pub struct RandomLayouter {
    pub extent: f64,
}

impl RandomLayouter {
    pub const DEFAULT_EXTENT: f64 = 10_000.0;
}

impl Default for RandomLayouter {
    fn default() -> Self {
        Self {
            extent: Self::DEFAULT_EXTENT,
        }
    }
}

impl RandomLayouter {
    fn place<'a>(
        &self,
        nodes: impl Iterator<Item = &'a Node>,
        rng: &mut dyn RngCore,
        positions: &mut Positions,
    ) {
        let range = -self.extent..=self.extent;
        for node in nodes {
            let position = Position::new(
                rng.gen_range(range.clone()),
                rng.gen_range(range.clone()),
                rng.gen_range(range.clone()),
            );
            positions.insert(node.id.clone(), position);
        }
    }
}

impl Layouter for RandomLayouter {
    fn execute(
        &self,
        nodes: &[Node],
        _edges: &[Edge],
        rng: &mut dyn RngCore,
    ) -> Result<Positions, LayoutError> {
        let mut positions = HashMap::with_capacity(nodes.len());
        self.place(nodes.iter(), rng, &mut positions);
        Ok(positions)
    }
}

/// Clusters hosts by the third octet of their IPv4 address.
///
/// Each subnet gets a centre on a large ring; its members sit on a small ring
/// around that centre with some jitter, lifted along z by their degree.
/// Nodes without a usable address are scattered in a smaller random cube.
pub struct SmartLayouter {
    pub group_radius: f64,
    pub member_radius: f64,
    pub jitter: f64,
    pub degree_lift: f64,
    pub ungrouped: RandomLayouter,
}

impl Default for SmartLayouter {
    fn default() -> Self {
        Self {
            group_radius: 4000.0,
            member_radius: 600.0,
            jitter: 300.0,
            degree_lift: 50.0,
            ungrouped: RandomLayouter { extent: 5000.0 },
        }
    }
}

impl SmartLayouter {
    fn subnet_key(node: &Node) -> Option<u8> {
        let ip: Ipv4Addr = node.ip.as_deref()?.trim().parse().ok()?;
        Some(ip.octets()[2])
    }

    /// Groups in first-seen order.
    fn group_by_subnet(nodes: &[Node]) -> Vec<(u8, Vec<&Node>)> {
        let mut groups: Vec<(u8, Vec<&Node>)> = Vec::new();
        let mut slots: HashMap<u8, usize> = HashMap::new();
        for node in nodes {
            let Some(key) = Self::subnet_key(node) else {
                continue;
            };
            let slot = *slots.entry(key).or_insert_with(|| {
                groups.push((key, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(node);
        }
        groups
    }
}

fn degree_counts(edges: &[Edge]) -> HashMap<&NodeId, usize> {
    let mut degrees = HashMap::new();
    for edge in edges {
        *degrees.entry(&edge.source).or_default() += 1;
        *degrees.entry(&edge.target).or_default() += 1;
    }
    degrees
}

impl Layouter for SmartLayouter {
    fn execute(
        &self,
        nodes: &[Node],
        edges: &[Edge],
        rng: &mut dyn RngCore,
    ) -> Result<Positions, LayoutError> {
        let groups = Self::group_by_subnet(nodes);
        if groups.is_empty() && !nodes.is_empty() {
            return Err(LayoutError::NoGroupableNodes);
        }

        let degrees = degree_counts(edges);
        let mut positions = HashMap::with_capacity(nodes.len());
        let jitter = -self.jitter..=self.jitter;

        for ((subnet, members), (cx, cy)) in groups.iter().zip(ring(groups.len(), self.group_radius))
        {
            tracing::trace!(subnet, members = members.len(), "Placing subnet group");
            for (node, (dx, dy)) in members.iter().zip(ring(members.len(), self.member_radius)) {
                let degree = degrees.get(&node.id).copied().unwrap_or(0) as f64;
                let x = cx + dx + rng.gen_range(jitter.clone());
                let y = cy + dy + rng.gen_range(jitter.clone());
                positions.insert(node.id.clone(), Position::new(x, y, degree * self.degree_lift));
            }
        }

        let ungrouped: Vec<&Node> = nodes
            .iter()
            .filter(|n| !positions.contains_key(&n.id))
            .collect();
        self.ungrouped
            .place(ungrouped.into_iter(), rng, &mut positions);

        Ok(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn node(id: &str, ip: Option<&str>) -> Node {
        Node::new(NodeId::from(id), id, ip.map(str::to_string))
    }

    fn nodes(count: usize) -> Vec<Node> {
        (0..count).map(|i| node(&format!("n{i}"), None)).collect()
    }

    fn edge(source: &str, target: &str) -> Edge {
        Edge {
            source: NodeId::from(source),
            target: NodeId::from(target),
            timestamp: 0.0,
            user: String::new(),
            color: String::new(),
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn from_name_falls_back_to_random() {
        assert_eq!(LayoutAlgorithm::from_name("grid"), LayoutAlgorithm::Grid);
        assert_eq!(LayoutAlgorithm::from_name("smart"), LayoutAlgorithm::Smart);
        assert_eq!(LayoutAlgorithm::from_name("spiral"), LayoutAlgorithm::Random);
    }

    #[test]
    fn grid_places_rows_of_ceil_sqrt() {
        let nodes = nodes(5);
        let positions = GridLayouter::default()
            .execute(&nodes, &[], &mut rng())
            .expect("grid");

        assert_eq!(positions[&NodeId::from("n0")], Position::new(0.0, 0.0, 0.0));
        assert_eq!(positions[&NodeId::from("n2")], Position::new(600.0, 0.0, 0.0));
        assert_eq!(positions[&NodeId::from("n3")], Position::new(0.0, 300.0, 0.0));
        assert_eq!(positions[&NodeId::from("n4")], Position::new(300.0, 300.0, 0.0));
    }

    #[test]
    fn circular_starts_on_positive_x_axis() {
        let nodes = nodes(4);
        let positions = CircularLayouter::default()
            .execute(&nodes, &[], &mut rng())
            .expect("circular");

        let first = positions[&NodeId::from("n0")];
        assert_eq!((first.x, first.y, first.z), (300.0, 0.0, 0.0));
        let second = positions[&NodeId::from("n1")];
        assert!(second.x.abs() < 1e-9 && (second.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn random_stays_within_extent() {
        let nodes = nodes(50);
        let positions = RandomLayouter::default()
            .execute(&nodes, &[], &mut rng())
            .expect("random");

        assert_eq!(positions.len(), 50);
        for p in positions.values() {
            for v in [p.x, p.y, p.z] {
                assert!((-10_000.0..=10_000.0).contains(&v));
            }
        }
    }

    #[test]
    fn smart_clusters_by_third_octet() {
        let nodes = vec![
            node("a", Some("10.0.1.5")),
            node("b", Some("10.0.1.6")),
            node("c", Some("10.0.2.5")),
            node("host", None),
        ];
        let edges = vec![edge("a", "host"), edge("a", "host"), edge("c", "host")];
        let positions = SmartLayouter::default()
            .execute(&nodes, &edges, &mut rng())
            .expect("smart");

        assert_eq!(positions.len(), 4);

        // Subnet 1 is centred at (4000, 0); members sit 600 away, ±300 jitter.
        let a = positions[&NodeId::from("a")];
        let dist = ((a.x - 4000.0).powi(2) + a.y.powi(2)).sqrt();
        assert!(dist <= 600.0 + 300.0 * 2f64.sqrt() + 1e-9);
        assert_eq!(a.z, 100.0);
        assert_eq!(positions[&NodeId::from("b")].z, 0.0);
        assert_eq!(positions[&NodeId::from("c")].z, 50.0);

        // Subnet 2 is centred at (-4000, 0).
        let c = positions[&NodeId::from("c")];
        assert!(c.x < -2000.0);

        let host = positions[&NodeId::from("host")];
        for v in [host.x, host.y, host.z] {
            assert!((-5000.0..=5000.0).contains(&v));
        }
    }

    #[test]
    fn smart_requires_groupable_nodes() {
        let nodes = vec![node("host1", None), node("weird", Some("not-an-ip"))];
        let err = SmartLayouter::default()
            .execute(&nodes, &[], &mut rng())
            .expect_err("no subnets");
        assert_eq!(err, LayoutError::NoGroupableNodes);
    }

    #[test]
    fn smart_on_empty_graph_is_empty() {
        let positions = SmartLayouter::default()
            .execute(&[], &[], &mut rng())
            .expect("empty");
        assert!(positions.is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashSet;

        proptest! {
            #[test]
            fn prop_grid_cells_are_distinct(count in 1usize..200) {
                let nodes = nodes(count);
                let positions = GridLayouter::default()
                    .execute(&nodes, &[], &mut rng())
                    .expect("grid");
                let side = (count as f64).sqrt().ceil() as i64;

                let mut cells = HashSet::new();
                for p in positions.values() {
                    let col = (p.x / 300.0).round() as i64;
                    let row = (p.y / 300.0).round() as i64;
                    prop_assert_eq!(p.x, col as f64 * 300.0);
                    prop_assert_eq!(p.y, row as f64 * 300.0);
                    prop_assert_eq!(p.z, 0.0);
                    prop_assert!(col < side && row < side);
                    prop_assert!(cells.insert((row, col)));
                }
            }

            #[test]
            fn prop_circular_radius_and_spacing(count in 1usize..200) {
                let nodes = nodes(count);
                let positions = CircularLayouter::default()
                    .execute(&nodes, &[], &mut rng())
                    .expect("circular");
                let step = TAU / count as f64;

                for (i, node) in nodes.iter().enumerate() {
                    let p = positions[&node.id];
                    prop_assert!(((p.x * p.x + p.y * p.y).sqrt() - 300.0).abs() < 1e-6);
                    prop_assert_eq!(p.z, 0.0);
                    let expected = i as f64 * step;
                    prop_assert!((p.x - 300.0 * expected.cos()).abs() < 1e-6);
                    prop_assert!((p.y - 300.0 * expected.sin()).abs() < 1e-6);
                }
            }
        }
    }
}
