use crate::resolver::{IdentityResolver, strip_domain};
use crate::time::parse_event_time;
use logongraph_core::{Edge, GraphError, GraphResult, LogonRecord, Node, NodeId};
use std::collections::HashMap;

/// Unordered node pair shared by all edges of one group.
pub type GroupKey = (NodeId, NodeId);

/// Output of the builder: nodes in first-seen order, edges in row order,
/// plus the aggregates the styling pass needs.
#[derive(Debug, Clone, Default)]
pub struct BuiltGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Edge indices per unordered node pair.
    pub edge_groups: HashMap<GroupKey, Vec<usize>>,
    /// Number of edges touching each node.
    pub degrees: HashMap<NodeId, usize>,
}

impl BuiltGraph {
    pub fn degree(&self, id: &NodeId) -> usize {
        self.degrees.get(id).copied().unwrap_or(0)
    }

    pub fn max_degree(&self) -> usize {
        self.degrees.values().copied().max().unwrap_or(0)
    }

    pub fn max_group_size(&self) -> usize {
        self.edge_groups.values().map(Vec::len).max().unwrap_or(0)
    }
}

/// Incremental graph construction over logon rows.
pub struct GraphBuilder<'a> {
    resolver: &'a IdentityResolver,
    nodes: Vec<Node>,
    node_map: HashMap<NodeId, usize>,
    edges: Vec<Edge>,
    edge_groups: HashMap<GroupKey, Vec<usize>>,
    degrees: HashMap<NodeId, usize>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(resolver: &'a IdentityResolver) -> Self {
        Self {
            resolver,
            nodes: Vec::new(),
            node_map: HashMap::new(),
            edges: Vec::new(),
            edge_groups: HashMap::new(),
            degrees: HashMap::new(),
        }
    }

    fn ensure_node(&mut self, id: &NodeId, label: &str, ip: Option<&str>) -> usize {
        if let Some(&idx) = self.node_map.get(id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes
            .push(Node::new(id.clone(), label, ip.map(str::to_string)));
        self.node_map.insert(id.clone(), idx);
        idx
    }

    /// Add one row. Returns `Ok(false)` when the row is not a usable event.
    ///
    /// `row` is the 1-based data row number used in error messages.
    pub fn add_record(&mut self, row: usize, record: &LogonRecord) -> GraphResult<bool> {
        let target = strip_domain(&record.computer);
        if !record.is_event() || target.is_empty() {
            return Ok(false);
        }

        let timestamp = parse_event_time(&record.event_time)
            .map_err(|message| GraphError::Parse { row, message })?;

        let ip = record.ip_address.as_str();
        let (source_id, source_label) = match self.resolver.resolve(ip) {
            Some(host) => (NodeId::new(host), format!("{host} ({ip})")),
            None => (NodeId::new(ip), ip.to_string()),
        };
        let target_id = NodeId::new(target);

        let source_idx = self.ensure_node(&source_id, &source_label, Some(ip));
        // Hosts first seen as targets learn their address once they log on
        // somewhere themselves.
        let source = &mut self.nodes[source_idx];
        if source.ip.is_none() {
            source.label = source_label;
            source.ip = Some(ip.to_string());
        }
        // Targets are labelled with their own name only; the row's IP belongs
        // to the source.
        self.ensure_node(&target_id, target_id.as_str(), None);

        let edge = Edge {
            source: source_id,
            target: target_id,
            timestamp,
            user: record.target_user.clone(),
            color: String::new(),
        };

        let edge_idx = self.edges.len();
        self.edge_groups
            .entry(edge.group_key())
            .or_default()
            .push(edge_idx);
        *self.degrees.entry(edge.source.clone()).or_default() += 1;
        *self.degrees.entry(edge.target.clone()).or_default() += 1;
        self.edges.push(edge);

        Ok(true)
    }

    pub fn finish(self) -> GraphResult<BuiltGraph> {
        if self.edges.is_empty() {
            return Err(GraphError::EmptyDataset);
        }
        Ok(BuiltGraph {
            nodes: self.nodes,
            edges: self.edges,
            edge_groups: self.edge_groups,
            degrees: self.degrees,
        })
    }
}

/// Build the graph for a whole export. The first malformed row aborts.
pub fn build_graph(records: &[LogonRecord], resolver: &IdentityResolver) -> GraphResult<BuiltGraph> {
    let mut builder = GraphBuilder::new(resolver);
    let mut skipped = 0usize;
    for (idx, record) in records.iter().enumerate() {
        if !builder.add_record(idx + 1, record)? {
            skipped += 1;
        }
    }
    if skipped > 0 {
        tracing::warn!(skipped, "Rows without time, computer or source IP ignored");
    }
    builder.finish()
}
