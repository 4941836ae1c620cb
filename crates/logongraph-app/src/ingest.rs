use logongraph_core::{GraphError, GraphResult, GraphSnapshot, LogonRecord};
use logongraph_graph::{IdentityResolver, LayoutAlgorithm, build_graph, style_graph};
use rand::RngCore;

const UTF8_BOM: char = '\u{feff}';

/// Decode an uploaded export into rows. A leading byte-order mark is
/// ignored; structurally broken CSV fails the whole import.
pub fn read_records(bytes: &[u8]) -> GraphResult<Vec<LogonRecord>> {
    let content = std::str::from_utf8(bytes)
        .map_err(|e| GraphError::Csv(format!("file is not valid UTF-8: {e}")))?;
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new().from_reader(content.as_bytes());
    reader
        .deserialize::<LogonRecord>()
        .map(|row| row.map_err(|e| GraphError::Csv(e.to_string())))
        .collect()
}

/// Resolve, build, style and lay out a complete snapshot.
pub fn build_snapshot(
    records: &[LogonRecord],
    algorithm: LayoutAlgorithm,
    rng: &mut dyn RngCore,
) -> GraphResult<GraphSnapshot> {
    let resolver = IdentityResolver::from_records(records);
    let mut graph = build_graph(records, &resolver)?;
    style_graph(&mut graph, &resolver);

    let positions = algorithm.compute(&graph.nodes, &graph.edges, rng)?;
    let mut snapshot = GraphSnapshot::new(graph.nodes, graph.edges)?;
    for id in snapshot.apply_positions(&positions) {
        tracing::error!(node = %id, "Node not found in calculated positions");
    }

    tracing::debug!(
        resolved_ips = resolver.len(),
        nodes = snapshot.node_count(),
        edges = snapshot.edge_count(),
        layout = %algorithm,
        "Snapshot built"
    );
    Ok(snapshot)
}
