use logongraph_api::{
    DateFilterRequest, GraphResponse, HighlightRequest, LayoutRequest, NodeId, UserFilterRequest,
};
use logongraph_app::AppController;
use std::collections::HashSet;
use std::fs;
use tempfile::tempdir;

const HEADER: &str = "EventTime,Computer,EventData.IpAddress,EventData.TargetUserName,IpResolved\n";

fn csv(rows: &[&str]) -> String {
    let mut out = HEADER.to_string();
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    out
}

fn two_row_export() -> String {
    csv(&[
        "2023-01-01T00:00:00Z,host1.local,10.0.0.1,alice,client1.local",
        "2023-01-02T00:00:00Z,host1.local,10.0.0.1,bob,client1.local",
    ])
}

fn mixed_export() -> String {
    csv(&[
        "2023-01-01T08:00:00Z,dc01.corp.local,10.0.1.5,alice,ws01.corp.local",
        "2023-01-01T09:00:00Z,dc01.corp.local,10.0.1.5,alice,ws01.corp.local",
        "2023-01-01T10:00:00Z,dc01.corp.local,10.0.1.5,alice,ws01.corp.local",
        "2023-01-02T08:00:00Z,fs01.corp.local,10.0.2.7,bob,",
        "2023-01-03T08:00:00Z,ws01.corp.local,10.0.3.9,svc_backup,db01.corp.local",
        "2023-01-03T09:00:00Z,,10.0.3.9,nobody,db01.corp.local",
    ])
}

fn assert_referential_integrity(graph: &GraphResponse) {
    let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.0.as_str()).collect();
    assert_eq!(ids.len(), graph.nodes.len(), "node ids must be unique");
    for edge in &graph.edges {
        assert!(ids.contains(edge.source.0.as_str()), "dangling source {:?}", edge.source);
        assert!(ids.contains(edge.target.0.as_str()), "dangling target {:?}", edge.target);
    }
}

fn node_ids(graph: &GraphResponse) -> Vec<&str> {
    graph.nodes.iter().map(|n| n.id.0.as_str()).collect()
}

#[test]
fn two_row_export_builds_expected_graph() {
    let controller = AppController::new();
    let graph = controller
        .upload_csv(two_row_export().as_bytes(), "grid")
        .expect("upload");

    assert_eq!(node_ids(&graph), vec!["client1", "host1"]);
    assert_eq!(graph.edges.len(), 2);
    assert_eq!(graph.edges[0].color, graph.edges[1].color);
    assert_referential_integrity(&graph);

    let client = &graph.nodes[0];
    assert_eq!(client.label, "client1 (10.0.0.1)");
    assert_eq!(client.ip.as_deref(), Some("10.0.0.1"));
    assert_eq!(client.color, "blue");
    assert_eq!(client.size, 30.0);

    let by_user = controller
        .filter_by_user(UserFilterRequest {
            user: "alice".into(),
        })
        .expect("filter");
    assert_eq!(by_user.edges.len(), 1);
    assert_eq!(by_user.nodes.len(), 2);
}

#[test]
fn every_snapshot_keeps_edges_anchored() {
    let controller = AppController::new();
    let graph = controller
        .upload_csv(mixed_export().as_bytes(), "circular")
        .expect("upload");

    assert_eq!(graph.edges.len(), 5, "rows without a computer are skipped");
    assert_referential_integrity(&graph);

    for layout in ["grid", "random", "smart", "circular"] {
        let relaid = controller
            .change_layout(LayoutRequest {
                layout: layout.into(),
            })
            .expect("layout");
        assert_referential_integrity(&relaid);
        assert_eq!(relaid.edges, graph.edges, "{layout} must not restyle edges");
    }
}

#[test]
fn unresolved_sources_are_red_and_hotter_groups_differ() {
    let controller = AppController::new();
    let graph = controller
        .upload_csv(mixed_export().as_bytes(), "grid")
        .expect("upload");

    let fs_source = graph
        .nodes
        .iter()
        .find(|n| n.id.0 == "10.0.2.7")
        .expect("unresolved source node");
    assert_eq!(fs_source.color, "red");
    assert_eq!(fs_source.label, "10.0.2.7");

    let busy = &graph.edges[0];
    let quiet = &graph.edges[3];
    assert_eq!(busy.color, graph.edges[1].color);
    assert_ne!(busy.color, quiet.color);
}

#[test]
fn target_first_host_is_enriched_when_it_logs_on() {
    let controller = AppController::new();
    let export = csv(&[
        "2023-01-01T08:00:00Z,fs01.corp.local,10.0.2.7,bob,",
        "2023-01-01T09:00:00Z,dc01.corp.local,10.0.2.8,bob,fs01.corp.local",
    ]);
    let graph = controller
        .upload_csv(export.as_bytes(), "grid")
        .expect("upload");

    assert_eq!(node_ids(&graph), vec!["10.0.2.7", "fs01", "dc01"]);
    let fs01 = &graph.nodes[1];
    assert_eq!(fs01.label, "fs01 (10.0.2.8)");
    assert_eq!(fs01.ip.as_deref(), Some("10.0.2.8"));
    assert_eq!(fs01.color, "blue");
    assert_eq!(graph.nodes[2].color, "red");
}

#[test]
fn highlight_returns_incident_edges_only() {
    let controller = AppController::new();
    controller
        .upload_csv(mixed_export().as_bytes(), "grid")
        .expect("upload");

    let view = controller
        .highlight(HighlightRequest {
            node_id: NodeId("dc01".into()),
        })
        .expect("highlight");
    assert_eq!(view.edges.len(), 3);
    assert!(view.edges.iter().all(|e| e.target.0 == "dc01"));
    assert_eq!(node_ids(&view), vec!["ws01", "dc01"]);

    let missing = controller
        .highlight(HighlightRequest {
            node_id: NodeId("nope".into()),
        })
        .expect("highlight");
    assert!(missing.nodes.is_empty() && missing.edges.is_empty());
}

#[test]
fn date_filter_outside_and_covering() {
    let controller = AppController::new();
    let full = controller
        .upload_csv(mixed_export().as_bytes(), "grid")
        .expect("upload");

    let outside = controller
        .filter_by_date(DateFilterRequest {
            start_date: "2030-01-01T00:00".into(),
            end_date: "2030-02-01T00:00".into(),
        })
        .expect("filter");
    assert!(outside.edges.is_empty());
    assert!(outside.nodes.is_empty());

    let covering = controller
        .filter_by_date(DateFilterRequest {
            start_date: "2000-01-01T00:00".into(),
            end_date: "2040-01-01T00:00".into(),
        })
        .expect("filter");
    assert_eq!(covering.edges, full.edges);
    assert_referential_integrity(&covering);
}

#[test]
fn malformed_date_filter_is_invalid_argument() {
    let controller = AppController::new();
    controller
        .upload_csv(two_row_export().as_bytes(), "grid")
        .expect("upload");

    let err = controller
        .filter_by_date(DateFilterRequest {
            start_date: "yesterday".into(),
            end_date: "2023-01-01T00:00".into(),
        })
        .expect_err("bad date");
    assert_eq!(err.code, "invalid_argument");
}

#[test]
fn failed_upload_keeps_previous_graph() {
    let controller = AppController::new();
    let first = controller
        .upload_csv(two_row_export().as_bytes(), "grid")
        .expect("upload");

    let bad_time = csv(&["not-a-time,host9,10.9.9.9,eve,"]);
    let err = controller
        .upload_csv(bad_time.as_bytes(), "grid")
        .expect_err("bad timestamp");
    assert_eq!(err.code, "processing_error");
    assert!(err.message.contains("row 1"), "{}", err.message);

    let only_skipped = csv(&["2023-01-01T00:00:00Z,,10.0.0.1,alice,"]);
    let err = controller
        .upload_csv(only_skipped.as_bytes(), "grid")
        .expect_err("empty dataset");
    assert_eq!(err.code, "processing_error");

    assert_eq!(controller.full_graph().expect("graph"), first);
}

#[test]
fn smart_layout_without_ipv4_sources_is_rejected() {
    let controller = AppController::new();
    let export = csv(&["2023-01-01T00:00:00Z,host1,unknown,alice,"]);

    let err = controller
        .upload_csv(export.as_bytes(), "smart")
        .expect_err("no groupable nodes");
    assert_eq!(err.code, "layout_error");
    assert_eq!(
        controller.full_graph().expect_err("nothing published").code,
        "no_graph_data"
    );

    let graph = controller
        .upload_csv(export.as_bytes(), "grid")
        .expect("grid upload");
    let err = controller
        .change_layout(LayoutRequest {
            layout: "smart".into(),
        })
        .expect_err("no groupable nodes");
    assert_eq!(err.code, "layout_error");
    assert_eq!(controller.full_graph().expect("graph"), graph);
}

#[test]
fn unknown_layout_names_fall_back_to_random() {
    let controller = AppController::new();
    let graph = controller
        .upload_csv(two_row_export().as_bytes(), "spiral")
        .expect("upload");
    assert!(
        graph
            .nodes
            .iter()
            .all(|n| n.x.abs() <= 10_000.0 && n.y.abs() <= 10_000.0 && n.z.abs() <= 10_000.0)
    );
}

#[test]
fn import_path_reads_export_from_disk() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("logons.csv");
    fs::write(&path, two_row_export())?;

    let controller = AppController::new();
    let graph = controller
        .import_path(&path, "circular")
        .map_err(|e| anyhow::anyhow!("{e:?}"))?;
    assert_eq!(graph.nodes.len(), 2);

    let err = controller
        .import_path(&dir.path().join("missing.csv"), "grid")
        .expect_err("missing file");
    assert_eq!(err.code, "invalid_argument");
    Ok(())
}
