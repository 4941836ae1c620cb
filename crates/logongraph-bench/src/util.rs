use logongraph_core::{LogonRecord, Node, NodeId};

const HEADER: &str = "EventTime,Computer,EventData.IpAddress,EventData.TargetUserName,IpResolved\n";

/// Rows spread over `host_count` hosts in a handful of /24 subnets. Every
/// third source IP resolves to a workstation name.
pub fn synthetic_records(row_count: usize, host_count: usize) -> Vec<LogonRecord> {
    let host_count = host_count.max(1);
    (0..row_count)
        .map(|i| {
            let source = i % host_count;
            let target = (i * 7 + 3) % host_count;
            let ip = format!("10.0.{}.{}", source % 8, source / 8 % 250 + 1);
            let resolved = if source % 3 == 0 {
                format!("ws{source:04}.corp.local")
            } else {
                String::new()
            };
            LogonRecord::new(
                format!("2023-01-{:02}T{:02}:00:00Z", i % 28 + 1, i % 24),
                format!("srv{target:04}.corp.local"),
                ip,
                format!("user{}", i % 50),
                resolved,
            )
        })
        .collect()
}

/// The same rows rendered as an uploadable export.
pub fn synthetic_csv(row_count: usize, host_count: usize) -> Vec<u8> {
    let mut out = String::from(HEADER);
    for record in synthetic_records(row_count, host_count) {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            record.event_time,
            record.computer,
            record.ip_address,
            record.target_user,
            record.ip_resolved
        ));
    }
    out.into_bytes()
}

pub fn synthetic_nodes(count: usize) -> Vec<Node> {
    (0..count)
        .map(|i| {
            let ip = format!("10.0.{}.{}", i % 16, i / 16 % 250 + 1);
            Node::new(NodeId::new(format!("node_{i}")), format!("Node_{i}"), Some(ip))
        })
        .collect()
}
