use chrono::{NaiveDateTime, TimeDelta};
use logongraph_core::{GraphError, GraphResult, GraphSnapshot, NodeId, SubGraph};
use logongraph_graph::{LayoutAlgorithm, local_timestamp};
use rand::RngCore;

const FILTER_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Everything within one day after the end bound is still included.
const END_OF_DAY_SECONDS: i64 = 24 * 60 * 60 - 1;

/// Inclusive timestamp window for the date filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateRange {
    pub start: f64,
    pub end: f64,
}

impl DateRange {
    /// Parse local `YYYY-MM-DDTHH:MM` bounds; the end bound is pushed to the
    /// last second of the following 24 hours.
    pub fn parse(start: &str, end: &str) -> GraphResult<Self> {
        let start = parse_local_minute(start)?;
        let end = parse_local_minute(end)?
            .checked_add_signed(TimeDelta::seconds(END_OF_DAY_SECONDS))
            .ok_or_else(|| GraphError::Input(format!("End date out of range: {end}")))?;

        Ok(Self {
            start: to_local_seconds(&start)?,
            end: to_local_seconds(&end)?,
        })
    }

    pub fn contains(&self, timestamp: f64) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

fn parse_local_minute(raw: &str) -> GraphResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), FILTER_DATE_FORMAT).map_err(|_| {
        GraphError::Input(format!("Invalid date '{raw}', expected YYYY-MM-DDTHH:MM"))
    })
}

fn to_local_seconds(naive: &NaiveDateTime) -> GraphResult<f64> {
    local_timestamp(naive)
        .ok_or_else(|| GraphError::Input(format!("{naive} is out of range for the local time zone")))
}

/// Edges touching `id` and the nodes at both of their ends.
pub fn highlight(snapshot: &GraphSnapshot, id: &NodeId) -> SubGraph {
    snapshot.subgraph(Some(id), |edge| edge.touches(id))
}

pub fn filter_by_date(snapshot: &GraphSnapshot, range: DateRange) -> SubGraph {
    snapshot.subgraph(None, |edge| range.contains(edge.timestamp))
}

/// Substring match on the target user name.
pub fn filter_by_user(snapshot: &GraphSnapshot, user: &str) -> SubGraph {
    snapshot.subgraph(None, |edge| edge.user.contains(user))
}

/// Copy of `snapshot` with positions from `algorithm`. Styling is untouched.
pub fn relayout(
    snapshot: &GraphSnapshot,
    algorithm: LayoutAlgorithm,
    rng: &mut dyn RngCore,
) -> GraphResult<GraphSnapshot> {
    let positions = algorithm.compute(snapshot.nodes(), snapshot.edges(), rng)?;
    let mut next = snapshot.clone();
    for id in next.apply_positions(&positions) {
        tracing::error!(node = %id, "Node not found in calculated positions");
    }
    Ok(next)
}
