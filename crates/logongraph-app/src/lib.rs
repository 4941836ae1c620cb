use logongraph_api::{
    ApiError, DateFilterRequest, GraphResponse, HighlightRequest, LayoutRequest, NodeSummaryDto,
    UserFilterRequest,
};
use logongraph_core::GraphSnapshot;
use logongraph_graph::LayoutAlgorithm;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

pub mod ingest;
pub mod query;
pub mod store;

pub use query::DateRange;
pub use store::GraphStore;

/// Transport-agnostic entry point for every graph operation.
///
/// Each call reads the current snapshot once or replaces it wholesale; the
/// HTTP layer only translates requests and errors.
#[derive(Clone, Default)]
pub struct AppController {
    store: Arc<GraphStore>,
}

impl AppController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: Arc<GraphStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<GraphStore> {
        &self.store
    }

    fn snapshot(&self) -> Result<Arc<GraphSnapshot>, ApiError> {
        self.store.require().map_err(ApiError::from)
    }

    /// Import a CSV export and publish it. On any failure the previously
    /// published graph stays in place.
    pub fn upload_csv(&self, bytes: &[u8], layout: &str) -> Result<GraphResponse, ApiError> {
        let start_time = Instant::now();
        let algorithm = LayoutAlgorithm::from_name(layout);

        let snapshot = ingest::read_records(bytes)
            .and_then(|records| {
                ingest::build_snapshot(&records, algorithm, &mut rand::thread_rng())
            })
            .map_err(|e| {
                tracing::error!(error = %e, "Error processing CSV");
                ApiError::from(e)
            })?;

        let published = self.store.replace(snapshot);
        tracing::info!(
            nodes = published.node_count(),
            edges = published.edge_count(),
            layout = %algorithm,
            duration_ms = start_time.elapsed().as_millis() as u64,
            "Graph imported"
        );
        Ok(GraphResponse::from(published.as_ref()))
    }

    pub fn import_path(&self, path: &Path, layout: &str) -> Result<GraphResponse, ApiError> {
        let bytes = std::fs::read(path).map_err(|e| {
            ApiError::invalid_argument(format!("Failed to read {}: {e}", path.display()))
        })?;
        self.upload_csv(&bytes, layout)
    }

    pub fn highlight(&self, req: HighlightRequest) -> Result<GraphResponse, ApiError> {
        let snapshot = self.snapshot()?;
        let id = req.node_id.to_core()?;
        Ok(query::highlight(&snapshot, &id).into())
    }

    pub fn list_nodes(&self) -> Result<Vec<NodeSummaryDto>, ApiError> {
        let snapshot = self.snapshot()?;
        Ok(snapshot
            .nodes()
            .iter()
            .map(|node| NodeSummaryDto {
                id: (&node.id).into(),
                label: node.label.clone(),
            })
            .collect())
    }

    pub fn full_graph(&self) -> Result<GraphResponse, ApiError> {
        let snapshot = self.snapshot()?;
        Ok(GraphResponse::from(snapshot.as_ref()))
    }

    pub fn filter_by_date(&self, req: DateFilterRequest) -> Result<GraphResponse, ApiError> {
        let snapshot = self.snapshot()?;
        let range = DateRange::parse(&req.start_date, &req.end_date)?;
        Ok(query::filter_by_date(&snapshot, range).into())
    }

    pub fn filter_by_user(&self, req: UserFilterRequest) -> Result<GraphResponse, ApiError> {
        let snapshot = self.snapshot()?;
        Ok(query::filter_by_user(&snapshot, &req.user).into())
    }

    /// Recompute positions for the current graph and publish the result.
    pub fn change_layout(&self, req: LayoutRequest) -> Result<GraphResponse, ApiError> {
        let algorithm = LayoutAlgorithm::from_name(&req.layout);
        let updated = self
            .store
            .update(|current| query::relayout(current, algorithm, &mut rand::thread_rng()))
            .map_err(|e| {
                tracing::warn!(error = %e, layout = %algorithm, "Layout change rejected");
                ApiError::from(e)
            })?;

        tracing::info!(layout = %algorithm, nodes = updated.node_count(), "Layout updated");
        Ok(GraphResponse::from(updated.as_ref()))
    }
}
