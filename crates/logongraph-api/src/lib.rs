mod dto;
mod errors;
mod ids;

pub use dto::{
    DateFilterRequest, GraphEdgeDto, GraphNodeDto, GraphResponse, HighlightRequest, LayoutRequest,
    NodeSummaryDto, UserFilterRequest, default_layout_name,
};
pub use errors::ApiError;
pub use ids::NodeId;
