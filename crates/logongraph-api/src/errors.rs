use logongraph_core::GraphError;
use serde::{Deserialize, Serialize};
use specta::Type;

/// Structured error returned by every endpoint as `{"code", "error"}`.
#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct ApiError {
    pub code: String,
    #[serde(rename = "error")]
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("invalid_argument", message)
    }

    pub fn no_graph_data() -> Self {
        Self::new("no_graph_data", GraphError::NoSnapshot.to_string())
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::new("processing_error", message)
    }

    pub fn layout(message: impl Into<String>) -> Self {
        Self::new("layout_error", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal", message)
    }
}

impl From<GraphError> for ApiError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::Input(message) => Self::invalid_argument(message),
            GraphError::NoSnapshot => Self::no_graph_data(),
            GraphError::Layout(err) => Self::layout(err.to_string()),
            err @ (GraphError::Parse { .. } | GraphError::Csv(_) | GraphError::EmptyDataset) => {
                Self::processing(err.to_string())
            }
            err @ GraphError::DanglingEdge(_) => Self::internal(err.to_string()),
        }
    }
}
