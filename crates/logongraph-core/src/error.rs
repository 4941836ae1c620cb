use thiserror::Error;

/// Failure modes of the layout engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("One or more nodes are missing IP addresses. All nodes must have IP addresses.")]
    NoGroupableNodes,
}

/// Error taxonomy shared by ingestion, the graph store and the query layer.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Missing or malformed caller input (file, fields, request bodies).
    #[error("{0}")]
    Input(String),

    /// A row could not be interpreted. Aborts the whole import.
    #[error("row {row}: {message}")]
    Parse { row: usize, message: String },

    #[error("malformed CSV: {0}")]
    Csv(String),

    #[error("no logon events with a time, computer and source IP were found")]
    EmptyDataset,

    #[error("No graph data available")]
    NoSnapshot,

    #[error("edge references unknown node '{0}'")]
    DanglingEdge(String),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

pub type GraphResult<T> = Result<T, GraphError>;
