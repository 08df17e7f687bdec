use std::collections::TryReserveError;
use std::fmt;

/// Machine-readable error codes for tool-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    SelfLoop,
    NodeOutOfRange,
    InvalidArgument,
    EdgeNotFound,
    LabelNotFound,
    TargetUnreachable,
    RemovalShortfall,
    AllocationFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::SelfLoop => "E1001",
            Self::NodeOutOfRange => "E1002",
            Self::InvalidArgument => "E1003",
            Self::EdgeNotFound => "E2001",
            Self::LabelNotFound => "E2002",
            Self::TargetUnreachable => "E3001",
            Self::RemovalShortfall => "E3002",
            Self::AllocationFailed => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::SelfLoop => "Self-loops are not allowed",
            Self::NodeOutOfRange => "Node id out of range",
            Self::InvalidArgument => "Invalid argument",
            Self::EdgeNotFound => "Edge not found",
            Self::LabelNotFound => "Label not found",
            Self::TargetUnreachable => "Target cannot be reached",
            Self::RemovalShortfall => "Fewer edges removed than requested",
            Self::AllocationFailed => "Allocation failed",
        }
    }

    /// Optional remediation hint that can be surfaced by the tools.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::SelfLoop => Some("Drop diagonal entries before building the graph."),
            Self::NodeOutOfRange => Some("Node ids must be below the graph's node count."),
            Self::InvalidArgument => None,
            Self::EdgeNotFound => Some("Check the edge with `are_neighbours` before removing it."),
            Self::LabelNotFound => None,
            Self::TargetUnreachable => {
                Some("Lower the component target or the ignorable component size.")
            }
            Self::RemovalShortfall => {
                Some("The removal strategy stopped offering edges; check for non-finite weights.")
            }
            Self::AllocationFailed => Some("Retry on a machine with more memory."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors returned by graph construction, mutation and analysis.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// `u == v` in an edge operation.
    #[error("self-loop on node {node} rejected")]
    SelfLoop { node: u32 },

    /// Node id is not below the graph's node count.
    #[error("node {node} out of range: graph has {num_nodes} nodes")]
    NodeOutOfRange { node: u32, num_nodes: usize },

    /// The edge `u -> v` does not exist.
    #[error("edge {u} -> {v} does not exist")]
    EdgeNotFound { u: u32, v: u32 },

    /// No node carries the requested label value.
    #[error("no node carries label {0}")]
    LabelNotFound(u32),

    /// A parameter failed validation before any work was done.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An iterative operation ran out of edges before reaching its goal.
    #[error("target of {target} components unreachable: reached {reached} after removing every edge")]
    TargetUnreachable { target: usize, reached: usize },

    /// A fixed-count removal ended before removing every requested edge.
    #[error("asked to remove {requested} edges, strategy stopped after {removed}")]
    RemovalShortfall { requested: usize, removed: usize },

    /// Reserving storage for a graph or a working copy failed.
    #[error("allocation failed: {0}")]
    Allocation(String),
}

impl GraphError {
    /// The stable error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::SelfLoop { .. } => ErrorCode::SelfLoop,
            Self::NodeOutOfRange { .. } => ErrorCode::NodeOutOfRange,
            Self::EdgeNotFound { .. } => ErrorCode::EdgeNotFound,
            Self::LabelNotFound(_) => ErrorCode::LabelNotFound,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::TargetUnreachable { .. } => ErrorCode::TargetUnreachable,
            Self::RemovalShortfall { .. } => ErrorCode::RemovalShortfall,
            Self::Allocation(_) => ErrorCode::AllocationFailed,
        }
    }
}

impl From<TryReserveError> for GraphError {
    fn from(e: TryReserveError) -> Self {
        Self::Allocation(e.to_string())
    }
}
