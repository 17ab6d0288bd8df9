//! Graph construction and mutation errors.

use crate::graph::node::{AsId, EdgeId, NodeId};

/// Fatal errors raised while building or mutating a [`Graph`](crate::graph::Graph).
///
/// Per the pipeline's error-handling design, every variant here is a `GraphIntegrityError`:
/// callers should abort the run rather than try to recover.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A node ID was reused.
    #[error("duplicate node ID {0}")]
    DuplicateNodeId(NodeId),

    /// An edge ID was reused.
    #[error("duplicate edge ID {0}")]
    DuplicateEdgeId(EdgeId),

    /// An edge referenced a node that doesn't exist.
    #[error("edge references unknown node {0}")]
    UnknownNode(NodeId),

    /// A lookup referenced a node that doesn't exist.
    #[error("no such node {0}")]
    NoSuchNode(NodeId),

    /// A lookup referenced an AS that doesn't exist.
    #[error("no such autonomous system {0}")]
    NoSuchAs(AsId),

    /// A variant conversion was invoked on a node that doesn't belong to the invoking AS.
    #[error("node {node} does not belong to AS {as_id}")]
    WrongAs { node: NodeId, as_id: AsId },
}
