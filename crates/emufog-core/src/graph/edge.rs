//! Edge (link) types.

use crate::graph::node::{EdgeId, NodeId};

/// An undirected link between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Edge {
    pub(crate) id: EdgeId,
    pub(crate) endpoints: (NodeId, NodeId),
    /// Link latency, in milliseconds.
    pub latency: f32,
    /// Link bandwidth, in Mbps.
    pub bandwidth: f32,
}

impl Edge {
    /// The edge's graph-unique ID.
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// The edge's two endpoints.
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        self.endpoints
    }

    /// Returns the endpoint of this edge that isn't `from`.
    ///
    /// Panics if `from` isn't one of the edge's endpoints.
    pub fn other(&self, from: NodeId) -> NodeId {
        let (a, b) = self.endpoints;
        if a == from {
            b
        } else if b == from {
            a
        } else {
            panic!("node {from} is not an endpoint of edge {}", self.id);
        }
    }
}
