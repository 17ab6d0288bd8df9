//! Format-independent intermediate representation produced by every reader.

use emufog_core::graph::{AsId, EdgeId, Graph, GraphError, NodeId};

#[derive(Debug, Clone, Copy)]
pub struct RawNode {
    pub id: u32,
    pub as_id: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct RawEdge {
    pub id: u32,
    pub from: u32,
    pub to: u32,
    pub latency: f32,
    pub bandwidth: f32,
}

/// A topology as read off disk, before it becomes a [`Graph`].
#[derive(Debug, Clone, Default)]
pub struct RawTopology {
    pub nodes: Vec<RawNode>,
    pub edges: Vec<RawEdge>,
}

impl RawTopology {
    /// Builds a [`Graph`] from this raw topology: every `RawNode` becomes an `EdgeRouter` (the
    /// backbone classifier promotes routers from there), and every `RawEdge` an undirected link.
    pub fn into_graph(self) -> Result<Graph, GraphError> {
        let mut graph = Graph::new();
        for n in &self.nodes {
            graph.create_edge_router(NodeId::new(n.id), AsId::new(n.as_id))?;
        }
        for e in &self.edges {
            graph.create_edge(EdgeId::new(e.id), NodeId::new(e.from), NodeId::new(e.to), e.latency, e.bandwidth)?;
        }
        Ok(graph)
    }
}
