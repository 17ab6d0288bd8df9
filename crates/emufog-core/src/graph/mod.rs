//! The topology graph: autonomous systems, nodes, links, and variant conversion.
//!
//! Node identity is stable for the lifetime of the graph. Variant conversion
//! (`replace_by_edge`/`replace_by_backbone`/`replace_by_edge_device`) never removes or
//! re-creates a [`petgraph`] node; it only overwrites the node weight in place, so incident
//! edges (which reference the underlying [`NodeIndex`](petgraph::graph::NodeIndex)) are
//! preserved automatically. This sidesteps the ownership-cycle problems of a pointer-based
//! node/edge graph entirely.

pub mod edge;
pub mod error;
pub mod node;

use petgraph::graph::{NodeIndex, UnGraph};
use rustc_hash::FxHashMap;

pub use edge::Edge;
pub use error::GraphError;
pub use node::{AsId, ContainerSpec, DeviceType, EdgeId, EmulationBinding, FogType, Node, NodeId, NodeKind};

/// The set of nodes, partitioned by variant, that make up one autonomous system.
#[derive(Debug, Clone, Default)]
pub struct AutonomousSystem {
    as_id: AsId,
    edge_nodes: rustc_hash::FxHashSet<NodeId>,
    backbone_nodes: rustc_hash::FxHashSet<NodeId>,
    edge_device_nodes: rustc_hash::FxHashSet<NodeId>,
}

impl AutonomousSystem {
    fn new(as_id: AsId) -> Self {
        Self {
            as_id,
            ..Default::default()
        }
    }

    /// This AS's ID.
    pub fn id(&self) -> AsId {
        self.as_id
    }

    /// Edge routers belonging to this AS.
    pub fn edge_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.edge_nodes.iter().copied()
    }

    /// Backbone routers belonging to this AS.
    pub fn backbone_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.backbone_nodes.iter().copied()
    }

    /// Edge devices belonging to this AS.
    pub fn edge_device_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.edge_device_nodes.iter().copied()
    }

    fn bucket_mut(&mut self, kind: &NodeKind) -> &mut rustc_hash::FxHashSet<NodeId> {
        match kind {
            NodeKind::EdgeRouter => &mut self.edge_nodes,
            NodeKind::BackboneRouter => &mut self.backbone_nodes,
            NodeKind::EdgeDevice => &mut self.edge_device_nodes,
        }
    }

    fn remove_from_any_bucket(&mut self, id: NodeId) {
        self.edge_nodes.remove(&id);
        self.backbone_nodes.remove(&id);
        self.edge_device_nodes.remove(&id);
    }
}

/// The topology graph.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    g: UnGraph<Node, Edge>,
    node_idx: FxHashMap<NodeId, NodeIndex>,
    edge_idx: FxHashMap<EdgeId, petgraph::graph::EdgeIndex>,
    ases: FxHashMap<AsId, AutonomousSystem>,
    next_node_id: u32,
    next_edge_id: u32,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn touch_as(&mut self, as_id: AsId) -> &mut AutonomousSystem {
        self.ases.entry(as_id).or_insert_with(|| AutonomousSystem::new(as_id))
    }

    fn bump_node_id(&mut self, id: NodeId) {
        self.next_node_id = self.next_node_id.max(id.inner() + 1);
    }

    fn bump_edge_id(&mut self, id: EdgeId) {
        self.next_edge_id = self.next_edge_id.max(id.inner() + 1);
    }

    /// Allocates a fresh, graph-unique node ID.
    pub fn fresh_node_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// Allocates a fresh, graph-unique edge ID.
    pub fn fresh_edge_id(&mut self) -> EdgeId {
        let id = EdgeId::new(self.next_edge_id);
        self.next_edge_id += 1;
        id
    }

    fn insert_node(&mut self, id: NodeId, as_id: AsId, kind: NodeKind, emulation: Option<EmulationBinding>) -> Result<&Node, GraphError> {
        if self.node_idx.contains_key(&id) {
            return Err(GraphError::DuplicateNodeId(id));
        }
        let node = Node {
            id,
            as_id,
            kind: kind.clone(),
            emulation,
            edges: Vec::new(),
        };
        let idx = self.g.add_node(node);
        self.node_idx.insert(id, idx);
        self.bump_node_id(id);
        self.touch_as(as_id).bucket_mut(&kind).insert(id);
        Ok(&self.g[idx])
    }

    /// Creates a new `EdgeRouter`. Fails with `DuplicateNodeId` if `id` already exists.
    pub fn create_edge_router(&mut self, id: NodeId, as_id: AsId) -> Result<&Node, GraphError> {
        self.insert_node(id, as_id, NodeKind::EdgeRouter, None)
    }

    /// Creates a new `EdgeDevice` bound to `binding`. Fails with `DuplicateNodeId` if `id`
    /// already exists.
    pub fn create_edge_device(
        &mut self,
        id: NodeId,
        as_id: AsId,
        binding: EmulationBinding,
    ) -> Result<&Node, GraphError> {
        self.insert_node(id, as_id, NodeKind::EdgeDevice, Some(binding))
    }

    /// Creates an undirected edge between `from` and `to`. Fails if either endpoint is missing
    /// or if `id` is already in use.
    pub fn create_edge(
        &mut self,
        id: EdgeId,
        from: NodeId,
        to: NodeId,
        latency: f32,
        bandwidth: f32,
    ) -> Result<EdgeId, GraphError> {
        if self.edge_idx.contains_key(&id) {
            return Err(GraphError::DuplicateEdgeId(id));
        }
        let &a = self.node_idx.get(&from).ok_or(GraphError::UnknownNode(from))?;
        let &b = self.node_idx.get(&to).ok_or(GraphError::UnknownNode(to))?;
        let edge = Edge {
            id,
            endpoints: (from, to),
            latency,
            bandwidth,
        };
        let eidx = self.g.add_edge(a, b, edge);
        self.edge_idx.insert(id, eidx);
        self.bump_edge_id(id);
        self.g[a].edges.push(id);
        self.g[b].edges.push(id);
        Ok(id)
    }

    /// Looks up a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_idx.get(&id).map(|&idx| &self.g[idx])
    }

    /// Looks up an edge by ID.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edge_idx.get(&id).map(|&idx| &self.g[idx])
    }

    /// True if `id`'s two endpoints belong to different autonomous systems.
    pub fn is_cross_as(&self, id: EdgeId) -> bool {
        let Some(edge) = self.edge(id) else { return false };
        let (a, b) = edge.endpoints;
        match (self.node(a), self.node(b)) {
            (Some(a), Some(b)) => a.as_id != b.as_id,
            _ => false,
        }
    }

    /// Looks up an autonomous system by ID.
    pub fn autonomous_system(&self, as_id: AsId) -> Option<&AutonomousSystem> {
        self.ases.get(&as_id)
    }

    /// Iterates over every autonomous system's ID.
    pub fn as_ids(&self) -> impl Iterator<Item = AsId> + '_ {
        self.ases.keys().copied()
    }

    /// Iterates over every node in the graph, regardless of variant or AS.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.g.node_weights()
    }

    /// Iterates over every edge in the graph.
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> {
        self.g.edge_weights()
    }

    /// Obtains a handle for mutating one autonomous system's nodes.
    pub fn as_mut(&mut self, as_id: AsId) -> Result<AsHandle<'_>, GraphError> {
        if !self.ases.contains_key(&as_id) {
            return Err(GraphError::NoSuchAs(as_id));
        }
        Ok(AsHandle { graph: self, as_id })
    }
}

/// A handle scoping node variant-conversion operations to one autonomous system.
pub struct AsHandle<'g> {
    graph: &'g mut Graph,
    as_id: AsId,
}

impl<'g> AsHandle<'g> {
    fn convert(&mut self, id: NodeId, kind: NodeKind, emulation: Option<EmulationBinding>) -> Result<(), GraphError> {
        let &idx = self.graph.node_idx.get(&id).ok_or(GraphError::NoSuchNode(id))?;
        if self.graph.g[idx].as_id != self.as_id {
            return Err(GraphError::WrongAs {
                node: id,
                as_id: self.as_id,
            });
        }
        if self.graph.g[idx].kind == kind {
            // No-op: already the target variant.
            return Ok(());
        }
        let as_entry = self.graph.ases.get_mut(&self.as_id).expect("AS must exist: checked at AsHandle construction");
        as_entry.remove_from_any_bucket(id);
        as_entry.bucket_mut(&kind).insert(id);
        self.graph.g[idx].kind = kind;
        self.graph.g[idx].emulation = emulation;
        Ok(())
    }

    /// Converts `id` to an `EdgeRouter`, preserving its ID, AS membership, and incident edges.
    pub fn replace_by_edge(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.convert(id, NodeKind::EdgeRouter, None)
    }

    /// Converts `id` to a `BackboneRouter`, preserving its ID, AS membership, and incident edges.
    pub fn replace_by_backbone(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.convert(id, NodeKind::BackboneRouter, None)
    }

    /// Converts `id` to an `EdgeDevice` bound to `binding`, preserving its ID, AS membership, and
    /// incident edges.
    pub fn replace_by_edge_device(&mut self, id: NodeId, binding: EmulationBinding) -> Result<(), GraphError> {
        self.convert(id, NodeKind::EdgeDevice, Some(binding))
    }
}
