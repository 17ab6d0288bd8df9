//! Node types that make up the topology graph.

use crate::ident::identifier;

identifier!(NodeId);
identifier!(EdgeId);
identifier!(AsId);

/// A container image specification shared by every emulated node.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContainerSpec {
    /// Docker image name.
    pub image: String,
    /// Docker image tag.
    pub tag: String,
    /// Memory limit, in bytes, applied to the running container.
    pub memory_limit_bytes: u64,
    /// Fractional CPU share allotted to the container.
    pub cpu_share: f32,
}

/// A device-type container: worn by synthetic `EdgeDevice` nodes.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeviceType {
    /// The container image to run.
    pub container: ContainerSpec,
    /// How many virtual devices a single container of this type represents.
    pub scaling_factor: u32,
    /// Expected number of instances of this device type per edge router.
    pub avg_per_router: f32,
}

/// A fog-capable container type, scored against its cost per served client.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FogType {
    /// The container image to run.
    pub container: ContainerSpec,
    /// Deployment cost of one instance.
    pub cost: f32,
    /// Maximum number of clients one instance can serve.
    pub max_clients: u32,
}

/// Binds a node to the container that emulates it at runtime.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EmulationBinding {
    /// The IP address assigned to the emulated node.
    pub ip: String,
    /// The container that emulates this node.
    pub container: ContainerSpec,
}

/// The three node variants a router or device can take.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum NodeKind {
    /// A router at the network periphery; may carry attached devices.
    EdgeRouter,
    /// A router promoted into the inter-AS transit fabric.
    BackboneRouter,
    /// A synthetic end-user device, always carrying an emulation binding.
    EdgeDevice,
}

/// A node in the topology graph. `id`, `as_id`, and `edges` are preserved across variant
/// conversions; only `kind` (and `emulation`, for device conversions) change.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) as_id: AsId,
    pub(crate) kind: NodeKind,
    pub(crate) emulation: Option<EmulationBinding>,
    /// Incident edge IDs in insertion order. Order is observable but only affects tie-breaks.
    pub(crate) edges: Vec<EdgeId>,
}

impl Node {
    /// The node's graph-unique ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The autonomous system this node belongs to.
    pub fn as_id(&self) -> AsId {
        self.as_id
    }

    /// The node's current variant.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The node's emulation binding, if any. Always `Some` for `EdgeDevice` nodes.
    pub fn emulation(&self) -> Option<&EmulationBinding> {
        self.emulation.as_ref()
    }

    /// Incident edge IDs, in insertion order.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// True if this node is currently an `EdgeRouter`.
    pub fn is_edge_router(&self) -> bool {
        matches!(self.kind, NodeKind::EdgeRouter)
    }

    /// True if this node is currently a `BackboneRouter`.
    pub fn is_backbone_router(&self) -> bool {
        matches!(self.kind, NodeKind::BackboneRouter)
    }

    /// True if this node is an `EdgeDevice`.
    pub fn is_edge_device(&self) -> bool {
        matches!(self.kind, NodeKind::EdgeDevice)
    }
}
