//! Graph model, backbone classifier, device placer, and fog placer for the emufog
//! emulation-planning pipeline.

pub(crate) mod ident;

pub mod classifier;
pub mod config;
pub mod device;
pub mod fog;
pub mod graph;
pub mod run;

pub use config::{Config, ConfigError, DeviceSampling};
pub use fog::{FogPlacement, PlacementError};
pub use graph::{AsId, ContainerSpec, DeviceType, Edge, EdgeId, EmulationBinding, FogType, Graph, GraphError, Node, NodeId, NodeKind};
pub use run::{run, RunReport};
