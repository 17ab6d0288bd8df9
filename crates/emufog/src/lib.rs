//! `emufog` plans a fog-computing deployment on top of a router/AS network topology. Given a
//! classified graph of routers and synthesized end-user devices, it places fog-capable
//! containers so that every device is served within a configurable latency budget, subject to a
//! global cap on the number of fog nodes deployed.

pub use emufog_core::*;

/// Topology readers (BRITE, CAIDA).
pub mod readers {
    pub use emufog_readers::*;
}

/// Deployment script export.
pub mod export {
    pub use emufog_export::*;
}
