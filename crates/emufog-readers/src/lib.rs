//! Topology readers: BRITE and CAIDA formats, producing a [`raw::RawTopology`] that
//! `emufog-core` turns into a [`emufog_core::Graph`].

pub mod brite;
pub mod caida;
mod error;
mod raw;

pub use error::{InputError, ReadStats, SkipReason};
pub use raw::{RawEdge, RawNode, RawTopology};
