//! Top-level orchestration: classify, place devices, then place fog nodes.

use std::time::Instant;

use log::info;
use rand::thread_rng;

use crate::config::Config;
use crate::fog::{self, FogPlacement};
use crate::graph::Graph;

/// The outcome of a full pipeline run.
#[derive(Debug)]
pub struct RunReport {
    /// Fog placements emitted so far (complete on `Success`, partial on `Failure`).
    pub placements: Vec<FogPlacement>,
    /// `false` if the fog placer exhausted its budget in at least one autonomous system.
    pub success: bool,
}

/// Runs the classifier, device placer, and fog placer over `graph` in sequence, mutating it in
/// place (classification and device placement) and returning the fog placements produced.
///
/// A `Failure` result is not an error: it means the run completed but the fog placer ran out of
/// budget before covering every starting node. Only `GraphError` (raised by the classifier or
/// device placer) represents a fatal condition worth aborting on.
pub fn run(graph: &mut Graph, config: &Config) -> Result<RunReport, crate::graph::GraphError> {
    let total_start = config.time_measuring.then(Instant::now);

    let stage_start = config.time_measuring.then(Instant::now);
    crate::classifier::classify(graph, config.backbone_degree_factor)?;
    if let Some(start) = stage_start {
        info!("backbone classification finished in {:?}", start.elapsed());
    } else {
        info!("backbone classification finished");
    }

    let stage_start = config.time_measuring.then(Instant::now);
    let mut rng = thread_rng();
    crate::device::place_devices(graph, &config.device_node_types, config.device_sampling, &mut rng)?;
    if let Some(start) = stage_start {
        info!("device placement finished in {:?}", start.elapsed());
    } else {
        info!("device placement finished");
    }

    let stage_start = config.time_measuring.then(Instant::now);
    let (placements, success) = match fog::place(graph, config) {
        Ok(p) => (p, true),
        Err(e) => (e.partial, false),
    };
    if let Some(start) = stage_start {
        info!("fog placement finished in {:?}, success={success}", start.elapsed());
    } else {
        info!("fog placement finished, success={success}");
    }

    if let Some(start) = total_start {
        info!("pipeline run finished in {:?}", start.elapsed());
    }

    Ok(RunReport { placements, success })
}
