//! The device placer: attaches synthetic `EdgeDevice` nodes to edge routers.

use rand::Rng;
use rand_distr::{Distribution, Poisson};

use crate::config::DeviceSampling;
use crate::graph::{AsId, DeviceType, EmulationBinding, Graph, GraphError, NodeId, NodeKind};

/// Attaches synthetic devices to every `EdgeRouter` in the graph, for every configured device
/// type, using `sampling` to draw the per-router instance count.
///
/// Runs single-threaded: node creation must serialize on the graph's id allocator, and the
/// per-router workload is small relative to classification and placement.
pub fn place_devices<R: Rng>(
    graph: &mut Graph,
    device_types: &[DeviceType],
    sampling: DeviceSampling,
    rng: &mut R,
) -> Result<(), GraphError> {
    let routers: Vec<(NodeId, AsId)> = graph
        .nodes()
        .filter(|n| matches!(n.kind(), NodeKind::EdgeRouter))
        .map(|n| (n.id(), n.as_id()))
        .collect();

    for (router_id, as_id) in routers {
        for t in device_types {
            let k = sample_count(t.avg_per_router, sampling, rng);
            let total = k * t.scaling_factor;
            for _ in 0..total {
                let device_id = graph.fresh_node_id();
                let edge_id = graph.fresh_edge_id();
                let binding = EmulationBinding {
                    ip: String::new(),
                    container: t.container.clone(),
                };
                graph.create_edge_device(device_id, as_id, binding)?;
                graph.create_edge(edge_id, router_id, device_id, 0.0, f32::INFINITY)?;
            }
        }
    }
    Ok(())
}

fn sample_count<R: Rng>(avg_per_router: f32, sampling: DeviceSampling, rng: &mut R) -> u32 {
    match sampling {
        DeviceSampling::Poisson => {
            if avg_per_router <= 0.0 {
                0
            } else {
                let dist = Poisson::new(avg_per_router as f64).expect("avg_per_router must be finite and positive");
                dist.sample(rng) as u32
            }
        }
        DeviceSampling::Deterministic => avg_per_router.round() as u32,
    }
}
