//! End-to-end scenarios covering classification, device placement, and fog placement together.

use emufog_core::config::DeviceSampling;
use emufog_core::graph::{AsId, ContainerSpec, DeviceType, EdgeId, EmulationBinding, FogType, Graph, NodeId};
use emufog_core::{classifier, device, fog, run, Config};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn container() -> ContainerSpec {
    ContainerSpec {
        image: "alpine".into(),
        tag: "latest".into(),
        memory_limit_bytes: 1 << 20,
        cpu_share: 0.1,
    }
}

fn fog_type(cost: f32, max_clients: u32) -> FogType {
    FogType {
        container: container(),
        cost,
        max_clients,
    }
}

fn device_type(scaling_factor: u32, avg_per_router: f32) -> DeviceType {
    DeviceType {
        container: container(),
        scaling_factor,
        avg_per_router,
    }
}

/// S1: two routers, one device, low-degree — neither router should be promoted to backbone,
/// and the fog placer should emit exactly one placement on the device-bearing router.
#[test]
fn scenario_s1_low_degree_routers_stay_edge_and_get_one_placement() {
    let mut graph = Graph::new();
    graph.create_edge_router(NodeId::new(1), AsId::new(0)).unwrap();
    graph.create_edge_router(NodeId::new(2), AsId::new(0)).unwrap();
    graph.create_edge(EdgeId::new(0), NodeId::new(1), NodeId::new(2), 5.0, 1.0).unwrap();

    classifier::classify(&mut graph, 0.6).unwrap();
    assert!(graph.node(NodeId::new(1)).unwrap().is_edge_router());
    assert!(graph.node(NodeId::new(2)).unwrap().is_edge_router());

    let mut rng = StdRng::seed_from_u64(0);
    device::place_devices(&mut graph, &[device_type(1, 1.0)], DeviceSampling::Deterministic, &mut rng).unwrap();

    let config = Config::builder()
        .max_fog_nodes(1)
        .cost_threshold(10.0)
        .fog_node_types(vec![fog_type(1.0, 10)])
        .build();
    let placements = fog::place(&graph, &config).expect("single starting node fits within budget");

    assert_eq!(placements.len(), 1);
    assert_eq!(placements[0].node, NodeId::new(1));
}

/// S2: a cross-AS edge forces both endpoints to backbone, and the fog placer never traverses
/// it — each AS is served entirely by its own resources.
#[test]
fn scenario_s2_cross_as_edge_isolates_fog_placement_per_as() {
    let mut graph = Graph::new();
    graph.create_edge_router(NodeId::new(1), AsId::new(0)).unwrap();
    graph.create_edge_router(NodeId::new(2), AsId::new(1)).unwrap();
    graph.create_edge(EdgeId::new(0), NodeId::new(1), NodeId::new(2), 1.0, 1.0).unwrap();

    classifier::classify(&mut graph, 0.6).unwrap();
    assert!(graph.node(NodeId::new(1)).unwrap().is_backbone_router());
    assert!(graph.node(NodeId::new(2)).unwrap().is_backbone_router());

    let mut rng = StdRng::seed_from_u64(0);
    device::place_devices(&mut graph, &[device_type(1, 1.0)], DeviceSampling::Deterministic, &mut rng).unwrap();

    // Devices only land on edge routers; after classification both routers here are backbone,
    // so no devices (and thus no starting nodes) exist — the placer must run to trivial success.
    let config = Config::builder()
        .max_fog_nodes(10)
        .cost_threshold(10.0)
        .fog_node_types(vec![fog_type(1.0, 10)])
        .build();
    let placements = fog::place(&graph, &config).expect("no starting nodes means trivial success");
    assert!(placements.is_empty());
}

/// S3: router 2 sits beyond the cost threshold from the device on router 1, so it can never be
/// registered as a candidate for that starting node; only router 1 can win.
#[test]
fn scenario_s3_unreachable_router_is_never_a_candidate() {
    let mut graph = Graph::new();
    graph.create_edge_router(NodeId::new(1), AsId::new(0)).unwrap();
    graph.create_edge_router(NodeId::new(2), AsId::new(0)).unwrap();
    graph.create_edge(EdgeId::new(0), NodeId::new(1), NodeId::new(2), 100.0, 1.0).unwrap();

    let mut rng = StdRng::seed_from_u64(0);
    device::place_devices(&mut graph, &[device_type(1, 1.0)], DeviceSampling::Deterministic, &mut rng).unwrap();

    let config = Config::builder()
        .max_fog_nodes(5)
        .cost_threshold(10.0)
        .fog_node_types(vec![fog_type(1.0, 10)])
        .build();
    let placements = fog::place(&graph, &config).expect("router 1 always reaches itself");
    assert_eq!(placements.len(), 1);
    assert_eq!(placements[0].node, NodeId::new(1));
}

/// S4: two independent ASes each have one uncoverable device-bearing router; with only one
/// fog-node budget total, one AS succeeds and the other doesn't, so the aggregate is Failure.
#[test]
fn scenario_s4_budget_exhaustion_yields_overall_failure() {
    let mut graph = Graph::new();
    for as_id in 0..2u32 {
        let r = NodeId::new(as_id);
        graph.create_edge_router(r, AsId::new(as_id)).unwrap();
    }

    let mut rng = StdRng::seed_from_u64(0);
    device::place_devices(&mut graph, &[device_type(1, 1.0)], DeviceSampling::Deterministic, &mut rng).unwrap();

    let config = Config::builder()
        .max_fog_nodes(1)
        .cost_threshold(10.0)
        .fog_node_types(vec![fog_type(1.0, 10)])
        .build();
    let err = fog::place(&graph, &config).expect_err("only one AS can be served with budget 1");
    assert!(err.partial.len() <= 1);
}

/// S5: two hub candidates (3 and 4) are each exactly one hop from both device-bearing starting
/// routers (1 and 2), so they end up with identical `(average_deployment_cost,
/// average_connection_cost, covered_count)` — the tie must resolve to the smaller node id.
#[test]
fn scenario_s5_tied_candidates_resolve_to_smaller_node_id() {
    let mut graph = Graph::new();
    graph.create_edge_router(NodeId::new(1), AsId::new(0)).unwrap();
    graph.create_edge_router(NodeId::new(2), AsId::new(0)).unwrap();
    graph.create_edge_router(NodeId::new(3), AsId::new(0)).unwrap();
    graph.create_edge_router(NodeId::new(4), AsId::new(0)).unwrap();

    // K(2,2) at uniform latency 1: both starting routers (1, 2) are one hop from both hub
    // candidates (3, 4), and never directly reach each other within the cost threshold.
    graph.create_edge(EdgeId::new(0), NodeId::new(1), NodeId::new(3), 1.0, 1.0).unwrap();
    graph.create_edge(EdgeId::new(1), NodeId::new(1), NodeId::new(4), 1.0, 1.0).unwrap();
    graph.create_edge(EdgeId::new(2), NodeId::new(2), NodeId::new(3), 1.0, 1.0).unwrap();
    graph.create_edge(EdgeId::new(3), NodeId::new(2), NodeId::new(4), 1.0, 1.0).unwrap();

    // One device each on routers 1 and 2; hubs 3 and 4 carry no devices of their own.
    for (router_id, device_id, edge_id) in [(1u32, 10u32, 20u32), (2, 11, 21)] {
        let binding = EmulationBinding {
            ip: String::new(),
            container: container(),
        };
        graph.create_edge_device(NodeId::new(device_id), AsId::new(0), binding).unwrap();
        graph
            .create_edge(EdgeId::new(edge_id), NodeId::new(router_id), NodeId::new(device_id), 0.0, f32::INFINITY)
            .unwrap();
    }

    let config = Config::builder()
        .max_fog_nodes(1)
        .cost_threshold(1.5)
        .fog_node_types(vec![fog_type(10.0, 100)])
        .build();
    let placements = fog::place(&graph, &config).expect("hubs 3 and 4 jointly cover both starting nodes");

    // Hubs 3/4 each serve both starting nodes (avg_deployment_cost 10/2=5, avg_connection_cost
    // 1.0, covered_count 2) while routers 1/2 only ever serve themselves (avg_deployment_cost
    // 10/1=10) — so a hub always wins, and of the tied hubs the smaller id (3) wins.
    assert_eq!(placements.len(), 1);
    assert_eq!(placements[0].node, NodeId::new(3));
}

/// S6: converting a node to backbone and back to edge router preserves its id, AS, and the
/// exact (insertion-order) set of incident edges.
#[test]
fn scenario_s6_variant_round_trip_preserves_state() {
    let mut graph = Graph::new();
    graph.create_edge_router(NodeId::new(1), AsId::new(0)).unwrap();
    graph.create_edge_router(NodeId::new(2), AsId::new(0)).unwrap();
    graph.create_edge_router(NodeId::new(3), AsId::new(0)).unwrap();
    let e1 = graph.create_edge(EdgeId::new(0), NodeId::new(1), NodeId::new(2), 1.0, 1.0).unwrap();
    let e2 = graph.create_edge(EdgeId::new(1), NodeId::new(1), NodeId::new(3), 1.0, 1.0).unwrap();

    let before_edges = graph.node(NodeId::new(1)).unwrap().edges().to_vec();
    let before_as = graph.node(NodeId::new(1)).unwrap().as_id();

    graph.as_mut(AsId::new(0)).unwrap().replace_by_backbone(NodeId::new(1)).unwrap();
    graph.as_mut(AsId::new(0)).unwrap().replace_by_edge(NodeId::new(1)).unwrap();

    let after = graph.node(NodeId::new(1)).unwrap();
    assert_eq!(after.id(), NodeId::new(1));
    assert_eq!(after.as_id(), before_as);
    assert_eq!(after.edges().to_vec(), before_edges);
    assert_eq!(before_edges, vec![e1, e2]);
    assert!(after.is_edge_router());
}

/// Exercises the full top-level `run` pipeline end to end on a small multi-AS topology.
#[test]
fn full_pipeline_runs_classifier_device_placer_and_fog_placer_in_order() {
    let mut graph = Graph::new();
    graph.create_edge_router(NodeId::new(0), AsId::new(0)).unwrap();
    for i in 1..5 {
        graph.create_edge_router(NodeId::new(i), AsId::new(0)).unwrap();
        graph.create_edge(EdgeId::new(i - 1), NodeId::new(0), NodeId::new(i), 1.0, 1.0).unwrap();
    }

    let config = Config::builder()
        .max_fog_nodes(10)
        .cost_threshold(10.0)
        .device_node_types(vec![device_type(1, 1.0)])
        .fog_node_types(vec![fog_type(1.0, 10)])
        .device_sampling(DeviceSampling::Deterministic)
        .build();

    let report = run(&mut graph, &config).expect("topology is well-formed");
    assert!(report.success);
    assert!(!report.placements.is_empty());
    assert!(graph.nodes().any(|n| n.is_edge_device()));
}
