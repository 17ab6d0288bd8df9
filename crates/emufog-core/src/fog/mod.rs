//! The fog placer: greedy set-cover placement of fog nodes over each autonomous system.

mod dijkstra;

use std::sync::atomic::{AtomicU32, Ordering};

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::Config;
use crate::graph::{AsId, FogType, Graph, NodeId};

/// A placement the fog placer decided to emit: `node` runs a fog instance of `fog_type`.
#[derive(Debug, Clone)]
pub struct FogPlacement {
    pub as_id: AsId,
    pub node: NodeId,
    pub fog_type: FogType,
}

/// The fog placer ran out of budget before every starting node was covered.
///
/// Non-fatal: callers may still use `partial` (whatever placements were emitted before the
/// budget ran dry), but the overall pipeline result must be reported as `Failure`.
#[derive(Debug, thiserror::Error)]
#[error("fog placer exhausted its node budget before covering every starting node")]
pub struct PlacementError {
    pub partial: Vec<FogPlacement>,
}

/// A process-wide counter of remaining fog-node placements. Only `try_take` (a stale-read
/// followed by an unconditional `fetch_sub`) and `load` are ever performed, matching the
/// single-writer-op contract of the shared budget.
pub struct Budget {
    remaining: AtomicU32,
}

impl Budget {
    pub fn new(max: u32) -> Self {
        Self {
            remaining: AtomicU32::new(max),
        }
    }

    /// Attempts to claim one unit of budget. May observe a stale positive value under
    /// contention, in which case more than one worker can claim past zero; the aggregator
    /// tolerates the resulting small overshoot.
    fn try_take(&self) -> bool {
        if self.remaining.load(Ordering::Relaxed) == 0 {
            return false;
        }
        self.remaining.fetch_sub(1, Ordering::Relaxed);
        true
    }

    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
struct StartingNode {
    device_count: u32,
    remaining_device_count: u32,
    possible_nodes: FxHashSet<NodeId>,
}

#[derive(Debug, Clone)]
struct Assignment {
    type_index: usize,
    covered_count: u32,
    average_deployment_cost: f32,
    average_connection_cost: f32,
}

#[derive(Debug, Clone)]
struct CandidateState {
    /// starting node -> cost of the cheapest path from it to this candidate.
    registered: FxHashMap<NodeId, f32>,
    modified: bool,
    assignment: Option<Assignment>,
}

impl CandidateState {
    fn new() -> Self {
        Self {
            registered: FxHashMap::default(),
            modified: true,
            assignment: None,
        }
    }

    /// Sort key for `FogComparator`: (avg_deployment_cost asc, avg_connection_cost asc,
    /// covered_count desc, node_id asc). Candidates with no assignment yet sort last.
    fn key(&self, node_id: NodeId) -> (OrderedFloat<f32>, OrderedFloat<f32>, std::cmp::Reverse<u32>, NodeId) {
        match &self.assignment {
            Some(a) => (
                OrderedFloat(a.average_deployment_cost),
                OrderedFloat(a.average_connection_cost),
                std::cmp::Reverse(a.covered_count),
                node_id,
            ),
            None => (OrderedFloat(f32::INFINITY), OrderedFloat(f32::INFINITY), std::cmp::Reverse(0), node_id),
        }
    }
}

fn refresh_assignment(
    candidate: &mut CandidateState,
    starting: &FxHashMap<NodeId, StartingNode>,
    fog_types: &[FogType],
) {
    let d: u32 = candidate
        .registered
        .keys()
        .filter_map(|s| starting.get(s))
        .map(|s| s.remaining_device_count)
        .sum();

    if d == 0 || fog_types.is_empty() {
        candidate.assignment = None;
        candidate.modified = false;
        return;
    }

    let mut best: Option<(usize, f32, f32)> = None; // (index, cost_per_conn, type.cost)
    for (i, t) in fog_types.iter().enumerate() {
        let served = d.min(t.max_clients);
        if served == 0 {
            continue;
        }
        let cost_per_conn = t.cost / served as f32;
        let better = match &best {
            None => true,
            Some((_, best_cpc, best_cost)) => {
                cost_per_conn < *best_cpc || (cost_per_conn == *best_cpc && t.cost < *best_cost)
            }
        };
        if better {
            best = Some((i, cost_per_conn, t.cost));
        }
    }

    let Some((type_index, _, _)) = best else {
        candidate.assignment = None;
        candidate.modified = false;
        return;
    };
    let served = d.min(fog_types[type_index].max_clients);
    let avg_connection_cost: f32 = candidate.registered.values().sum::<f32>() / candidate.registered.len() as f32;
    let average_deployment_cost = fog_types[type_index].cost / served as f32;

    candidate.assignment = Some(Assignment {
        type_index,
        covered_count: served,
        average_deployment_cost,
        average_connection_cost,
    });
    candidate.modified = false;
}

/// Picks the candidate with the smallest `FogComparator` key among those carrying a live
/// assignment.
fn pick_winner(candidates: &FxHashMap<NodeId, CandidateState>) -> Option<NodeId> {
    candidates
        .iter()
        .filter(|(_, c)| c.assignment.is_some())
        .map(|(&id, c)| (c.key(id), id))
        .min_by_key(|(key, _)| key.clone())
        .map(|(_, id)| id)
}

fn coverage_update(
    winner_id: NodeId,
    candidates: &mut FxHashMap<NodeId, CandidateState>,
    starting: &mut FxHashMap<NodeId, StartingNode>,
) {
    let winner = candidates.get(&winner_id).expect("winner must be a live candidate");
    let mut capacity = winner.assignment.as_ref().map(|a| a.covered_count).unwrap_or(0);

    let mut order: Vec<(NodeId, f32)> = winner
        .registered
        .iter()
        .filter(|(s, _)| starting.contains_key(s))
        .map(|(&s, &cost)| (s, cost))
        .collect();
    order.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut fully_covered: Vec<NodeId> = Vec::new();
    for (s_id, _) in order {
        if capacity == 0 {
            break;
        }
        let Some(s) = starting.get_mut(&s_id) else { continue };
        let take = s.remaining_device_count.min(capacity);
        s.remaining_device_count -= take;
        capacity -= take;
        if s.remaining_device_count == 0 {
            fully_covered.push(s_id);
        }
    }

    for s_id in fully_covered {
        let Some(s) = starting.remove(&s_id) else { continue };
        for cand_id in s.possible_nodes {
            if let Some(cand) = candidates.get_mut(&cand_id) {
                cand.registered.remove(&s_id);
                cand.modified = true;
            }
        }
    }

    candidates.retain(|_, c| !c.registered.is_empty());
    candidates.remove(&winner_id);
}

fn run_as(graph: &Graph, as_id: AsId, config: &Config, budget: &Budget) -> (Vec<FogPlacement>, bool) {
    let asys = graph
        .autonomous_system(as_id)
        .expect("AS exists: came from graph.as_ids()");

    let mut starting: FxHashMap<NodeId, StartingNode> = FxHashMap::default();
    for router_id in asys.edge_nodes() {
        let node = graph.node(router_id).expect("node in AS bucket exists in graph");
        let device_count = node
            .edges()
            .iter()
            .filter(|&&eid| {
                graph
                    .edge(eid)
                    .map(|e| graph.node(e.other(router_id)).map(|n| n.is_edge_device()).unwrap_or(false))
                    .unwrap_or(false)
            })
            .count() as u32;
        if device_count > 0 {
            starting.insert(
                router_id,
                StartingNode {
                    device_count,
                    remaining_device_count: device_count,
                    possible_nodes: FxHashSet::default(),
                },
            );
        }
    }

    if starting.is_empty() {
        return (Vec::new(), true);
    }

    let allowed: FxHashSet<NodeId> = asys
        .edge_nodes()
        .chain(asys.backbone_nodes())
        .collect();

    let mut candidates: FxHashMap<NodeId, CandidateState> = FxHashMap::default();
    let starting_ids: Vec<NodeId> = starting.keys().copied().collect();
    for s_id in starting_ids {
        let reached = dijkstra::reachability(graph, s_id, &allowed, config.cost_threshold);
        for (node_id, r) in reached {
            let cand = candidates.entry(node_id).or_insert_with(CandidateState::new);
            cand.registered.insert(s_id, r.cost);
            cand.modified = true;
            starting.get_mut(&s_id).expect("s_id just inserted above").possible_nodes.insert(node_id);
        }
    }

    let mut placements = Vec::new();
    let mut success = true;

    loop {
        if starting.is_empty() {
            break;
        }
        if !budget.try_take() {
            success = false;
            break;
        }

        let dirty: Vec<NodeId> = candidates.iter().filter(|(_, c)| c.modified).map(|(&id, _)| id).collect();
        for id in dirty {
            if let Some(cand) = candidates.get_mut(&id) {
                refresh_assignment(cand, &starting, &config.fog_node_types);
            }
        }

        let Some(winner_id) = pick_winner(&candidates) else {
            success = false;
            break;
        };
        let assignment = candidates[&winner_id]
            .assignment
            .clone()
            .expect("pick_winner only returns candidates with a live assignment");

        placements.push(FogPlacement {
            as_id,
            node: winner_id,
            fog_type: config.fog_node_types[assignment.type_index].clone(),
        });

        coverage_update(winner_id, &mut candidates, &mut starting);
    }

    (placements, success)
}

/// Runs the fog placer over every autonomous system in `graph`, concurrently across ASes,
/// sharing a single global placement budget.
///
/// On success returns placements sorted by `(as_id, node_id)`. On budget exhaustion in any AS
/// returns `PlacementError` carrying the placements made so far, also sorted.
pub fn place(graph: &Graph, config: &Config) -> Result<Vec<FogPlacement>, PlacementError> {
    let budget = Budget::new(config.max_fog_nodes);
    let as_ids: Vec<AsId> = graph.as_ids().collect();

    let results: Vec<(Vec<FogPlacement>, bool)> = as_ids.par_iter().map(|&as_id| run_as(graph, as_id, config, &budget)).collect();

    let mut all_success = true;
    let mut placements: Vec<FogPlacement> = Vec::new();
    for (p, success) in results {
        all_success = all_success && success;
        placements.extend(p);
    }
    placements.sort_by_key(|p| (p.as_id.inner(), p.node.inner()));

    if all_success {
        Ok(placements)
    } else {
        Err(PlacementError { partial: placements })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeviceSampling;
    use crate::device;
    use crate::graph::{ContainerSpec, EdgeId};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fog_type(cost: f32, max_clients: u32) -> FogType {
        FogType {
            container: ContainerSpec {
                image: "alpine".into(),
                tag: "latest".into(),
                memory_limit_bytes: 1 << 20,
                cpu_share: 0.1,
            },
            cost,
            max_clients,
        }
    }

    fn device_type(scaling_factor: u32, avg_per_router: f32) -> crate::graph::DeviceType {
        crate::graph::DeviceType {
            container: ContainerSpec {
                image: "busybox".into(),
                tag: "latest".into(),
                memory_limit_bytes: 1 << 18,
                cpu_share: 0.05,
            },
            scaling_factor,
            avg_per_router,
        }
    }

    fn config(max_fog_nodes: u32, cost_threshold: f32, fog_types: Vec<FogType>) -> Config {
        Config::builder()
            .max_fog_nodes(max_fog_nodes)
            .cost_threshold(cost_threshold)
            .fog_node_types(fog_types)
            .build()
    }

    #[test]
    fn scenario_s1_single_as_two_routers_one_device() {
        let mut g = Graph::new();
        g.create_edge_router(NodeId::new(1), AsId::new(0)).unwrap();
        g.create_edge_router(NodeId::new(2), AsId::new(0)).unwrap();
        g.create_edge(EdgeId::new(0), NodeId::new(1), NodeId::new(2), 5.0, 1.0).unwrap();

        let mut rng = StdRng::seed_from_u64(0);
        device::place_devices(&mut g, &[device_type(1, 1.0)], DeviceSampling::Deterministic, &mut rng).unwrap();

        let cfg = config(1, 10.0, vec![fog_type(1.0, 10)]);
        let placements = place(&g, &cfg).expect("budget covers the single starting node");

        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].node, NodeId::new(1));
    }

    #[test]
    fn scenario_s3_unreachable_device_only_source_wins() {
        let mut g = Graph::new();
        g.create_edge_router(NodeId::new(1), AsId::new(0)).unwrap();
        g.create_edge_router(NodeId::new(2), AsId::new(0)).unwrap();
        g.create_edge(EdgeId::new(0), NodeId::new(1), NodeId::new(2), 100.0, 1.0).unwrap();

        let mut rng = StdRng::seed_from_u64(0);
        device::place_devices(&mut g, &[device_type(1, 1.0)], DeviceSampling::Deterministic, &mut rng).unwrap();

        let cfg = config(5, 10.0, vec![fog_type(1.0, 10)]);
        let placements = place(&g, &cfg).expect("router 1 always reaches itself");

        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].node, NodeId::new(1));
    }

    #[test]
    fn scenario_s4_budget_exhaustion_yields_failure() {
        let mut g = Graph::new();
        for as_id in 0..2u32 {
            let r1 = NodeId::new(as_id * 10);
            let r2 = NodeId::new(as_id * 10 + 1);
            g.create_edge_router(r1, AsId::new(as_id)).unwrap();
            g.create_edge_router(r2, AsId::new(as_id)).unwrap();
            g.create_edge(EdgeId::new(as_id * 10), r1, r2, 1.0, 1.0).unwrap();
        }

        let mut rng = StdRng::seed_from_u64(0);
        device::place_devices(&mut g, &[device_type(1, 1.0)], DeviceSampling::Deterministic, &mut rng).unwrap();

        let cfg = config(1, 10.0, vec![fog_type(1.0, 1)]);
        let err = place(&g, &cfg).expect_err("only one of the two ASes can be served");
        assert!(err.partial.len() <= 1);
    }

    #[test]
    fn no_starting_nodes_is_trivially_successful() {
        let mut g = Graph::new();
        g.create_edge_router(NodeId::new(1), AsId::new(0)).unwrap();
        let cfg = config(1, 10.0, vec![fog_type(1.0, 10)]);
        let placements = place(&g, &cfg).unwrap();
        assert!(placements.is_empty());
    }
}
