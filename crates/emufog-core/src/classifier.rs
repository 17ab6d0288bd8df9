//! The backbone classifier (promotes `EdgeRouter`s to `BackboneRouter`s).

use std::collections::VecDeque;

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::graph::{AsId, Graph, GraphError, NodeId, NodeKind};

/// Runs the three-step backbone classification over the whole graph.
///
/// Step 1 (cross-AS promotion) is sequential by nature — it walks every edge once. Steps 2 and 3
/// compute their promotion decisions independently per AS in parallel, then apply them
/// sequentially: each AS only ever reads the shared graph and writes a private result, so the
/// parallel phase never touches mutable shared state.
pub fn classify(graph: &mut Graph, backbone_degree_factor: f32) -> Result<(), GraphError> {
    promote_cross_as_endpoints(graph)?;
    promote_high_degree(graph, backbone_degree_factor)?;
    connect_backbones(graph)?;
    Ok(())
}

fn promote_cross_as_endpoints(graph: &mut Graph) -> Result<(), GraphError> {
    let cross_edges: Vec<(NodeId, NodeId)> = graph
        .all_edges()
        .filter(|e| graph.is_cross_as(e.id()))
        .map(|e| e.endpoints())
        .collect();
    for (a, b) in cross_edges {
        let as_a = graph.node(a).ok_or(GraphError::NoSuchNode(a))?.as_id();
        let as_b = graph.node(b).ok_or(GraphError::NoSuchNode(b))?.as_id();
        graph.as_mut(as_a)?.replace_by_backbone(a)?;
        graph.as_mut(as_b)?.replace_by_backbone(b)?;
    }
    Ok(())
}

fn promote_high_degree(graph: &mut Graph, backbone_degree_factor: f32) -> Result<(), GraphError> {
    let as_ids: Vec<AsId> = graph.as_ids().collect();

    // Parallel compute: for each AS, decide which edge routers to promote without mutating
    // anything.
    let promotions: Vec<(AsId, Vec<NodeId>)> = as_ids
        .par_iter()
        .map(|&as_id| {
            let asys = graph.autonomous_system(as_id).expect("AS exists: came from graph.as_ids()");
            let router_degrees: Vec<(NodeId, usize)> = asys
                .edge_nodes()
                .chain(asys.backbone_nodes())
                .map(|id| {
                    let degree = graph.node(id).map(|n| n.edges().len()).unwrap_or(0);
                    (id, degree)
                })
                .collect();
            if router_degrees.is_empty() {
                return (as_id, Vec::new());
            }
            let avg_degree =
                router_degrees.iter().map(|&(_, d)| d as f32).sum::<f32>() / router_degrees.len() as f32;
            let threshold = backbone_degree_factor * avg_degree;
            let to_promote = asys
                .edge_nodes()
                .filter(|&id| {
                    let degree = graph.node(id).map(|n| n.edges().len()).unwrap_or(0);
                    degree as f32 >= threshold
                })
                .collect();
            (as_id, to_promote)
        })
        .collect();

    // Sequential apply.
    for (as_id, node_ids) in promotions {
        for id in node_ids {
            graph.as_mut(as_id)?.replace_by_backbone(id)?;
        }
    }
    Ok(())
}

/// A purely local, read-only snapshot of one AS's intra-AS adjacency, used by the backbone
/// connector so the BFS can run against private data during the parallel compute phase.
struct AsSnapshot {
    as_id: AsId,
    backbone: FxHashSet<NodeId>,
    /// node -> neighbours reachable via an intra-AS edge.
    adjacency: FxHashMap<NodeId, Vec<NodeId>>,
}

fn snapshot_as(graph: &Graph, as_id: AsId) -> AsSnapshot {
    let asys = graph
        .autonomous_system(as_id)
        .expect("AS exists: came from graph.as_ids()");
    let backbone: FxHashSet<NodeId> = asys.backbone_nodes().collect();
    let all_nodes: Vec<NodeId> = asys.edge_nodes().chain(asys.backbone_nodes()).collect();
    let mut adjacency = FxHashMap::default();
    for &id in &all_nodes {
        let node = graph.node(id).expect("node in AS bucket exists in graph");
        let neighbours = node
            .edges()
            .iter()
            .filter(|&&eid| !graph.is_cross_as(eid))
            .map(|&eid| graph.edge(eid).expect("edge in node.edges() exists in graph").other(id))
            .filter(|other| graph.node(*other).map(|n| !n.is_edge_device()).unwrap_or(false))
            .collect();
        adjacency.insert(id, neighbours);
    }
    AsSnapshot {
        as_id,
        backbone,
        adjacency,
    }
}

/// Runs the trace-back-promotion BFS connector against one AS's snapshot and returns the set of
/// edge routers that must be promoted to backbone.
fn connector_bfs(snapshot: &AsSnapshot) -> Vec<NodeId> {
    let Some(&start) = snapshot.backbone.iter().min() else {
        return Vec::new();
    };

    let mut visited: FxHashSet<NodeId> = FxHashSet::default();
    let mut seen: FxHashSet<NodeId> = FxHashSet::default();
    let mut predecessor: FxHashMap<NodeId, Option<NodeId>> = FxHashMap::default();
    let mut queue: VecDeque<NodeId> = VecDeque::new();

    predecessor.insert(start, None);
    seen.insert(start);
    queue.push_back(start);

    let mut to_promote: FxHashSet<NodeId> = FxHashSet::default();
    let is_backbone = |id: NodeId| snapshot.backbone.contains(&id) || to_promote.contains(&id);

    while let Some(n) = queue.pop_front() {
        if visited.contains(&n) {
            continue;
        }
        visited.insert(n);

        if is_backbone(n) {
            if let Some(mut cur) = predecessor.get(&n).copied().flatten() {
                loop {
                    if is_backbone(cur) {
                        break;
                    }
                    to_promote.insert(cur);
                    match predecessor.get(&cur).copied().flatten() {
                        Some(next) => cur = next,
                        None => break,
                    }
                }
            }
        }

        let neighbours = snapshot.adjacency.get(&n).cloned().unwrap_or_default();
        for m in neighbours {
            if visited.contains(&m) {
                continue;
            }
            if seen.contains(&m) {
                let pred_is_router = predecessor.get(&m).copied().flatten().map(|p| !is_backbone(p)).unwrap_or(false);
                if is_backbone(n) && pred_is_router {
                    predecessor.insert(m, Some(n));
                }
            } else {
                predecessor.insert(m, Some(n));
                seen.insert(m);
                queue.push_back(m);
            }
        }
    }

    to_promote.into_iter().collect()
}

fn connect_backbones(graph: &mut Graph) -> Result<(), GraphError> {
    let as_ids: Vec<AsId> = graph.as_ids().collect();

    let snapshots: Vec<AsSnapshot> = as_ids.par_iter().map(|&as_id| snapshot_as(graph, as_id)).collect();
    let promotions: Vec<(AsId, Vec<NodeId>)> = snapshots
        .par_iter()
        .map(|snap| (snap.as_id, connector_bfs(snap)))
        .collect();

    for (as_id, node_ids) in promotions {
        for id in node_ids {
            if graph.node(id).map(|n| matches!(n.kind(), NodeKind::EdgeRouter)).unwrap_or(false) {
                graph.as_mut(as_id)?.replace_by_backbone(id)?;
            }
        }
    }
    Ok(())
}
