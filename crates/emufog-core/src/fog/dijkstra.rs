//! Single-source Dijkstra reachability, scoped to one autonomous system.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;

use crate::graph::{Graph, NodeId};

/// The outcome of reaching `node` from the Dijkstra source: the cheapest cost found and the
/// predecessor on that path (`None` if `node` is the source itself).
#[derive(Debug, Clone, Copy, derive_new::new)]
pub struct Reached {
    pub cost: f32,
    pub predecessor: Option<NodeId>,
}

/// Runs single-source Dijkstra from `source`, restricted to `allowed` nodes (the AS-local
/// candidate/starting set), stopping relaxation once accumulated cost would exceed
/// `cost_threshold`. Cross-AS edges and `EdgeDevice` successors are never traversed.
pub fn reachability(
    graph: &Graph,
    source: NodeId,
    allowed: &rustc_hash::FxHashSet<NodeId>,
    cost_threshold: f32,
) -> FxHashMap<NodeId, Reached> {
    let mut settled: FxHashMap<NodeId, Reached> = FxHashMap::default();
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f32>, NodeId)>> = BinaryHeap::new();

    settled.insert(source, Reached::new(0.0, None));
    heap.push(Reverse((OrderedFloat(0.0), source)));

    while let Some(Reverse((OrderedFloat(cost), node))) = heap.pop() {
        match settled.get(&node) {
            Some(best) if best.cost < cost => continue,
            _ => {}
        }

        let Some(n) = graph.node(node) else { continue };
        for &eid in n.edges() {
            if graph.is_cross_as(eid) {
                continue;
            }
            let Some(edge) = graph.edge(eid) else { continue };
            let next = edge.other(node);
            let Some(next_node) = graph.node(next) else { continue };
            if next_node.is_edge_device() {
                continue;
            }
            if !allowed.contains(&next) {
                continue;
            }
            let next_cost = cost + edge.latency;
            if next_cost > cost_threshold {
                continue;
            }
            let better = match settled.get(&next) {
                Some(existing) => next_cost < existing.cost,
                None => true,
            };
            if better {
                settled.insert(next, Reached::new(next_cost, Some(node)));
                heap.push(Reverse((OrderedFloat(next_cost), next)));
            }
        }
    }

    settled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AsId, EdgeId};

    #[test]
    fn respects_cost_threshold() {
        let mut g = Graph::new();
        g.create_edge_router(NodeId::new(0), AsId::new(0)).unwrap();
        g.create_edge_router(NodeId::new(1), AsId::new(0)).unwrap();
        g.create_edge(EdgeId::new(0), NodeId::new(0), NodeId::new(1), 100.0, 1.0).unwrap();

        let allowed: rustc_hash::FxHashSet<NodeId> = [NodeId::new(0), NodeId::new(1)].into_iter().collect();
        let result = reachability(&g, NodeId::new(0), &allowed, 10.0);

        assert!(result.contains_key(&NodeId::new(0)));
        assert!(!result.contains_key(&NodeId::new(1)));
    }

    #[test]
    fn never_crosses_as_boundary() {
        let mut g = Graph::new();
        g.create_edge_router(NodeId::new(0), AsId::new(0)).unwrap();
        g.create_edge_router(NodeId::new(1), AsId::new(1)).unwrap();
        g.create_edge(EdgeId::new(0), NodeId::new(0), NodeId::new(1), 1.0, 1.0).unwrap();

        let allowed: rustc_hash::FxHashSet<NodeId> = [NodeId::new(0), NodeId::new(1)].into_iter().collect();
        let result = reachability(&g, NodeId::new(0), &allowed, 100.0);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn picks_cheapest_of_multiple_paths() {
        let mut g = Graph::new();
        for i in 0..4 {
            g.create_edge_router(NodeId::new(i), AsId::new(0)).unwrap();
        }
        g.create_edge(EdgeId::new(0), NodeId::new(0), NodeId::new(1), 1.0, 1.0).unwrap();
        g.create_edge(EdgeId::new(1), NodeId::new(1), NodeId::new(3), 1.0, 1.0).unwrap();
        g.create_edge(EdgeId::new(2), NodeId::new(0), NodeId::new(2), 5.0, 1.0).unwrap();
        g.create_edge(EdgeId::new(3), NodeId::new(2), NodeId::new(3), 5.0, 1.0).unwrap();

        let allowed: rustc_hash::FxHashSet<NodeId> = (0..4).map(NodeId::new).collect();
        let result = reachability(&g, NodeId::new(0), &allowed, 100.0);
        assert_eq!(result[&NodeId::new(3)].cost, 2.0);
        assert_eq!(result[&NodeId::new(3)].predecessor, Some(NodeId::new(1)));
    }
}
