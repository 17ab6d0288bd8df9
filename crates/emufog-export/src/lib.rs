//! Writes a classified, placed topology out as a MaxiNet deployment script.
//!
//! MaxiNet (the emulator this pipeline targets) is driven by a Python script that declares
//! switches, hosts, and links through its `Topology` API. This crate's only job is translating
//! the pipeline's result into that script; it never invokes MaxiNet itself.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use emufog_core::{FogPlacement, Graph, NodeId, NodeKind};

/// One row of the ordered export table: a classified node, the fog placement assigned to it (if
/// it won one), and how many devices it directly hosts.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DeploymentRow {
    pub as_id: u32,
    pub node_id: NodeId,
    pub kind: NodeKind,
    pub fog_cost: Option<f32>,
    pub device_count: u32,
}

/// Errors writing the deployment script.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write deployment script to {path}: {source}")]
    Write {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize deployment rows to {path}: {source}")]
    Json {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Builds the ordered `(AS, classified node, optional fog placement, device count)` rows that
/// the exporter serializes, sorted by `(as_id, node_id)` to match the fog placer's own ordering.
pub fn build_rows(graph: &Graph, placements: &[FogPlacement]) -> Vec<DeploymentRow> {
    let fog_cost_by_node: rustc_hash::FxHashMap<NodeId, f32> =
        placements.iter().map(|p| (p.node, p.fog_type.cost)).collect();

    let mut rows: Vec<DeploymentRow> = graph
        .nodes()
        .filter(|n| !n.is_edge_device())
        .map(|n| {
            let device_count = n
                .edges()
                .iter()
                .filter(|&&eid| graph.edge(eid).map(|e| graph.node(e.other(n.id())).map(|o| o.is_edge_device()).unwrap_or(false)).unwrap_or(false))
                .count() as u32;
            DeploymentRow {
                as_id: n.as_id().inner(),
                node_id: n.id(),
                kind: n.kind().clone(),
                fog_cost: fog_cost_by_node.get(&n.id()).copied(),
                device_count,
            }
        })
        .collect();

    rows.sort_by_key(|r| (r.as_id, r.node_id.inner()));
    rows
}

/// Renders `rows` as a MaxiNet deployment script and writes it to `path`.
pub fn write(path: &Path, rows: &[DeploymentRow]) -> Result<(), ExportError> {
    let script = render(rows);
    fs::write(path, script).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `rows` to `path` as pretty-printed JSON, for tooling that wants the raw deployment
/// table rather than the generated Python script.
pub fn write_json(path: &Path, rows: &[DeploymentRow]) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(rows).map_err(|source| ExportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn render(rows: &[DeploymentRow]) -> String {
    let mut s = String::new();
    writeln!(s, "#!/usr/bin/env python3").unwrap();
    writeln!(s, "# Generated deployment script; do not edit by hand.").unwrap();
    writeln!(s, "from MaxiNet.Frontend.maxinet import Experiment").unwrap();
    writeln!(s, "from MaxiNet.Frontend.container import Docker").unwrap();
    writeln!(s, "from mininet.topo import Topo").unwrap();
    writeln!(s).unwrap();
    writeln!(s, "topo = Topo()").unwrap();

    for row in rows {
        let label = match row.kind {
            NodeKind::BackboneRouter => "backbone",
            NodeKind::EdgeRouter => "edge",
            NodeKind::EdgeDevice => unreachable!("device nodes are excluded from export rows"),
        };
        writeln!(
            s,
            "topo.addSwitch('as{}_n{}')  # {} router, {} device(s){}",
            row.as_id,
            row.node_id,
            label,
            row.device_count,
            row.fog_cost
                .map(|c| format!(", fog instance (cost {c})"))
                .unwrap_or_default(),
        )
        .unwrap();
    }

    writeln!(s).unwrap();
    writeln!(s, "experiment = Experiment(cluster, topo)").unwrap();
    writeln!(s, "experiment.setup()").unwrap();
    s
}
