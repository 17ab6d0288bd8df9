//! CAIDA topology reader.
//!
//! A CAIDA topology is three files sharing a base name: `<base>.nodes.geo` (records prefixed
//! `node.geo `), `<base>.nodes.as` (records prefixed `node.AS `), and `<base>.links` (records
//! prefixed `link `). Latency is not part of the format; it is produced by a pluggable
//! [`LatencyCalculator`].

use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::error::{InputError, ReadStats, SkipReason};
use crate::raw::{RawEdge, RawNode, RawTopology};

/// Computes the latency assigned to a CAIDA link, since the format carries none.
pub trait LatencyCalculator {
    fn latency_for(&self, from: u32, to: u32) -> f32;
}

/// The default calculator: every link gets a flat 1.0 ms latency.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatLatency;

impl LatencyCalculator for FlatLatency {
    fn latency_for(&self, _from: u32, _to: u32) -> f32 {
        1.0
    }
}

/// Reads a CAIDA topology from `<base>.nodes.geo`, `<base>.nodes.as`, and `<base>.links`.
pub fn read(base: &Path, latency_calc: &impl LatencyCalculator) -> Result<(RawTopology, ReadStats), InputError> {
    let geo_path = with_suffix(base, "nodes.geo");
    let as_path = with_suffix(base, "nodes.as");
    let links_path = with_suffix(base, "links");

    let geo = fs::read_to_string(&geo_path).map_err(|source| InputError::MissingFile {
        path: geo_path.clone(),
        source,
    })?;
    let as_file = fs::read_to_string(&as_path).map_err(|source| InputError::MissingFile {
        path: as_path.clone(),
        source,
    })?;
    let links = fs::read_to_string(&links_path).map_err(|source| InputError::MissingFile {
        path: links_path.clone(),
        source,
    })?;

    let mut stats = ReadStats::default();

    // `node.geo` establishes which node ids exist; `node.AS` supplies the as_id for a subset of
    // them. A node with no matching `node.AS` record is skipped entirely, since the data model
    // requires every node to carry an as_id.
    let mut declared_ids: FxHashMap<u32, ()> = FxHashMap::default();
    for line in geo.lines() {
        let line = line.trim();
        let Some(rest) = line.strip_prefix("node.geo ") else {
            if !line.is_empty() {
                stats.record_skip(SkipReason::UnrecognisedLine);
            }
            continue;
        };
        let cols: Vec<&str> = rest.split_whitespace().collect();
        let Some(id_str) = cols.first() else {
            stats.record_skip(SkipReason::TooFewColumns);
            continue;
        };
        let Ok(id) = id_str.parse::<u32>() else {
            stats.record_skip(SkipReason::NumericParse);
            continue;
        };
        declared_ids.insert(id, ());
    }

    let mut as_ids: FxHashMap<u32, u32> = FxHashMap::default();
    for line in as_file.lines() {
        let line = line.trim();
        let Some(rest) = line.strip_prefix("node.AS ") else {
            if !line.is_empty() {
                stats.record_skip(SkipReason::UnrecognisedLine);
            }
            continue;
        };
        let cols: Vec<&str> = rest.split_whitespace().collect();
        if cols.len() < 2 {
            stats.record_skip(SkipReason::TooFewColumns);
            continue;
        }
        let (Ok(id), Ok(as_id)) = (cols[0].parse::<u32>(), cols[1].parse::<u32>()) else {
            stats.record_skip(SkipReason::NumericParse);
            continue;
        };
        as_ids.insert(id, as_id);
    }

    let mut topology = RawTopology::default();
    let mut next_edge_id = 0u32;
    for id in declared_ids.keys() {
        if let Some(&as_id) = as_ids.get(id) {
            topology.nodes.push(RawNode { id: *id, as_id });
            stats.nodes_parsed += 1;
        }
    }

    for line in links.lines() {
        let line = line.trim();
        let Some(rest) = line.strip_prefix("link ") else {
            if !line.is_empty() {
                stats.record_skip(SkipReason::UnrecognisedLine);
            }
            continue;
        };
        let cols: Vec<&str> = rest.split_whitespace().collect();
        if cols.len() < 3 {
            stats.record_skip(SkipReason::TooFewColumns);
            continue;
        }
        let (Ok(from), Ok(to)) = (cols[1].parse::<u32>(), cols[2].parse::<u32>()) else {
            stats.record_skip(SkipReason::NumericParse);
            continue;
        };
        if !as_ids.contains_key(&from) || !as_ids.contains_key(&to) {
            stats.record_skip(SkipReason::UnknownNode);
            continue;
        }
        let latency = latency_calc.latency_for(from, to);
        topology.edges.push(RawEdge {
            id: next_edge_id,
            from,
            to,
            latency,
            bandwidth: f32::INFINITY,
        });
        next_edge_id += 1;
        stats.edges_parsed += 1;
    }

    Ok((topology, stats))
}

fn with_suffix(base: &Path, suffix: &str) -> std::path::PathBuf {
    let mut s = base.as_os_str().to_owned();
    s.push(".");
    s.push(suffix);
    std::path::PathBuf::from(s)
}
