//! BRITE topology reader.
//!
//! A BRITE file is a single text document with a `Nodes:` section followed by an `Edges:`
//! section. Node lines are tab-separated with at least 7 columns, `as_id` at column index 5
//! (0-based). Edge lines have at least 9 columns: `id, from, to, _, delay, bandwidth, ...`.

use std::fs;
use std::path::Path;

use log::warn;

use crate::error::{InputError, ReadStats, SkipReason};
use crate::raw::{RawEdge, RawNode, RawTopology};

/// Reads a BRITE topology file, returning whatever records parsed plus stats on what didn't.
pub fn read(path: &Path) -> Result<(RawTopology, ReadStats), InputError> {
    let contents = fs::read_to_string(path).map_err(|source| InputError::MissingFile {
        path: path.to_path_buf(),
        source,
    })?;

    let mut topology = RawTopology::default();
    let mut stats = ReadStats::default();

    let mut section = Section::None;
    let mut saw_nodes = false;
    let mut saw_edges = false;

    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with("Nodes:") {
            section = Section::Nodes;
            saw_nodes = true;
            continue;
        }
        if trimmed.starts_with("Edges:") {
            section = Section::Edges;
            saw_edges = true;
            continue;
        }

        match section {
            Section::Nodes => parse_node_line(trimmed, &mut topology, &mut stats),
            Section::Edges => parse_edge_line(trimmed, &mut topology, &mut stats),
            Section::None => stats.record_skip(SkipReason::UnrecognisedLine),
        }
    }

    if !saw_nodes {
        return Err(InputError::MissingSection {
            path: path.to_path_buf(),
            section: "Nodes:",
        });
    }
    if !saw_edges {
        return Err(InputError::MissingSection {
            path: path.to_path_buf(),
            section: "Edges:",
        });
    }

    Ok((topology, stats))
}

enum Section {
    None,
    Nodes,
    Edges,
}

fn parse_node_line(line: &str, topology: &mut RawTopology, stats: &mut ReadStats) {
    let cols: Vec<&str> = line.split_whitespace().collect();
    if cols.len() < 7 {
        stats.record_skip(SkipReason::TooFewColumns);
        return;
    }
    let (Ok(id), Ok(as_id)) = (cols[0].parse::<u32>(), cols[5].parse::<u32>()) else {
        stats.record_skip(SkipReason::NumericParse);
        return;
    };
    topology.nodes.push(RawNode { id, as_id });
    stats.nodes_parsed += 1;
}

fn parse_edge_line(line: &str, topology: &mut RawTopology, stats: &mut ReadStats) {
    let cols: Vec<&str> = line.split_whitespace().collect();
    if cols.len() < 9 {
        stats.record_skip(SkipReason::TooFewColumns);
        return;
    }
    let parsed = (
        cols[0].parse::<u32>(),
        cols[1].parse::<u32>(),
        cols[2].parse::<u32>(),
        cols[4].parse::<f32>(),
        cols[5].parse::<f32>(),
    );
    let (Ok(id), Ok(from), Ok(to), Ok(latency), Ok(bandwidth)) = parsed else {
        stats.record_skip(SkipReason::NumericParse);
        return;
    };
    topology.edges.push(RawEdge {
        id,
        from,
        to,
        latency,
        bandwidth,
    });
    stats.edges_parsed += 1;
}

/// Logs a summary of skipped records, if any.
pub fn log_stats(path: &Path, stats: &ReadStats) {
    if stats.total_skipped() > 0 {
        warn!(
            "{}: skipped {} record(s) while parsing ({} nodes, {} edges parsed)",
            path.display(),
            stats.total_skipped(),
            stats.nodes_parsed,
            stats.edges_parsed
        );
    }
}
