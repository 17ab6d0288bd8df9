//! Reader error taxonomy and per-run statistics.

use std::path::PathBuf;

/// A fatal reader error: something that stops the read entirely, as opposed to a malformed
/// record (which is counted in [`ReadStats`] and skipped).
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("could not open {path}: {source}")]
    MissingFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} has no recognised `{section}` section")]
    MissingSection { path: PathBuf, section: &'static str },
}

/// The kind of record-level problem that caused one line to be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Fewer columns than the format requires.
    TooFewColumns,
    /// A column that should parse as an integer or float didn't.
    NumericParse,
    /// An edge referenced a node id that was never declared.
    UnknownNode,
    /// An unrecognised line prefix or section header.
    UnrecognisedLine,
}

/// Counts of skipped records, by reason, plus how many records were read successfully.
#[derive(Debug, Clone, Default)]
pub struct ReadStats {
    pub nodes_parsed: u32,
    pub edges_parsed: u32,
    skipped: rustc_hash::FxHashMap<SkipReason, u32>,
}

impl ReadStats {
    pub fn record_skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }

    /// Total number of records skipped across every reason.
    pub fn total_skipped(&self) -> u32 {
        self.skipped.values().sum()
    }

    pub fn skipped_for(&self, reason: SkipReason) -> u32 {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }
}
