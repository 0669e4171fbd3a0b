//src/types.rs

use std::collections::BTreeMap;
use std::fmt;

/// A 0-based, half-open range `[start, end)` ready for slicing.
///
/// Built from the 1-based inclusive `start-end` text of a segment line, so
/// `start < end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateRange {
    pub start: usize,
    pub end: usize,
}

impl CoordinateRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Accepted repeats keyed by repeat id. Sorted so output is reproducible.
pub type AcceptedRepeats = BTreeMap<String, CoordinateRange>;

/// The result of parsing one HHrepID report.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatReport {
    /// Sequence database accession taken from the `sp|<id>|...` token.
    pub sequence_id: String,
    pub repeats: AcceptedRepeats,
}

/// A single-entry alignment record: header token and raw sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub header: String,
    pub seq: String,
}

/// One extracted repeat: `<header>|<repeat id>` and its subsequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledSubsequence {
    pub label: String,
    pub seq: String,
}

impl fmt::Display for LabeledSubsequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.label, self.seq)
    }
}
