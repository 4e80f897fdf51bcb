use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// AnalysisError – everything that can go wrong while analyzing a substance
// ---------------------------------------------------------------------------

/// Failure kinds raised by the peak engine.
///
/// Only [`AnalysisError::MalformedSpectrum`] and [`AnalysisError::UnknownRank`]
/// are hard errors returned to the caller. Every other kind is recovered at
/// per-peak granularity: the affected peak keeps sentinel values and the
/// failure is appended to the batch [`AnalysisLog`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum AnalysisError {
    /// Neither the slope-decay nor the sign-flip criterion triggered before
    /// the search window ran out on one side of the candidate.
    #[error("peak boundary not found within the search window")]
    BoundaryNotFound,

    /// The derivative at the lock point coincides with the outer slope, so
    /// there is no slope to decay from.
    #[error("derivative never leaves the outer slope")]
    NonStandingSlope,

    /// Left and right boundaries landed on the same sample.
    #[error("left and right boundaries coincide")]
    ZeroWidthPeak,

    /// A shape ratio could not be computed (zero peak height).
    #[error("derived metric undefined for zero peak height")]
    DerivedMetricError,

    /// The histogram input has zero value range, so no box mesh exists.
    #[error("histogram input has zero value range")]
    DegenerateHistogram,

    /// The background-fit normal equations are too close to singular.
    #[error("background fit is ill-conditioned")]
    IllConditionedFit,

    /// The input spectrum violates a structural precondition. Reported
    /// before any peak work starts.
    #[error("malformed spectrum: {0}")]
    MalformedSpectrum(String),

    /// A boundary override referenced a rank that is not in the current set.
    #[error("no peak with rank {0} in the current set")]
    UnknownRank(usize),
}

// ---------------------------------------------------------------------------
// AnalysisLog – batch-scoped accumulator of recovered failures
// ---------------------------------------------------------------------------

/// One recovered failure, keyed by substance and candidate index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Name of the substance being analyzed.
    pub substance: String,
    /// Center-order index of the affected candidate.
    pub candidate: usize,
    /// What went wrong.
    pub error: AnalysisError,
}

/// Accumulator for failures recovered during one batch call.
///
/// The log is owned by a single build and merged by the caller; there is no
/// global error state. It never retries anything — callers decide whether to
/// rerun with adjusted parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisLog {
    entries: Vec<LogEntry>,
}

impl AnalysisLog {
    /// Fresh, empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one recovered failure.
    pub fn record(&mut self, substance: &str, candidate: usize, error: AnalysisError) {
        self.entries.push(LogEntry {
            substance: substance.to_string(),
            candidate,
            error,
        });
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Absorb another log (e.g. per-substance logs joined after a batch).
    pub fn merge(&mut self, other: AnalysisLog) {
        self.entries.extend(other.entries);
    }
}

impl fmt::Display for AnalysisLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "no errors raised");
        }
        writeln!(f, "{:>5}  {:>16} {:>5}  description", "#", "substance", "cand")?;
        for (i, e) in self.entries.iter().enumerate() {
            writeln!(f, "{:>5}: {:>16} {:>5}  {}", i + 1, e.substance, e.candidate, e.error)?;
        }
        Ok(())
    }
}
