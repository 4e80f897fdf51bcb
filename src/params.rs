use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PeakParams – immutable per-invocation parameter set
// ---------------------------------------------------------------------------

/// Tuning knobs for one analysis pass.
///
/// A `PeakParams` value is handed to every entry point explicitly; the engine
/// never reads configuration from global state. The defaults are neutral
/// starting points — resolution-dependent values (especially
/// [`max_half_width`](Self::max_half_width) and
/// [`box_density`](Self::box_density)) want tuning per instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakParams {
    /// Cap on a candidate's neighborhood half-width, in samples.
    pub max_half_width: usize,

    /// Outer slopes larger than this magnitude are treated as artifacts and
    /// clamped to zero before the decay search.
    pub max_outer_slope: f64,

    /// Fraction of the locked derivative excursion at which a boundary is
    /// declared (0 < value < 1; smaller means wider peaks).
    pub slope_drop: f64,

    /// Base histogram density for outer-slope estimation, in boxes per unit
    /// of derivative range.
    pub box_density: f64,

    /// Smoothing passes applied to the raw derivative.
    pub derivative_smoothing: usize,

    /// Smoothing passes applied to y before extremum enumeration.
    pub extremum_smoothing: usize,

    /// Leading-edge clamp: within the initial descending run of the
    /// spectrum, derivative entries at or above this magnitude are zeroed so
    /// the steep opening tail cannot masquerade as a peak flank.
    pub max_lead_slope: f64,
}

impl Default for PeakParams {
    fn default() -> Self {
        Self {
            max_half_width: 100,
            max_outer_slope: 10.0,
            slope_drop: 0.1,
            box_density: 10.0,
            derivative_smoothing: 3,
            extremum_smoothing: 0,
            max_lead_slope: 1e3,
        }
    }
}
