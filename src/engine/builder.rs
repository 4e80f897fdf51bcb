use std::collections::BTreeMap;

use crate::engine::quantify::{self, Candidate};
use crate::engine::rank;
use crate::error::{AnalysisError, AnalysisLog};
use crate::model::{PeakSet, SubstanceData};
use crate::params::PeakParams;

// ---------------------------------------------------------------------------
// Per-substance peak-set construction
// ---------------------------------------------------------------------------

/// Build the full peak set for one substance: bound and quantify every
/// enumerated maximum, then rank the collection.
///
/// Per-peak failures are isolated — they produce sentinel records and land
/// in the returned [`AnalysisLog`], never aborting the batch.
pub fn build_peak_set(data: &SubstanceData, params: &PeakParams) -> (PeakSet, AnalysisLog) {
    build_with(data, params, &BTreeMap::new())
}

/// Rebuild a substance's peak set with boundary overrides from the editing
/// workflow.
///
/// `overrides` is keyed by the display rank in `current`; values are raw
/// (x_low, x_high) boundaries, snapped to the sampled axis before use. The
/// whole set is rebuilt from the extrema — nothing is patched in place, so
/// every rank field comes out consistent.
pub fn rebuild_with_overrides(
    data: &SubstanceData,
    current: &PeakSet,
    overrides: &BTreeMap<usize, (f64, f64)>,
    params: &PeakParams,
) -> Result<(PeakSet, AnalysisLog), AnalysisError> {
    let x = data.spectrum.x();
    let mut by_order = BTreeMap::new();
    for (&rank, &(lo, hi)) in overrides {
        let peak = current.get(rank).ok_or(AnalysisError::UnknownRank(rank))?;
        let mut i_lo = snap_to_sample(x, lo);
        let mut i_hi = snap_to_sample(x, hi);
        if i_lo > i_hi {
            std::mem::swap(&mut i_lo, &mut i_hi);
        }
        by_order.insert(peak.center_order, (i_lo, i_hi));
    }
    Ok(build_with(data, params, &by_order))
}

fn build_with(
    data: &SubstanceData,
    params: &PeakParams,
    overrides: &BTreeMap<usize, (usize, usize)>,
) -> (PeakSet, AnalysisLog) {
    let mut log = AnalysisLog::new();
    let maxima = &data.maxima;
    let last = data.spectrum.len() - 1;

    let mut peaks = Vec::with_capacity(maxima.len());
    for (order, &center) in maxima.iter().enumerate() {
        let left_gap = if order > 0 {
            center - maxima[order - 1]
        } else {
            center
        };
        let right_gap = if order + 1 < maxima.len() {
            maxima[order + 1] - center
        } else {
            last - center
        };
        let half_width = params.max_half_width.min(left_gap).min(right_gap);
        log::debug!(
            "{}: candidate {} at index {} gets half-width {}",
            data.name,
            order,
            center,
            half_width
        );

        let cand = Candidate {
            data,
            order,
            center,
            half_width,
        };
        let override_idx = overrides.get(&order).copied();
        peaks.push(quantify::compute_peak(&cand, params, override_idx, &mut log));
    }

    (rank::apply(peaks), log)
}

/// Index of the sample nearest to `value`; the first sample wins on exact
/// equidistance. User boundaries outside the sampled range clamp to the
/// end samples.
fn snap_to_sample(x: &[f64], value: f64) -> usize {
    let mut best = 0;
    for (i, &v) in x.iter().enumerate() {
        if (v - value).abs() < (x[best] - value).abs() {
            best = i;
        }
    }
    best
}
