use crate::engine::histogram;
use crate::error::AnalysisError;
use crate::model::{BoundaryReason, Derivatives, PeakBoundaries, Spectrum};
use crate::params::PeakParams;

// ---------------------------------------------------------------------------
// Derivative-decay boundary search
// ---------------------------------------------------------------------------

/// Locate the left and right boundaries of the peak centered at
/// `center`, searching at most `half_width` samples per side.
///
/// The search works on the derivative of the spectrum:
///
/// 1. The outer slope — the stable background level of the smoothed
///    derivative far from the peak — is estimated over the whole window by
///    histogram quantization, and clamped to 0 when its magnitude exceeds
///    `params.max_outer_slope`.
/// 2. Stepping outward from the center in each direction, nothing happens
///    until the smoothed derivative starts moving away from the peak in the
///    expected sense (decreasing leftward, increasing rightward). That step
///    "locks" the search and records the derivative `dermax` at the lock.
/// 3. From the lock on, the side stops at the first sample where the raw
///    derivative has decayed to within `params.slope_drop` of the span
///    between `dermax` and the outer slope ([`BoundaryReason::SlopeDecay`]),
///    or where the smoothed derivative changes sign
///    ([`BoundaryReason::SignFlip`]).
///
/// A side that exhausts its window without stopping fails the whole search
/// with [`AnalysisError::BoundaryNotFound`]; a lock landing exactly on the
/// outer slope fails with [`AnalysisError::NonStandingSlope`]; coinciding
/// boundaries fail with [`AnalysisError::ZeroWidthPeak`].
pub fn find_boundaries(
    spectrum: &Spectrum,
    derivatives: &Derivatives,
    center: usize,
    half_width: usize,
    params: &PeakParams,
) -> Result<PeakBoundaries, AnalysisError> {
    let sder = &derivatives.smoothed;
    let der = &derivatives.raw;

    let win_lo = center.saturating_sub(half_width);
    let win_hi = (center + half_width + 1).min(sder.len());
    let (mut outer, half_box) = histogram::outer_slope(&sder[win_lo..win_hi], params.box_density)?;
    if outer.abs() > params.max_outer_slope {
        outer = 0.0;
    }

    let mut sides: [Option<(usize, BoundaryReason)>; 2] = [None, None];
    for (side, dir) in [-1i64, 1].into_iter().enumerate() {
        let mut lock = false;
        let mut dermax = 0.0;
        for step in 0..=half_width as i64 {
            let i = center as i64 + dir * step;
            let j = i + dir;
            if i < 0 || j < 0 || i >= sder.len() as i64 || j >= sder.len() as i64 {
                break;
            }
            let (i, j) = (i as usize, j as usize);

            let outward = if dir < 0 {
                sder[j] < sder[i]
            } else {
                sder[j] > sder[i]
            };
            if !lock && outward {
                lock = true;
                dermax = sder[i];
                if dermax == outer {
                    return Err(AnalysisError::NonStandingSlope);
                }
            }
            if lock {
                if ((der[i] - outer) / (dermax - outer)).abs() <= params.slope_drop {
                    sides[side] = Some((i, BoundaryReason::SlopeDecay));
                    break;
                }
                if sder[j] * sder[i] <= 0.0 {
                    sides[side] = Some((i, BoundaryReason::SignFlip));
                    break;
                }
            }
        }
    }

    let ((left_i, left_r), (right_i, right_r)) = match (sides[0], sides[1]) {
        (Some(l), Some(r)) => (l, r),
        _ => return Err(AnalysisError::BoundaryNotFound),
    };

    let x = spectrum.x();
    if x[left_i] == x[right_i] {
        return Err(AnalysisError::ZeroWidthPeak);
    }
    Ok(PeakBoundaries {
        x: (x[left_i], x[right_i]),
        indices: (left_i, right_i),
        outer_slope: outer,
        half_box_width: half_box,
        reasons: (left_r, right_r),
    })
}
