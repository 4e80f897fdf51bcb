use crate::engine::{array_ops, boundary};
use crate::error::{AnalysisError, AnalysisLog};
use crate::model::{BoundaryReason, Peak, PeakBoundaries, PeakRanks, SubstanceData};
use crate::params::PeakParams;

// ---------------------------------------------------------------------------
// Quadrature
// ---------------------------------------------------------------------------

/// Net area of `y` over the index range `bounds = (i0, i1)`: composite
/// Simpson-type quadrature over the sample mesh, minus the trapezoidal
/// background `0.5 * (x1 - x0) * (y1 + y0)` spanned by the boundary samples.
///
/// Works on any monotonic x, including a descending alternate axis (the
/// result is then negative — orientation follows the axis direction). An
/// odd trailing interval is closed with the trapezoidal rule.
pub fn integrate(x: &[f64], y: &[f64], bounds: (usize, usize)) -> f64 {
    let (i0, i1) = bounds;
    let mut area = 0.0;
    let mut k = i0;
    while k + 2 <= i1 {
        let h0 = x[k + 1] - x[k];
        let h1 = x[k + 2] - x[k + 1];
        let w0 = 2.0 - h1 / h0;
        let w1 = (h0 + h1).powi(2) / (h0 * h1);
        let w2 = 2.0 - h0 / h1;
        area += (h0 + h1) / 12.0 * (w0 * y[k] + w1 * y[k + 1] + w2 * y[k + 2]);
        k += 2;
    }
    if k < i1 {
        area += 0.5 * (x[i1] - x[k]) * (y[i1] + y[k]);
    }
    let background = 0.5 * (x[i1] - x[i0]) * (y[i1] + y[i0]);
    area - background
}

// ---------------------------------------------------------------------------
// Full width at half maximum
// ---------------------------------------------------------------------------

/// Distance between the two x positions where y first crosses half the
/// summit value, scanning outward-independently on each side of `center`
/// within `bounds`. No interpolation: the crossing is attributed to the
/// bracketing sample nearer the boundary. Returns 0.0 when either side has
/// no crossing.
pub fn fwhm(x: &[f64], y: &[f64], center: usize, summit_y: f64, bounds: (usize, usize)) -> f64 {
    let (i0, i1) = bounds;
    let half = summit_y / 2.0;

    let left = if center > i0 && center <= y.len() {
        array_ops::bracket_indices(&y[i0..center], half).map(|(a, _)| i0 + a)
    } else {
        None
    };
    let right = if center <= i1 && i1 < y.len() {
        array_ops::bracket_indices(&y[center..=i1], half).map(|(_, b)| center + b)
    } else {
        None
    };

    match (left, right) {
        (Some(l), Some(r)) => x[r] - x[l],
        _ => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Per-candidate peak assembly
// ---------------------------------------------------------------------------

/// Transient record for one extremum about to be quantified.
pub(crate) struct Candidate<'a> {
    pub data: &'a SubstanceData,
    /// Position of this candidate among the substance's maxima, in x order.
    pub order: usize,
    /// Sample index of the summit.
    pub center: usize,
    /// Neighborhood half-width for the boundary search.
    pub half_width: usize,
}

/// Run the boundary search (or accept the override) and assemble the full
/// peak record. Failures never escape: the peak is kept with sentinel
/// values and the cause lands in `log`.
pub(crate) fn compute_peak(
    cand: &Candidate<'_>,
    params: &PeakParams,
    override_idx: Option<(usize, usize)>,
    log: &mut AnalysisLog,
) -> Peak {
    let spectrum = &cand.data.spectrum;
    let x = spectrum.x();
    let y = spectrum.y();

    let user_edited = override_idx.is_some();
    let bounds = match override_idx {
        Some((lo, hi)) if lo == hi => Err(AnalysisError::ZeroWidthPeak),
        Some((lo, hi)) => Ok(PeakBoundaries {
            x: (x[lo], x[hi]),
            indices: (lo, hi),
            outer_slope: 0.0,
            half_box_width: 0.0,
            reasons: (BoundaryReason::UserDefined, BoundaryReason::UserDefined),
        }),
        None => boundary::find_boundaries(
            spectrum,
            &cand.data.derivatives,
            cand.center,
            cand.half_width,
            params,
        ),
    };

    let bounds = match bounds {
        Ok(b) => b,
        Err(e) => {
            log::warn!(
                "{}: candidate {} left unbounded: {}",
                cand.data.name,
                cand.order,
                e
            );
            log.record(&cand.data.name, cand.order, e);
            return sentinel_peak(cand, user_edited);
        }
    };

    let (i0, i1) = bounds.indices;
    let summit_y = y[cand.center];
    let integral = integrate(x, y, bounds.indices);
    let alt_integral = spectrum.alt_x().map(|ax| -integrate(ax, y, bounds.indices));
    let width = bounds.x.1 - bounds.x.0;
    let height = summit_y - (y[i0] + y[i1]) / 2.0;
    let fwhm = fwhm(x, y, cand.center, summit_y, bounds.indices);

    let (ratio_h2, ratio_hw) = if height == 0.0 {
        log.record(&cand.data.name, cand.order, AnalysisError::DerivedMetricError);
        (0.0, 0.0)
    } else {
        (integral / (height * height), integral / (height * width))
    };

    Peak {
        substance: cand.data.name.clone(),
        number: None,
        center_order: cand.order,
        center_x: x[cand.center],
        center_index: cand.center,
        center_alt: spectrum.alt_x().map(|ax| ax[cand.center]),
        summit_y,
        integral,
        alt_integral,
        width,
        height,
        fwhm,
        ratio_h2,
        ratio_hw,
        x_limits: bounds.x,
        index_limits: bounds.indices,
        boundary_y: (y[i0], y[i1]),
        outer_slope: bounds.outer_slope,
        slope_uncertainty: bounds.half_box_width,
        reasons: Some(bounds.reasons),
        half_width: cand.half_width,
        user_edited,
        successful: true,
        ranks: PeakRanks::default(),
    }
}

/// The uniform failure record: zeroed boundaries, -1 width and height,
/// zero integral, fwhm and ratios.
fn sentinel_peak(cand: &Candidate<'_>, user_edited: bool) -> Peak {
    let spectrum = &cand.data.spectrum;
    Peak {
        substance: cand.data.name.clone(),
        number: None,
        center_order: cand.order,
        center_x: spectrum.x()[cand.center],
        center_index: cand.center,
        center_alt: spectrum.alt_x().map(|ax| ax[cand.center]),
        summit_y: spectrum.y()[cand.center],
        integral: 0.0,
        alt_integral: spectrum.alt_x().map(|_| 0.0),
        width: -1.0,
        height: -1.0,
        fwhm: 0.0,
        ratio_h2: 0.0,
        ratio_hw: 0.0,
        x_limits: (0.0, 0.0),
        index_limits: (0, 0),
        boundary_y: (0.0, 0.0),
        outer_slope: 0.0,
        slope_uncertainty: 0.0,
        reasons: None,
        half_width: cand.half_width,
        user_edited,
        successful: false,
        ranks: PeakRanks::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Derivatives, Spectrum};

    fn data(y: Vec<f64>, maxima: Vec<usize>, params: &PeakParams) -> SubstanceData {
        let x = (0..y.len()).map(|i| i as f64).collect();
        let spectrum = Spectrum::new(x, y).unwrap();
        let derivatives = Derivatives::from_spectrum(&spectrum, params);
        SubstanceData::from_parts("test", spectrum, derivatives, maxima).unwrap()
    }

    fn params() -> PeakParams {
        PeakParams {
            max_half_width: 10,
            max_outer_slope: 50.0,
            slope_drop: 0.2,
            box_density: 1.0,
            derivative_smoothing: 1,
            ..Default::default()
        }
    }

    #[test]
    fn triangle_integral_without_background() {
        let x = [0.0, 1.0, 2.0];
        let y = [0.0, 10.0, 0.0];
        let net = integrate(&x, &y, (0, 2));
        assert!((net - 6.6667).abs() < 1e-3, "net = {net}");
    }

    #[test]
    fn background_is_subtracted() {
        // Same triangle lifted by 5: the trapezoidal pedestal goes away.
        let x = [0.0, 1.0, 2.0];
        let y = [5.0, 15.0, 5.0];
        let net = integrate(&x, &y, (0, 2));
        assert!((net - (70.0 / 6.0 - 10.0)).abs() < 1e-9, "net = {net}");
    }

    #[test]
    fn odd_trailing_interval_uses_trapezoid() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 1.0, 0.0];
        let net = integrate(&x, &y, (0, 3));
        assert!((net - (5.0 / 6.0 + 0.5)).abs() < 1e-9, "net = {net}");
    }

    #[test]
    fn descending_axis_reverses_orientation() {
        let alt = [2.0, 1.0, 0.0];
        let y = [0.0, 10.0, 0.0];
        assert!((-integrate(&alt, &y, (0, 2)) - 6.6667).abs() < 1e-3);
    }

    #[test]
    fn degenerate_ranges_integrate_to_zero() {
        let x = [0.0, 1.0, 2.0];
        let y = [3.0, 4.0, 5.0];
        assert_eq!(integrate(&x, &y, (1, 1)), 0.0);
        assert_eq!(integrate(&x, &y, (0, 1)), 0.0);
    }

    #[test]
    fn fwhm_between_exact_crossings() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [0.0, 5.0, 10.0, 5.0, 0.0];
        assert_eq!(fwhm(&x, &y, 2, 10.0, (0, 4)), 2.0);
    }

    #[test]
    fn fwhm_is_zero_when_a_side_has_no_crossing() {
        // Half maximum is 5 but the left flank jumps 4 -> 10 right at the
        // center, so the left crossing is invisible to the scan.
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [0.0, 4.0, 10.0, 4.0, 0.0];
        assert_eq!(fwhm(&x, &y, 2, 10.0, (0, 4)), 0.0);
    }

    #[test]
    fn computes_full_metrics_on_success() {
        let params = params();
        let data = data(
            vec![0.0, 0.0, 0.0, 0.0, 1.0, 4.0, 10.0, 4.0, 1.0, 0.0, 0.0, 0.0, 0.0],
            vec![6],
            &params,
        );
        let mut log = AnalysisLog::new();
        let cand = Candidate {
            data: &data,
            order: 0,
            center: 6,
            half_width: 6,
        };
        let peak = compute_peak(&cand, &params, None, &mut log);

        assert!(peak.successful);
        assert!(!peak.user_edited);
        assert_eq!(peak.index_limits, (2, 9));
        assert_eq!(peak.x_limits, (2.0, 9.0));
        assert_eq!(peak.width, 7.0);
        assert_eq!(peak.height, 10.0);
        assert!((peak.integral - (55.0 / 6.0 + 0.5)).abs() < 1e-9);
        assert!((peak.ratio_h2 - peak.integral / 100.0).abs() < 1e-12);
        assert!((peak.ratio_hw - peak.integral / 70.0).abs() < 1e-12);
        assert!(log.is_empty());
    }

    #[test]
    fn failure_produces_the_uniform_sentinel() {
        let params = params();
        let data = data(
            vec![0.0, 0.0, 1.0, 4.0, 10.0, 9.0, 7.0, 4.0, 0.0, -6.0, -14.0, -24.0],
            vec![4],
            &params,
        );
        let mut log = AnalysisLog::new();
        let cand = Candidate {
            data: &data,
            order: 0,
            center: 4,
            half_width: 4,
        };
        let peak = compute_peak(&cand, &params, None, &mut log);

        assert!(!peak.successful);
        assert_eq!(peak.x_limits, (0.0, 0.0));
        assert_eq!(peak.width, -1.0);
        assert_eq!(peak.height, -1.0);
        assert_eq!(peak.integral, 0.0);
        assert_eq!(peak.fwhm, 0.0);
        assert_eq!(peak.reasons, None);
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].error, AnalysisError::BoundaryNotFound);
    }

    #[test]
    fn override_bypasses_the_search() {
        let params = params();
        let data = data(vec![0.0, 2.0, 10.0, 2.0, 0.0], vec![2], &params);
        let mut log = AnalysisLog::new();
        let cand = Candidate {
            data: &data,
            order: 0,
            center: 2,
            half_width: 2,
        };
        let peak = compute_peak(&cand, &params, Some((0, 4)), &mut log);

        assert!(peak.successful);
        assert!(peak.user_edited);
        assert_eq!(
            peak.reasons,
            Some((BoundaryReason::UserDefined, BoundaryReason::UserDefined))
        );
        assert_eq!(peak.width, 4.0);
        assert_eq!(peak.height, 10.0);
        assert!(log.is_empty());
    }

    #[test]
    fn zero_height_records_derived_metric_error() {
        // Boundary samples average exactly to the summit value.
        let params = params();
        let data = data(vec![10.0, 0.0, 10.0, 0.0, 10.0], vec![2], &params);
        let mut log = AnalysisLog::new();
        let cand = Candidate {
            data: &data,
            order: 0,
            center: 2,
            half_width: 2,
        };
        let peak = compute_peak(&cand, &params, Some((0, 4)), &mut log);

        assert!(peak.successful);
        assert_eq!(peak.height, 0.0);
        assert_eq!(peak.ratio_h2, 0.0);
        assert_eq!(peak.ratio_hw, 0.0);
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].error, AnalysisError::DerivedMetricError);
    }
}
