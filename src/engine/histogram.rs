use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Box-mesh quantization
// ---------------------------------------------------------------------------

/// Quantize `seq` onto a made-up mesh of levels spanning its value range.
///
/// The level count is given as a density: `box_count = density * (max - min)`
/// (fractional counts are allowed). Returns the quantized sequence together
/// with the half box width, which doubles as the mesh's uncertainty.
///
/// A zero-range input has no mesh to fit and fails with
/// [`AnalysisError::DegenerateHistogram`].
pub fn fit_boxes(seq: &[f64], density: f64) -> Result<(Vec<f64>, f64), AnalysisError> {
    let lo = seq.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = seq.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = hi - lo;
    if !(range > 0.0) {
        return Err(AnalysisError::DegenerateHistogram);
    }

    let box_count = density * range;
    let levels = box_count - 1.0;
    let quantized = seq
        .iter()
        .map(|&v| {
            let norm = (v - lo) / range;
            // Ties round to even, matching the reference quantizer.
            range * ((norm * levels).round_ties_even() / levels) + lo
        })
        .collect();
    Ok((quantized, range / (2.0 * box_count)))
}

// ---------------------------------------------------------------------------
// Outer-slope estimation
// ---------------------------------------------------------------------------

/// Estimate the dominant ("outer") value of a derivative window.
///
/// The density is raised in integer multiples (1x..9x) until the quantized
/// histogram is no longer perfectly flat — i.e. some level is occupied more
/// than once — and the most frequent level of that quantization is taken.
/// Ties between equally frequent levels resolve to the smallest value.
///
/// Returns `(outer_slope, half_box_width)`.
pub fn outer_slope(seq: &[f64], density: f64) -> Result<(f64, f64), AnalysisError> {
    let mut quantized = Vec::new();
    let mut half_box = 0.0;
    for k in 1..=9u32 {
        let (q, h) = fit_boxes(seq, density * f64::from(k))?;
        quantized = q;
        half_box = h;
        if has_repeats(&quantized) {
            break;
        }
    }

    let mut sorted = quantized;
    sorted.sort_by(f64::total_cmp);

    let mut best_value = sorted[0];
    let mut best_count = 0usize;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        if j - i > best_count {
            best_count = j - i;
            best_value = sorted[i];
        }
        i = j;
    }
    Ok((best_value, half_box))
}

fn has_repeats(seq: &[f64]) -> bool {
    let mut sorted = seq.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.windows(2).any(|w| w[0] == w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_range_input_is_degenerate() {
        assert_eq!(
            fit_boxes(&[5.0, 5.0, 5.0], 1.0).unwrap_err(),
            AnalysisError::DegenerateHistogram
        );
        assert_eq!(
            fit_boxes(&[], 1.0).unwrap_err(),
            AnalysisError::DegenerateHistogram
        );
    }

    #[test]
    fn quantizes_onto_the_mesh() {
        let (fit, half) = fit_boxes(&[1.0, 1.0, 1.0, 2.0, 2.0, 3.0], 1.0).unwrap();
        assert!(half > 0.0);
        assert_eq!(fit.len(), 6);
        // Range ends always map onto themselves.
        assert_eq!(fit[0], 1.0);
        assert_eq!(fit[5], 3.0);
        // Every level stays within the value range.
        assert!(fit.iter().all(|&v| (1.0..=3.0).contains(&v)));
    }

    #[test]
    fn half_box_width_follows_density() {
        let (_, h1) = fit_boxes(&[0.0, 1.0], 2.0).unwrap();
        let (_, h2) = fit_boxes(&[0.0, 1.0], 4.0).unwrap();
        assert!((h1 - 0.25).abs() < 1e-12);
        assert!((h2 - 0.125).abs() < 1e-12);
    }

    #[test]
    fn outer_slope_finds_the_dominant_level() {
        // Mostly-flat window with one excursion: the flat level dominates.
        let window = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 4.0, 9.0, 4.0, 0.0];
        let (slope, half) = outer_slope(&window, 1.0).unwrap();
        assert_eq!(slope, 0.0);
        assert!(half > 0.0);
    }

    #[test]
    fn outer_slope_fails_on_flat_window() {
        assert_eq!(
            outer_slope(&[2.0; 8], 1.0).unwrap_err(),
            AnalysisError::DegenerateHistogram
        );
    }
}
