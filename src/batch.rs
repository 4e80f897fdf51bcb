use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::builder;
use crate::error::AnalysisLog;
use crate::model::{PeakSet, SubstanceData};
use crate::params::PeakParams;

// ---------------------------------------------------------------------------
// Parallel analysis across substances
// ---------------------------------------------------------------------------

/// One substance's finished analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstanceResult {
    pub name: String,
    pub peaks: PeakSet,
    pub log: AnalysisLog,
}

/// Build peak sets for every substance in parallel.
///
/// Each build reads only its own substance's data and owns its own error
/// log, so the workers share nothing and need no locking. Results come back
/// in input order.
pub fn analyze_all(inputs: &[SubstanceData], params: &PeakParams) -> Vec<SubstanceResult> {
    inputs
        .par_iter()
        .map(|data| {
            let (peaks, log) = builder::build_peak_set(data, params);
            SubstanceResult {
                name: data.name.clone(),
                peaks,
                log,
            }
        })
        .collect()
}

/// Merge the per-substance logs of a batch into one accumulator.
pub fn merged_log(results: &[SubstanceResult]) -> AnalysisLog {
    let mut merged = AnalysisLog::new();
    for result in results {
        merged.merge(result.log.clone());
    }
    merged
}

// ---------------------------------------------------------------------------
// Cross-substance peak lookup
// ---------------------------------------------------------------------------

/// A peak from some substance, measured by its distance to a probe
/// position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakMatch {
    pub substance: String,
    /// Display rank of the matched peak within its own set.
    pub rank: usize,
    /// `|center_x - probe_x|`.
    pub distance: f64,
}

/// For every substance in `results`, its peak center closest to `probe_x`,
/// sorted by ascending distance. Substances without peaks are skipped.
pub fn closest_peaks(results: &[SubstanceResult], probe_x: f64) -> Vec<PeakMatch> {
    let mut matches: Vec<PeakMatch> = results
        .iter()
        .filter_map(|result| {
            result
                .peaks
                .iter()
                .map(|(rank, peak)| PeakMatch {
                    substance: result.name.clone(),
                    rank,
                    distance: (peak.center_x - probe_x).abs(),
                })
                .min_by(|a, b| a.distance.total_cmp(&b.distance))
        })
        .collect();
    matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Derivatives, Spectrum};

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

    fn substance(name: &str, shift: f64, params: &PeakParams) -> SubstanceData {
        let y = vec![
            0.0, 0.0, 0.0, 0.0, 1.0, 4.0, 10.0, 4.0, 1.0, 0.0, 0.0, 0.0, 0.0,
        ];
        let x = (0..y.len()).map(|i| i as f64 + shift).collect();
        let spectrum = Spectrum::new(x, y).unwrap();
        let derivatives = Derivatives::from_spectrum(&spectrum, params);
        SubstanceData::from_parts(name, spectrum, derivatives, vec![6]).unwrap()
    }

    #[test]
    fn parallel_results_keep_input_order() {
        let params = params();
        let inputs = vec![
            substance("a", 0.0, &params),
            substance("b", 100.0, &params),
            substance("c", 200.0, &params),
        ];
        let results = analyze_all(&inputs, &params);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].name, "a");
        assert_eq!(results[1].name, "b");
        assert_eq!(results[2].name, "c");
        for result in &results {
            assert_eq!(result.peaks.len(), 1);
            assert!(result.log.is_empty());
        }
    }

    #[test]
    fn parallel_matches_serial() {
        let params = params();
        let inputs = vec![substance("a", 0.0, &params), substance("b", 50.0, &params)];
        let parallel = analyze_all(&inputs, &params);
        for (input, result) in inputs.iter().zip(&parallel) {
            let (peaks, log) = builder::build_peak_set(input, &params);
            assert_eq!(result.peaks, peaks);
            assert_eq!(result.log, log);
        }
    }

    #[test]
    fn closest_peaks_sorts_by_distance() {
        let params = params();
        let inputs = vec![
            substance("near", 0.0, &params),   // center at x = 6
            substance("far", 100.0, &params),  // center at x = 106
        ];
        let results = analyze_all(&inputs, &params);

        let matches = closest_peaks(&results, 10.0);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].substance, "near");
        assert_eq!(matches[0].distance, 4.0);
        assert_eq!(matches[1].substance, "far");
        assert_eq!(matches[1].distance, 96.0);
    }

    #[test]
    fn merged_log_joins_per_substance_entries() {
        let params = params();
        // One healthy substance, one whose only candidate cannot be
        // bounded.
        let y = vec![
            0.0, 0.0, 1.0, 4.0, 10.0, 9.0, 7.0, 4.0, 0.0, -6.0, -14.0, -24.0,
        ];
        let x = (0..y.len()).map(|i| i as f64).collect();
        let spectrum = Spectrum::new(x, y).unwrap();
        let derivatives = Derivatives::from_spectrum(&spectrum, &params);
        let bad = SubstanceData::from_parts("runaway", spectrum, derivatives, vec![4]).unwrap();

        let inputs = vec![substance("ok", 0.0, &params), bad];
        let results = analyze_all(&inputs, &params);
        let log = merged_log(&results);

        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].substance, "runaway");
    }
}
