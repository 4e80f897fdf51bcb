use std::collections::BTreeMap;

use crate::model::{Peak, PeakSet};

// ---------------------------------------------------------------------------
// Multi-metric ranking
// ---------------------------------------------------------------------------

const METRICS: usize = 6;

fn metric(peak: &Peak, m: usize) -> f64 {
    match m {
        0 => peak.integral,
        1 => peak.width,
        2 => peak.height,
        3 => peak.fwhm,
        4 => peak.ratio_h2,
        _ => peak.ratio_hw,
    }
}

/// Rank every metric descending (largest value = rank 0) and key the set by
/// integral rank.
///
/// The sort is stable, so peaks with equal metric values keep their center
/// order — rebuilding from identical inputs always yields identical ranks.
/// Failed peaks participate with their sentinel values and sink to the
/// bottom of most metrics.
pub(crate) fn apply(mut peaks: Vec<Peak>) -> PeakSet {
    let n = peaks.len();
    let mut orders: Vec<Vec<usize>> = Vec::with_capacity(METRICS);
    for m in 0..METRICS {
        let mut idx: Vec<usize> = (0..n).collect();
        idx.sort_by(|&a, &b| metric(&peaks[b], m).total_cmp(&metric(&peaks[a], m)));
        orders.push(idx);
    }

    for m in 0..METRICS {
        for (pos, &orig) in orders[m].iter().enumerate() {
            let ranks = &mut peaks[orig].ranks;
            match m {
                0 => ranks.integral = Some(pos),
                1 => ranks.width = Some(pos),
                2 => ranks.height = Some(pos),
                3 => ranks.fwhm = Some(pos),
                4 => ranks.ratio_h2 = Some(pos),
                _ => ranks.ratio_hw = Some(pos),
            }
        }
    }
    for peak in &mut peaks {
        peak.number = peak.ranks.integral;
    }

    let mut slots: Vec<Option<Peak>> = peaks.into_iter().map(Some).collect();
    let mut ranked = BTreeMap::new();
    for (pos, &orig) in orders[0].iter().enumerate() {
        ranked.insert(pos, slots[orig].take().unwrap());
    }
    PeakSet::from_ranked(ranked)
}

impl PeakSet {
    /// The set without the peaks at the given display ranks, re-ranked so
    /// the survivors carry a dense rank permutation again. The underlying
    /// metrics are untouched — only set membership and ranks change.
    pub fn without(&self, ranks: &[usize]) -> PeakSet {
        let retained: Vec<Peak> = {
            let mut kept: Vec<(usize, Peak)> = self
                .iter()
                .filter(|(rank, _)| !ranks.contains(rank))
                .map(|(rank, peak)| (rank, peak.clone()))
                .collect();
            // Recover center order so tie-breaking matches a fresh build.
            kept.sort_by_key(|(_, peak)| peak.center_order);
            kept.into_iter().map(|(_, peak)| peak).collect()
        };
        apply(retained)
    }
}
