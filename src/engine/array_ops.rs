use crate::model::Spectrum;

// ---------------------------------------------------------------------------
// Smoothing
// ---------------------------------------------------------------------------

/// Apply `iterations` passes of the {1, 2, 1}/4 kernel to the interior
/// points of `seq`. Both endpoints are clamped to 0.0 on every pass.
///
/// `smooth(seq, 0)` returns the sequence unchanged.
pub fn smooth(seq: &[f64], iterations: usize) -> Vec<f64> {
    let mut cur = seq.to_vec();
    if cur.len() < 2 {
        return cur;
    }
    for _ in 0..iterations {
        let mut next = Vec::with_capacity(cur.len());
        next.push(0.0);
        for i in 1..cur.len() - 1 {
            next.push((cur[i - 1] + 2.0 * cur[i] + cur[i + 1]) / 4.0);
        }
        next.push(0.0);
        cur = next;
    }
    cur
}

/// Smooth only the y side of a spectrum; x is untouched.
pub fn smooth_y(spectrum: &Spectrum, iterations: usize) -> Vec<f64> {
    smooth(spectrum.y(), iterations)
}

// ---------------------------------------------------------------------------
// Local extrema
// ---------------------------------------------------------------------------

/// Indices of local extrema of `seq`: maxima for `sign = 1`, minima for
/// `sign = -1`.
///
/// An index i is reported when the discrete-derivative sign flips from
/// `sign` to `-sign` at i. Plateau rule: when the derivative matches `sign`
/// and then hits exactly 0, every index of the flat run is reported iff the
/// first nonzero derivative after the run is `-sign`.
pub fn local_extrema(seq: &[f64], sign: i32) -> Vec<usize> {
    let n = seq.len();
    if n < 3 {
        return Vec::new();
    }
    let dersgn: Vec<i32> = seq
        .windows(2)
        .map(|w| {
            if w[1] > w[0] {
                1
            } else if w[1] < w[0] {
                -1
            } else {
                0
            }
        })
        .collect();

    let mut extrema = Vec::new();
    for i in 0..n - 2 {
        if dersgn[i] == sign && dersgn[i + 1] == -sign {
            extrema.push(i + 1);
        }
        if dersgn[i] == sign && dersgn[i + 1] == 0 {
            for j in i + 1..n - 1 {
                if dersgn[j] != 0 {
                    if dersgn[j] == -sign {
                        extrema.extend(i + 1..=j);
                    }
                    break;
                }
            }
        }
    }
    extrema
}

/// Indices of local maxima of a spectrum, found on a copy of y smoothed by
/// `smoothing` passes, with optional filters: keep only maxima whose x lies
/// within `x_window` and whose (smoothed) y is at least `y_floor`.
pub fn find_maxima(
    spectrum: &Spectrum,
    smoothing: usize,
    x_window: Option<(f64, f64)>,
    y_floor: Option<f64>,
) -> Vec<usize> {
    let ys = smooth_y(spectrum, smoothing);
    let x = spectrum.x();
    local_extrema(&ys, 1)
        .into_iter()
        .filter(|&i| x_window.is_none_or(|(lo, hi)| x[i] >= lo && x[i] <= hi))
        .filter(|&i| y_floor.is_none_or(|floor| ys[i] >= floor))
        .collect()
}

/// Like [`find_maxima`] but for minima; `y_floor` becomes a ceiling.
pub fn find_minima(
    spectrum: &Spectrum,
    smoothing: usize,
    x_window: Option<(f64, f64)>,
    y_ceiling: Option<f64>,
) -> Vec<usize> {
    let ys = smooth_y(spectrum, smoothing);
    let x = spectrum.x();
    local_extrema(&ys, -1)
        .into_iter()
        .filter(|&i| x_window.is_none_or(|(lo, hi)| x[i] >= lo && x[i] <= hi))
        .filter(|&i| y_ceiling.is_none_or(|ceil| ys[i] <= ceil))
        .collect()
}

// ---------------------------------------------------------------------------
// Bracket / nearest lookup over ordered sequences
// ---------------------------------------------------------------------------

/// The two consecutive elements of a monotonic sequence that bracket
/// `value`, as `(first, second)` in sequence order. Exact membership returns
/// `(value, value)`; a value outside the sequence range returns `None`.
pub fn nearest_bracket(seq: &[f64], value: f64) -> Option<(f64, f64)> {
    bracket_indices(seq, value).map(|(i, j)| (seq[i], seq[j]))
}

/// Index variant of [`nearest_bracket`]. Exact membership returns the first
/// matching index twice.
pub fn bracket_indices(seq: &[f64], value: f64) -> Option<(usize, usize)> {
    if let Some(i) = seq.iter().position(|&v| v == value) {
        return Some((i, i));
    }
    for i in 0..seq.len().saturating_sub(1) {
        let (a, b) = (seq[i], seq[i + 1]);
        if (a < value && value < b) || (a > value && value > b) {
            return Some((i, i + 1));
        }
    }
    None
}

/// The element of a monotonic sequence closest to `value`, or `None` when
/// `value` falls outside the sequence range.
///
/// On exact equidistance between the two bracket elements, the one at the
/// smaller index wins.
pub fn nearest(seq: &[f64], value: f64) -> Option<f64> {
    nearest_index(seq, value).map(|i| seq[i])
}

/// Index variant of [`nearest`]; same tie-break.
pub fn nearest_index(seq: &[f64], value: f64) -> Option<usize> {
    let (i, j) = bracket_indices(seq, value)?;
    if (seq[i] - value).abs() <= (seq[j] - value).abs() {
        Some(i)
    } else {
        Some(j)
    }
}
