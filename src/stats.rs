//! Small numeric helpers shared by the filter: percentiles, moments, symmetrization.

use nalgebra::DMatrix;

/// How many standard deviations above the mean a weight must be to become an edge.
pub const THRESHOLD_STD_SCALE: f64 = 0.5;

/// `q`-th percentile (`q` in `[0, 100]`) with linear interpolation between closest ranks.
///
/// Matches numpy's default `percentile` method. Returns `None` for empty input.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let t = rank - lo as f64;
    Some(lerp(sorted[lo], sorted[hi], t))
}

// Evaluated from the nearer endpoint so the result never overshoots `b` when t -> 1.
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let diff = b - a;
    if t >= 0.5 {
        b - diff * (1.0 - t)
    } else {
        a + diff * t
    }
}

/// Mean and population standard deviation (ddof = 0), two-pass.
///
/// `values` is called twice and must yield the same sequence both times; this lets callers
/// stream entries instead of collecting them. Empty input yields `(0.0, 0.0)`.
pub fn mean_std<F, I>(values: F) -> (f64, f64)
where
    F: Fn() -> I,
    I: Iterator<Item = f64>,
{
    let mut count = 0usize;
    let mut sum = 0.0;
    for x in values() {
        sum += x;
        count += 1;
    }
    if count == 0 {
        return (0.0, 0.0);
    }
    let mean = sum / count as f64;
    let var = values().map(|x| (x - mean) * (x - mean)).sum::<f64>() / count as f64;
    (mean, var.sqrt())
}

/// Edge threshold from weight moments: `mean + 0.5 * std`.
pub fn threshold_from_stats(mean: f64, std: f64) -> f64 {
    mean + THRESHOLD_STD_SCALE * std
}

/// Symmetrized value of an off-diagonal pair.
pub fn symmetric_entry(w_ij: f64, w_ji: f64) -> f64 {
    (w_ij + w_ji) / 2.0
}

/// Replace `w` by `(w + wᵗ) / 2` in place. The result is exactly symmetric.
///
/// Panics if `w` is not square.
pub fn symmetrize(w: &mut DMatrix<f64>) {
    assert!(
        w.is_square(),
        "symmetrize needs a square matrix (got {}x{})",
        w.nrows(),
        w.ncols()
    );
    let n = w.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            let s = symmetric_entry(w[(i, j)], w[(j, i)]);
            w[(i, j)] = s;
            w[(j, i)] = s;
        }
    }
}
