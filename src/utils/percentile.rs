//! Percentile helpers
//!
//! Linear interpolation between closest ranks, the same definition numpy uses
//! by default: rank = p/100 × (n − 1).

/// Value at `percentile` (0-100) of `values`
///
/// Returns `None` for an empty slice. Percentiles outside 0-100 are clamped.
pub fn percentile(values: &[f64], percentile: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let p = percentile.clamp(0.0, 100.0);
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        return Some(sorted[lower]);
    }

    let fraction = rank - lower as f64;
    Some(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}
