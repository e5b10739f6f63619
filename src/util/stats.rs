//! Order statistics over raw power samples.

/// Median of a slice, taken as the mean of the two central order statistics
/// for even lengths. The slice is reordered in place.
pub fn median(values: &mut [f32]) -> f32 {
    assert!(!values.is_empty(), "median of an empty slice");

    let mid = values.len() / 2;
    let (_, upper, _) = values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
    let upper = *upper;

    if values.len() % 2 == 1 {
        return upper;
    }

    let lower = values[..mid]
        .iter()
        .copied()
        .fold(f32::MIN, f32::max);
    0.5 * (lower + upper)
}

/// Two-pass mean and variance of a slice. Returns (0, 0) for an empty slice.
pub fn mean_variance(values: &[f32]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }

    let count = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / count;
    let variance = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / count;
    (mean, variance)
}
