use huematch::densify::Sample;

/// Center of bucket `index` on an axis of `buckets` cells.
pub fn center(index: usize, buckets: usize) -> f64 {
    (index as f64 + 0.5) / buckets as f64
}

/// A small, deterministic mix of positive and background labels.
pub fn mixed_samples() -> Vec<Sample> {
    vec![
        Sample::new(0.31, 0.33, 0.42, 1.0),
        Sample::new(0.34, 0.30, 0.55, 1.0),
        Sample::new(0.62, 0.28, 0.47, 0.0),
        Sample::new(0.12, 0.71, 0.90, 0.0),
        Sample::new(0.48, 0.52, 0.15, 2.0),
    ]
}
