//! Numeric helpers shared by smoothing and trend detection.

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Least-squares slope of `values` against their index positions 0..n-1.
///
/// `slope = Σ(dx·dy) / Σ(dx²)` where dx, dy are deviations from the
/// index mean and value mean. Returns 0.0 for fewer than two points or a
/// zero denominator (all indices identical — unreachable for n ≥ 2, the
/// guard stays regardless).
pub fn slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        numerator += dx * (y - y_mean);
        denominator += dx * dx;
    }

    if denominator == 0.0 {
        return 0.0;
    }
    numerator / denominator
}
