//! Rolling-window helpers shared by the signal generators.
//!
//! Windows are recomputed from the slice on every bar instead of being
//! maintained incrementally, so two averages over the same points compare
//! exactly equal.

/// Mean over the trailing `window` points, using however many are available
/// once at least `min_periods` points exist.
#[must_use]
pub fn rolling_mean(values: &[f64], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|t| {
            let slice = trailing(values, t, window);
            if slice.len() < min_periods.max(1) {
                None
            } else {
                #[allow(clippy::cast_precision_loss)]
                let n = slice.len() as f64;
                Some(slice.iter().sum::<f64>() / n)
            }
        })
        .collect()
}

/// Sample standard deviation (n - 1) over the trailing `window` points.
///
/// Undefined with fewer than two points, regardless of `min_periods`.
#[must_use]
pub fn rolling_std(values: &[f64], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|t| {
            let slice = trailing(values, t, window);
            if slice.len() < min_periods.max(2) {
                return None;
            }
            #[allow(clippy::cast_precision_loss)]
            let n = slice.len() as f64;
            let mean = slice.iter().sum::<f64>() / n;
            let var = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            Some(var.sqrt())
        })
        .collect()
}

/// First difference; `None` where either side is undefined.
#[must_use]
pub fn diff(values: &[Option<f64>]) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|t| match (t.checked_sub(1).and_then(|p| values[p]), values[t]) {
            (Some(prev), Some(cur)) => Some(cur - prev),
            _ => None,
        })
        .collect()
}

/// Replaces undefined entries with `fill`.
#[must_use]
pub fn fill(values: &[Option<f64>], fill: f64) -> Vec<f64> {
    values.iter().map(|v| v.unwrap_or(fill)).collect()
}

fn trailing(values: &[f64], t: usize, window: usize) -> &[f64] {
    let start = (t + 1).saturating_sub(window);
    &values[start..=t]
}
