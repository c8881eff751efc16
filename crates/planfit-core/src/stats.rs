//! Small statistical helpers
//!
//! Every ratio with a zero denominator is `None` rather than `0.0`, so
//! insufficient data is never averaged in as a real value.

use serde::{Deserialize, Serialize};

/// z value for a two-sided 95% interval
pub const Z_95: f64 = 1.96;

/// `num / den`, or `None` when the denominator is zero
pub fn ratio(num: f64, den: f64) -> Option<f64> {
    if den == 0.0 { None } else { Some(num / den) }
}

/// Arithmetic mean, or `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    ratio(values.iter().sum(), values.len() as f64)
}

/// Median, or `None` for an empty slice
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Wilson score interval for a binomial proportion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WilsonInterval {
    /// Adjusted center of the interval
    pub center: f64,
    /// Half-width before clipping to [0, 1]
    pub half_width: f64,
    /// Lower bound, clipped at 0
    pub lower: f64,
    /// Upper bound, clipped at 1
    pub upper: f64,
}

impl WilsonInterval {
    /// Variance implied by the half-width under a normal approximation
    pub fn variance(&self, z: f64) -> f64 {
        (self.half_width / z).powi(2)
    }
}

/// Wilson score interval for `successes` out of `n`, or `None` when `n == 0`
pub fn wilson_interval(successes: usize, n: usize, z: f64) -> Option<WilsonInterval> {
    if n == 0 {
        return None;
    }
    let n = n as f64;
    let p_hat = successes as f64 / n;
    let z2 = z * z;
    let denom = 1.0 + z2 / n;
    let center = (p_hat + z2 / (2.0 * n)) / denom;
    let half_width = z * (p_hat * (1.0 - p_hat) / n + z2 / (4.0 * n * n)).sqrt() / denom;

    Some(WilsonInterval {
        center,
        half_width,
        lower: (center - half_width).max(0.0),
        upper: (center + half_width).min(1.0),
    })
}
