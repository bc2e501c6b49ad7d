use statrs::function::erf::erf;

use super::MIN_TREND_SAMPLES;
use super::statistics::PriceStatistics;

/// Modeled probability that the price sits below `target_price`.
///
/// Treats the history as normally distributed with the given mean and std and
/// evaluates the standard normal CDF at `z = (target - mean) / std`:
///
/// ```text
/// Φ(z) = 0.5 · (1 + erf(z / √2))
/// ```
///
/// Returns `0.0` with fewer than ten samples or when the history has no variance.
pub fn breach_probability(target_price: f64, stats: &PriceStatistics, samples: usize) -> f64 {
    if samples < MIN_TREND_SAMPLES || stats.std == 0.0 {
        return 0.0;
    }

    let z = (target_price - stats.mean) / stats.std;
    standard_normal_cdf(z)
}

pub fn standard_normal_cdf(z: f64) -> f64 {
    (0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))).clamp(0.0, 1.0)
}
