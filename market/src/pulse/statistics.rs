use serde::Serialize;

use super::{MIN_STATS_SAMPLES, mean};

/// Descriptive statistics over the whole history.
///
/// All fields are zero when fewer than five samples exist. That value means
/// "no opinion", never a real zero price.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PriceStatistics {
    pub mean: f64,
    /// Population standard deviation (divides by N).
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub current: f64,
}

impl PriceStatistics {
    pub fn is_sufficient(&self) -> bool {
        *self != Self::default()
    }
}

pub fn compute_statistics(prices: &[f64]) -> PriceStatistics {
    if prices.len() < MIN_STATS_SAMPLES {
        return PriceStatistics::default();
    }

    let mean = mean(prices);
    let variance = prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / prices.len() as f64;

    let (min, max) = prices
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| {
            (lo.min(p), hi.max(p))
        });

    PriceStatistics {
        mean,
        std: variance.sqrt(),
        min,
        max,
        current: prices[prices.len() - 1],
    }
}
