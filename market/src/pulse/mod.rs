//! Price Pulses
//!
//! A pulse is a side-effect-free observer that derives one market signal
//! (statistics, trend, breach probability) from an ordered slice of prices,
//! oldest first. Pulses never hold state of their own; the caller owns the history.

pub mod probability;
pub mod statistics;
pub mod trend;

/// Samples required before statistics (and alert decisions) are meaningful.
pub const MIN_STATS_SAMPLES: usize = 5;

/// Samples required by the trend classifier and the breach probability estimator.
pub const MIN_TREND_SAMPLES: usize = 10;

/// Arithmetic mean. Callers guarantee a non-empty slice.
pub(crate) fn mean(prices: &[f64]) -> f64 {
    prices.iter().sum::<f64>() / prices.len() as f64
}
