//! Alert decision.
//!
//! Turns statistics, trend and breach probability into an alert flag, a reason
//! and an independent urgency flag.
//
//  This module is deliberately pure: no async, no IO, no clock.

use std::fmt;

use market::pulse::MIN_STATS_SAMPLES;
use market::{PriceStatistics, TrendLabel};
use serde::Serialize;

/// Fixed thresholds the decision is evaluated against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlertThresholds {
    /// Price the operator cares about falling below.
    pub target_price: f64,

    /// `k` in `current <= mean - k * std`.
    pub std_multiplier: f64,

    /// Breach probability at or above which an alert fires.
    pub probability_threshold: f64,

    /// Any price at or below this is urgent.
    pub critical_price: f64,

    /// Breach probability that makes a strong downtrend urgent.
    pub strong_downtrend_probability: f64,

    /// Prices within this distance above the target are urgent.
    pub urgency_margin: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            target_price: 41.0,
            std_multiplier: 2.0,
            probability_threshold: 0.7,
            critical_price: 41.5,
            strong_downtrend_probability: 0.85,
            urgency_margin: 0.5,
        }
    }
}

/// Why an alert fired. Variants are listed in evaluation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertReason {
    CurrentPriceBelowTarget,
    PriceWithinStdDeviations,
    HighDropProbability,
}

impl AlertReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CurrentPriceBelowTarget => "current_price_below_target",
            Self::PriceWithinStdDeviations => "price_within_std_deviations",
            Self::HighDropProbability => "high_drop_probability",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::CurrentPriceBelowTarget => "Current Price Below Target",
            Self::PriceWithinStdDeviations => "Price Within Std Deviations",
            Self::HighDropProbability => "High Drop Probability",
        }
    }
}

impl fmt::Display for AlertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AlertDecision {
    pub should_alert: bool,
    pub reason: Option<AlertReason>,
    pub is_urgent: bool,
}

/// Evaluates both the alert reason and the urgency flag.
///
/// `samples` is the history length the statistics were computed from. Below five
/// samples the result is always a quiet, non-urgent decision.
pub fn decide(
    stats: &PriceStatistics,
    trend: TrendLabel,
    probability: f64,
    samples: usize,
    t: &AlertThresholds,
) -> AlertDecision {
    if samples < MIN_STATS_SAMPLES {
        return AlertDecision::default();
    }

    let reason = alert_reason(stats, probability, t);

    AlertDecision {
        should_alert: reason.is_some(),
        reason,
        is_urgent: is_urgent(stats.current, trend, probability, t),
    }
}

/// First matching rule wins.
fn alert_reason(stats: &PriceStatistics, probability: f64, t: &AlertThresholds) -> Option<AlertReason> {
    let current = stats.current;

    if current <= t.target_price {
        return Some(AlertReason::CurrentPriceBelowTarget);
    }

    // Band is relative to the mean, not to the target.
    let lower_bound = stats.mean - t.std_multiplier * stats.std;
    if current <= lower_bound {
        return Some(AlertReason::PriceWithinStdDeviations);
    }

    if probability >= t.probability_threshold {
        return Some(AlertReason::HighDropProbability);
    }

    None
}

fn is_urgent(current: f64, trend: TrendLabel, probability: f64, t: &AlertThresholds) -> bool {
    let is_critical_price = current <= t.critical_price;
    let is_strong_downtrend =
        trend == TrendLabel::StrongDowntrend && probability >= t.strong_downtrend_probability;
    let is_very_close = current <= t.target_price + t.urgency_margin;

    is_critical_price || is_strong_downtrend || is_very_close
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(current: f64, mean: f64, std: f64) -> PriceStatistics {
        PriceStatistics {
            mean,
            std,
            min: current.min(mean),
            max: current.max(mean),
            current,
        }
    }

    /// Thresholds with the urgency rules pushed out of the way.
    fn calm() -> AlertThresholds {
        AlertThresholds {
            critical_price: 0.0,
            urgency_margin: 0.0,
            ..AlertThresholds::default()
        }
    }

    #[test]
    fn no_decision_before_five_samples() {
        let d = decide(&stats(10.0, 10.0, 0.0), TrendLabel::InsufficientData, 1.0, 4, &calm());
        assert_eq!(d, AlertDecision::default());
    }

    #[test]
    fn at_target_beats_std_band() {
        // current == target, and also far below mean - 2*std
        let d = decide(&stats(41.0, 60.0, 1.0), TrendLabel::Sideways, 0.0, 20, &calm());

        assert!(d.should_alert);
        assert_eq!(d.reason, Some(AlertReason::CurrentPriceBelowTarget));
    }

    #[test]
    fn std_band_fires_above_target() {
        // lower bound = 50 - 2*2 = 46
        let d = decide(&stats(45.0, 50.0, 2.0), TrendLabel::Sideways, 0.99, 20, &calm());

        assert_eq!(d.reason, Some(AlertReason::PriceWithinStdDeviations));
    }

    #[test]
    fn std_band_boundary_is_inclusive() {
        let d = decide(&stats(46.0, 50.0, 2.0), TrendLabel::Sideways, 0.0, 20, &calm());
        assert_eq!(d.reason, Some(AlertReason::PriceWithinStdDeviations));
    }

    #[test]
    fn probability_fires_last() {
        let t = calm();

        let at = decide(&stats(48.0, 50.0, 2.0), TrendLabel::Sideways, 0.7, 20, &t);
        assert_eq!(at.reason, Some(AlertReason::HighDropProbability));

        let below = decide(&stats(48.0, 50.0, 2.0), TrendLabel::Sideways, 0.69, 20, &t);
        assert!(!below.should_alert);
        assert_eq!(below.reason, None);
    }

    #[test]
    fn urgency_is_independent_of_alert() {
        // Quiet decision, but price is under the critical threshold.
        let t = AlertThresholds {
            target_price: 10.0,
            critical_price: 50.0,
            ..AlertThresholds::default()
        };
        let d = decide(&stats(45.0, 40.0, 1.0), TrendLabel::Sideways, 0.0, 20, &t);

        assert!(!d.should_alert);
        assert!(d.is_urgent);
    }

    #[test]
    fn strong_downtrend_needs_high_probability() {
        let t = calm();

        let weak = decide(&stats(60.0, 60.0, 1.0), TrendLabel::StrongDowntrend, 0.84, 20, &t);
        assert!(!weak.is_urgent);

        let strong = decide(&stats(60.0, 60.0, 1.0), TrendLabel::StrongDowntrend, 0.85, 20, &t);
        assert!(strong.is_urgent);

        let other_trend = decide(&stats(60.0, 60.0, 1.0), TrendLabel::Downtrend, 0.99, 20, &t);
        assert!(!other_trend.is_urgent);
    }

    #[test]
    fn close_to_target_is_urgent() {
        let t = AlertThresholds {
            critical_price: 0.0,
            ..AlertThresholds::default()
        };

        assert!(decide(&stats(41.5, 41.5, 0.0), TrendLabel::Sideways, 0.0, 5, &t).is_urgent);
        assert!(!decide(&stats(41.6, 41.6, 0.0), TrendLabel::Sideways, 0.0, 5, &t).is_urgent);
    }

    #[test]
    fn flat_history_sits_on_the_std_band() {
        // std == 0 puts the lower bound exactly at the mean.
        let d = decide(&stats(45.0, 45.0, 0.0), TrendLabel::Sideways, 0.0, 20, &calm());
        assert_eq!(d.reason, Some(AlertReason::PriceWithinStdDeviations));
    }

    #[test]
    fn reason_renders() {
        assert_eq!(
            AlertReason::HighDropProbability.to_string(),
            "high_drop_probability"
        );
        assert_eq!(
            AlertReason::CurrentPriceBelowTarget.title(),
            "Current Price Below Target"
        );
    }
}
