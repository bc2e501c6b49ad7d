use market::pulse::MIN_STATS_SAMPLES;
use market::{TrendLabel, breach_probability, classify_trend, compute_statistics};
use serde::Serialize;

use crate::decision::{AlertDecision, AlertReason, AlertThresholds, decide};

/// Read-only view of everything derived from the history at one instant.
///
/// This is what status displays render and what the dispatcher formats into
/// alert messages. It is recomputed from scratch on every read.
///
/// With fewer than five samples the statistics fields hold the all-zero
/// placeholder; `latest_price` still carries the newest observation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisSnapshot {
    pub latest_price: Option<f64>,
    pub current_price: f64,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub trend: TrendLabel,
    pub breach_probability: f64,
    pub target_price: f64,
    pub should_alert: bool,
    pub is_urgent: bool,
    pub reason: Option<AlertReason>,
    pub history_length: usize,
}

impl AnalysisSnapshot {
    /// True while the history is too short for statistics to mean anything.
    pub fn is_collecting(&self) -> bool {
        self.history_length < MIN_STATS_SAMPLES
    }

    pub fn decision(&self) -> AlertDecision {
        AlertDecision {
            should_alert: self.should_alert,
            reason: self.reason,
            is_urgent: self.is_urgent,
        }
    }
}

/// Runs statistics, trend, probability and decision over `prices` (oldest first).
pub fn analyze(prices: &[f64], thresholds: &AlertThresholds) -> AnalysisSnapshot {
    let samples = prices.len();
    let stats = compute_statistics(prices);
    let trend = classify_trend(prices);
    let probability = breach_probability(thresholds.target_price, &stats, samples);
    let decision = decide(&stats, trend, probability, samples, thresholds);

    AnalysisSnapshot {
        latest_price: prices.last().copied(),
        current_price: stats.current,
        mean: stats.mean,
        std: stats.std,
        min: stats.min,
        max: stats.max,
        trend,
        breach_probability: probability,
        target_price: thresholds.target_price,
        should_alert: decision.should_alert,
        is_urgent: decision.is_urgent,
        reason: decision.reason,
        history_length: samples,
    }
}
