//! Message templates for alerts, spoken alerts and status updates.
//!
//! Text messages use Telegram's HTML subset.

use std::time::Duration;

use chrono::{DateTime, Utc};
use market::pulse::MIN_STATS_SAMPLES;

use crate::analysis::AnalysisSnapshot;
use crate::decision::AlertThresholds;
use crate::dispatch::AlertStatus;

pub const TEST_VOICE_PHRASE: &str =
    "This is a test voice message from your price monitor. Your voice alert system is working correctly.";

fn stamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn percent(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

fn mark(flag: bool) -> &'static str {
    if flag { "✅" } else { "❌" }
}

pub fn text_alert(s: &AnalysisSnapshot, at: DateTime<Utc>) -> String {
    let (headline, call_to_action) = if s.is_urgent {
        (
            "🚨🚨🚨 <b>CRITICAL ALERT!</b> 🚨🚨🚨",
            "⚠️ <b>CRITICAL:</b> IMMEDIATE ACTION REQUIRED!",
        )
    } else {
        (
            "🚨 <b>PRICE ALERT!</b> 🚨",
            "⚠️ <b>URGENT:</b> Check your trading platform NOW!",
        )
    };

    format!(
        "{headline}\n\n\
         💰 <b>Current Price:</b> ${:.2}\n\
         🎯 <b>Target Price:</b> ${:.2}\n\
         📊 <b>Drop Probability:</b> {}\n\
         📈 <b>Trend:</b> {}\n\n\
         {call_to_action}\n\n\
         ⏰ <b>Time:</b> {}",
        s.current_price,
        s.target_price,
        percent(s.breach_probability),
        s.trend.title(),
        stamp(at),
    )
}

/// Script read out by the voice channel. Plain text, no markup.
pub fn voice_script(s: &AnalysisSnapshot) -> String {
    let (prefix, suffix) = if s.is_urgent {
        ("CRITICAL ALERT! ", "IMMEDIATE ACTION REQUIRED!")
    } else {
        ("Alert! ", "Please check your trading platform immediately.")
    };

    format!(
        "{prefix}Price alert! \
         Current price is {:.2} dollars. \
         Target price is {:.2} dollars. \
         Drop probability is {}. \
         Trend is {}. \
         {suffix}",
        s.current_price,
        s.target_price,
        percent(s.breach_probability),
        s.trend.title(),
    )
}

pub fn status_update(asset: &str, s: &AnalysisSnapshot, at: DateTime<Utc>) -> String {
    if s.is_collecting() {
        return collecting_update(asset, s, at);
    }

    let marker = if s.should_alert { "🚨" } else { "✅" };

    let mut msg = format!(
        "{marker} <b>{asset} Price Status</b>\n\n\
         💰 <b>Current Price:</b> ${:.2}\n\
         📊 <b>Trend:</b> {} {}\n\
         🎯 <b>Target Price:</b> ${:.2}\n\
         📈 <b>Drop Probability:</b> {}\n\n\
         📊 <b>Statistics:</b>\n\
         • Mean Price: ${:.2}\n\
         • Std Deviation: ${:.2}\n\
         • Price Range: ${:.2} - ${:.2}\n\
         • Samples: {}\n\n\
         ⏰ <b>Last Updated:</b> {}",
        s.current_price,
        s.trend.arrow(),
        s.trend.title(),
        s.target_price,
        percent(s.breach_probability),
        s.mean,
        s.std,
        s.min,
        s.max,
        s.history_length,
        stamp(at),
    );

    if s.should_alert {
        let reason = s.reason.map(|r| r.title()).unwrap_or("Unknown");
        msg.push_str(&format!("\n🚨 <b>ALERT:</b> {reason}"));
    }

    msg
}

/// Too few samples for statistics: show the raw price and progress only.
fn collecting_update(asset: &str, s: &AnalysisSnapshot, at: DateTime<Utc>) -> String {
    let price = match s.latest_price {
        Some(p) => format!("${p:.2}"),
        None => "n/a".to_string(),
    };

    format!(
        "⏳ <b>{asset} Price Status</b>\n\n\
         💰 <b>Latest Price:</b> {price}\n\
         🎯 <b>Target Price:</b> ${:.2}\n\n\
         📊 Collecting data ({}/{MIN_STATS_SAMPLES}). No analysis yet.\n\n\
         ⏰ <b>Last Updated:</b> {}",
        s.target_price,
        s.history_length,
        stamp(at),
    )
}

pub fn settings_summary(
    t: &AlertThresholds,
    update_interval: Duration,
    status: &AlertStatus,
) -> String {
    format!(
        "⚙️ <b>Settings</b>\n\n\
         Target Price: ${:.2}\n\
         Standard Deviations: {}\n\
         Update Interval: {} minutes\n\
         Alert Threshold: {}\n\
         Critical Price: ${:.2}\n\
         Strong Downtrend Threshold: {}\n\n\
         🔊 <b>Voice Messages:</b> {}\n\
         📱 <b>Text Alerts:</b> {}\n\
         ⏳ <b>Cooldown:</b> {} minutes ({} minutes when critical)\n\
         • Can Send Alert: {}",
        t.target_price,
        t.std_multiplier,
        update_interval.as_secs() / 60,
        percent(t.probability_threshold),
        t.critical_price,
        percent(t.strong_downtrend_probability),
        mark(status.voice_enabled),
        mark(status.text_enabled),
        status.standard_cooldown.as_secs() / 60,
        status.urgent_cooldown.as_secs() / 60,
        mark(status.can_dispatch),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 6, 12, 30, 0).unwrap()
    }

    fn alerting_snapshot() -> AnalysisSnapshot {
        let mut prices = vec![42.0; 5];
        prices.push(40.0);
        analyze(&prices, &AlertThresholds::default())
    }

    #[test]
    fn critical_text_alert() {
        let msg = text_alert(&alerting_snapshot(), at());

        assert!(msg.contains("CRITICAL ALERT!"));
        assert!(msg.contains("$40.00"));
        assert!(msg.contains("$41.00"));
        assert!(msg.contains("0.0%"));
        assert!(msg.contains("Insufficient Data"));
        assert!(msg.contains("2025-08-06 12:30:00 UTC"));
    }

    #[test]
    fn regular_text_alert() {
        let mut s = alerting_snapshot();
        s.is_urgent = false;

        let msg = text_alert(&s, at());
        assert!(msg.starts_with("🚨 <b>PRICE ALERT!</b>"));
        assert!(!msg.contains("CRITICAL"));
    }

    #[test]
    fn voice_script_has_no_markup() {
        let script = voice_script(&alerting_snapshot());

        assert!(script.starts_with("CRITICAL ALERT! "));
        assert!(script.contains("Current price is 40.00 dollars."));
        assert!(!script.contains('<'));
    }

    #[test]
    fn status_update_appends_reason_when_alerting() {
        let msg = status_update("SOL", &alerting_snapshot(), at());

        assert!(msg.starts_with("🚨 <b>SOL Price Status</b>"));
        assert!(msg.ends_with("🚨 <b>ALERT:</b> Current Price Below Target"));
    }

    #[test]
    fn quiet_status_update() {
        let s = analyze(&[50.0, 51.0, 52.0, 51.5, 50.5], &AlertThresholds::default());
        let msg = status_update("SOL", &s, at());

        assert!(msg.starts_with("✅"));
        assert!(!msg.contains("ALERT:"));
        assert!(msg.contains("Samples: 5"));
    }

    #[test]
    fn short_history_shows_progress_not_zeroes() {
        let s = analyze(&[38.0], &AlertThresholds::default());
        let msg = status_update("SOL", &s, at());

        assert!(msg.starts_with("⏳ <b>SOL Price Status</b>"));
        assert!(msg.contains("<b>Latest Price:</b> $38.00"));
        assert!(msg.contains("Collecting data (1/5)"));
        assert!(!msg.contains("$0.00"));
        assert!(!msg.contains("Mean Price"));
        assert!(!msg.contains("ALERT:"));
    }

    #[test]
    fn settings_show_gate_state() {
        let status = AlertStatus {
            text_enabled: true,
            voice_enabled: false,
            last_alert_ms: None,
            can_dispatch: true,
            standard_cooldown: Duration::from_secs(300),
            urgent_cooldown: Duration::from_secs(60),
        };

        let msg = settings_summary(
            &AlertThresholds::default(),
            Duration::from_secs(30 * 60),
            &status,
        );

        assert!(msg.contains("Update Interval: 30 minutes"));
        assert!(msg.contains("Alert Threshold: 70.0%"));
        assert!(msg.contains("🔊 <b>Voice Messages:</b> ❌"));
        assert!(msg.contains("⏳ <b>Cooldown:</b> 5 minutes (1 minutes when critical)"));
    }
}
