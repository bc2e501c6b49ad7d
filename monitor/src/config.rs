use std::str::FromStr;
use std::time::Duration;

use alerts::channel::TelegramConfig;
use alerts::channel::telegram::DEFAULT_API_URL as TELEGRAM_API_URL;
use alerts::channel::tts::DEFAULT_TTS_URL;
use alerts::{AlertThresholds, CooldownPolicy};
use common::logger::LogFormat;
use market::pulse::MIN_TREND_SAMPLES;
use market::source::hyperliquid::client::DEFAULT_API_URL as HYPERLIQUID_API_URL;

use crate::error::ConfigError;
use crate::scheduler::SchedulerConfig;

#[derive(Clone, Debug)]
pub struct AppConfig {
    // =========================
    // Market
    // =========================
    /// Asset identifier passed to the price source (e.g. `SOL`).
    pub asset: String,

    /// Base url of the Hyperliquid info API.
    pub hyperliquid_api_url: String,

    /// Number of observations kept for analysis. Oldest are evicted first.
    pub history_capacity: usize,

    // =========================
    // Decision
    // =========================
    /// Target price, std-band multiplier and probability / urgency thresholds.
    pub thresholds: AlertThresholds,

    /// Minimum spacing between alerts, per urgency class.
    pub cooldown: CooldownPolicy,

    // =========================
    // Scheduling
    // =========================
    /// Time between two regular cycles.
    pub update_interval: Duration,

    /// Wait after a cycle failed unexpectedly, before the next attempt.
    pub error_backoff: Duration,

    // =========================
    // Notifications
    // =========================
    pub enable_text: bool,
    pub enable_voice: bool,

    /// Send the status message through the channel after every cycle.
    pub send_status_updates: bool,

    /// Bot credentials. Only commands that talk to Telegram require them.
    pub telegram: Option<TelegramConfig>,

    pub tts_url: String,
    pub tts_language: String,

    pub log_format: LogFormat,
}

impl AppConfig {
    /// Reads a `.env` file from the working directory (when present) into the
    /// process environment, then builds the config from it. Variables already set
    /// win over the file.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let thresholds = AlertThresholds {
            target_price: parse_or(&get, "TARGET_PRICE", 41.0)?,
            std_multiplier: parse_or(&get, "STD_DEVIATIONS", 2.0)?,
            probability_threshold: parse_or(&get, "ALERT_THRESHOLD", 0.7)?,
            critical_price: parse_or(&get, "CRITICAL_PRICE_THRESHOLD", 41.5)?,
            strong_downtrend_probability: parse_or(&get, "STRONG_DOWNTREND_THRESHOLD", 0.85)?,
            urgency_margin: parse_or(&get, "URGENCY_MARGIN", 0.5)?,
        };

        let cooldown = CooldownPolicy {
            standard: parse_minutes(&get, "ALERT_COOLDOWN_MINUTES", 5)?,
            urgent: parse_minutes(&get, "URGENT_ALERT_COOLDOWN_MINUTES", 1)?,
        };

        let telegram = match (get("TELEGRAM_BOT_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig {
                api_url: get("TELEGRAM_API_URL").unwrap_or_else(|| TELEGRAM_API_URL.to_string()),
                bot_token,
                chat_id,
            }),
            _ => None,
        };

        let cfg = Self {
            asset: get("ASSET").unwrap_or_else(|| "SOL".to_string()),
            hyperliquid_api_url: get("HYPERLIQUID_API_URL")
                .unwrap_or_else(|| HYPERLIQUID_API_URL.to_string()),
            history_capacity: parse_or(&get, "PRICE_HISTORY_WINDOW", 100)?,
            thresholds,
            cooldown,
            update_interval: parse_minutes(&get, "UPDATE_INTERVAL_MINUTES", 30)?,
            error_backoff: Duration::from_secs(parse_or(&get, "ERROR_BACKOFF_SECONDS", 60)?),
            enable_text: parse_flag(&get, "ENABLE_TEXT_ALERTS", true)?,
            enable_voice: parse_flag(&get, "ENABLE_VOICE_MESSAGES", true)?,
            send_status_updates: parse_flag(&get, "SEND_STATUS_UPDATES", true)?,
            telegram,
            tts_url: get("TTS_URL").unwrap_or_else(|| DEFAULT_TTS_URL.to_string()),
            tts_language: get("TTS_LANGUAGE").unwrap_or_else(|| "en".to_string()),
            log_format: LogFormat::parse(&get("LOG_FORMAT").unwrap_or_default()),
        };

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;

        if !(t.target_price.is_finite() && t.target_price > 0.0) {
            return Err(invalid("TARGET_PRICE", t.target_price, "must be a positive number"));
        }
        if !(t.std_multiplier.is_finite() && t.std_multiplier >= 0.0) {
            return Err(invalid("STD_DEVIATIONS", t.std_multiplier, "must be zero or more"));
        }
        for (key, p) in [
            ("ALERT_THRESHOLD", t.probability_threshold),
            ("STRONG_DOWNTREND_THRESHOLD", t.strong_downtrend_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(key, p, "must be within [0, 1]"));
            }
        }
        if !t.critical_price.is_finite() {
            return Err(invalid("CRITICAL_PRICE_THRESHOLD", t.critical_price, "must be finite"));
        }
        if !(t.urgency_margin.is_finite() && t.urgency_margin >= 0.0) {
            return Err(invalid("URGENCY_MARGIN", t.urgency_margin, "must be zero or more"));
        }
        if self.history_capacity < MIN_TREND_SAMPLES {
            return Err(invalid(
                "PRICE_HISTORY_WINDOW",
                self.history_capacity,
                "must hold at least 10 samples",
            ));
        }
        if self.update_interval.is_zero() {
            return Err(invalid("UPDATE_INTERVAL_MINUTES", 0, "must be positive"));
        }
        if self.error_backoff.is_zero() {
            return Err(invalid("ERROR_BACKOFF_SECONDS", 0, "must be positive"));
        }

        Ok(())
    }

    /// Credentials for commands that deliver messages.
    pub fn telegram(&self) -> Result<&TelegramConfig, ConfigError> {
        match &self.telegram {
            Some(t) => Ok(t),
            None => Err(ConfigError::Missing("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID")),
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            asset: self.asset.clone(),
            update_interval: self.update_interval,
            error_backoff: self.error_backoff,
            send_status_updates: self.send_status_updates,
            ..SchedulerConfig::default()
        }
    }
}

fn parse_minutes<G>(get: &G, key: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let n: u64 = parse_or(get, key, default)?;
    n.checked_mul(60)
        .map(Duration::from_secs)
        .ok_or_else(|| invalid(key, n, "too large"))
}

fn invalid(key: &'static str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw,
            reason: e.to_string(),
        }),
    }
}

fn parse_flag<G>(get: &G, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let Some(raw) = get(key) else {
        return Ok(default);
    };

    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, raw, "expected true or false")),
    }
}
