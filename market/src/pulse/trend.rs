//! Trend Pulse
//!
//! Labels recent momentum by comparing the latest price with two simple moving
//! averages over the tail of the history.
//!
//! ## Definition
//!
//! ```text
//! sma5  = mean(last 5 prices)
//! sma10 = mean(last 10 prices)
//! ```
//!
//! Rules are checked in order and the first match wins:
//!
//! | condition                              | label              |
//! |----------------------------------------|--------------------|
//! | `current > sma5` and `sma5 > sma10`    | `strong_uptrend`   |
//! | `current > sma5`                       | `uptrend`          |
//! | `current < sma5` and `sma5 < sma10`    | `strong_downtrend` |
//! | `current < sma5`                       | `downtrend`        |
//! | otherwise                              | `sideways`         |
//!
//! ## Warm-up guard
//! Fewer than ten samples always yield `insufficient_data`.

use std::fmt;

use serde::Serialize;

use super::{MIN_TREND_SAMPLES, mean};

const SHORT_WINDOW: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    StrongUptrend,
    Uptrend,
    Sideways,
    Downtrend,
    StrongDowntrend,
    InsufficientData,
}

impl TrendLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrongUptrend => "strong_uptrend",
            Self::Uptrend => "uptrend",
            Self::Sideways => "sideways",
            Self::Downtrend => "downtrend",
            Self::StrongDowntrend => "strong_downtrend",
            Self::InsufficientData => "insufficient_data",
        }
    }

    /// Human form, e.g. `Strong Downtrend`.
    pub fn title(&self) -> &'static str {
        match self {
            Self::StrongUptrend => "Strong Uptrend",
            Self::Uptrend => "Uptrend",
            Self::Sideways => "Sideways",
            Self::Downtrend => "Downtrend",
            Self::StrongDowntrend => "Strong Downtrend",
            Self::InsufficientData => "Insufficient Data",
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Self::StrongUptrend => "📈",
            Self::Uptrend => "↗️",
            Self::StrongDowntrend => "📉",
            Self::Downtrend => "↘️",
            Self::Sideways | Self::InsufficientData => "➡️",
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify_trend(prices: &[f64]) -> TrendLabel {
    if prices.len() < MIN_TREND_SAMPLES {
        return TrendLabel::InsufficientData;
    }

    let recent = &prices[prices.len() - MIN_TREND_SAMPLES..];
    let sma5 = mean(&recent[recent.len() - SHORT_WINDOW..]);
    let sma10 = mean(recent);
    let current = recent[recent.len() - 1];

    // Strong variants first: each subsumes the weak variant below it.
    if current > sma5 && sma5 > sma10 {
        TrendLabel::StrongUptrend
    } else if current > sma5 {
        TrendLabel::Uptrend
    } else if current < sma5 && sma5 < sma10 {
        TrendLabel::StrongDowntrend
    } else if current < sma5 {
        TrendLabel::Downtrend
    } else {
        TrendLabel::Sideways
    }
}
