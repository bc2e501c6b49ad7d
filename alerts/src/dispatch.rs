//! Alert dispatcher.
//!
//! Renders the alert messages for a snapshot and pushes them through the
//! notification channel: voice first, then text. It never looks at the cooldown
//! gate itself; the caller checks the gate once before a round and records it
//! once after, based on the returned [`DispatchReport`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::AnalysisSnapshot;
use crate::channel::{NotificationChannel, NotifyError};
use crate::cooldown::CooldownGate;
use crate::messages;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelOutcome {
    Delivered,
    Disabled,
    Failed(String),
}

impl ChannelOutcome {
    fn from_result(result: Result<(), NotifyError>) -> Self {
        match result {
            Ok(()) => Self::Delivered,
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchReport {
    pub voice: ChannelOutcome,
    pub text: ChannelOutcome,
}

impl DispatchReport {
    /// True when at least one channel accepted the alert. Only then does the
    /// cooldown advance.
    pub fn any_delivered(&self) -> bool {
        self.voice == ChannelOutcome::Delivered || self.text == ChannelOutcome::Delivered
    }
}

/// Alert configuration as seen by a status display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AlertStatus {
    pub text_enabled: bool,
    pub voice_enabled: bool,
    pub last_alert_ms: Option<u64>,
    /// Whether a regular (non-urgent) alert could go out right now.
    pub can_dispatch: bool,
    pub standard_cooldown: Duration,
    pub urgent_cooldown: Duration,
}

impl AlertStatus {
    pub fn from_gate(
        gate: &CooldownGate,
        text_enabled: bool,
        voice_enabled: bool,
        now_ms: u64,
    ) -> Self {
        let policy = gate.policy();

        Self {
            text_enabled,
            voice_enabled,
            last_alert_ms: gate.last_alert_ms(),
            can_dispatch: (text_enabled || voice_enabled) && gate.can_dispatch(false, now_ms),
            standard_cooldown: policy.standard,
            urgent_cooldown: policy.urgent,
        }
    }
}

#[derive(Clone)]
pub struct AlertDispatcher {
    channel: Arc<dyn NotificationChannel>,
    enable_text: bool,
    enable_voice: bool,
}

impl AlertDispatcher {
    pub fn new(channel: Arc<dyn NotificationChannel>, enable_text: bool, enable_voice: bool) -> Self {
        Self {
            channel,
            enable_text,
            enable_voice,
        }
    }

    /// With both channels off no alert can ever go out.
    pub fn is_enabled(&self) -> bool {
        self.enable_text || self.enable_voice
    }

    pub fn channel_name(&self) -> &str {
        self.channel.name()
    }

    pub fn alert_status(&self, gate: &CooldownGate, now_ms: u64) -> AlertStatus {
        AlertStatus::from_gate(gate, self.enable_text, self.enable_voice, now_ms)
    }

    pub async fn dispatch(&self, snapshot: &AnalysisSnapshot, at: DateTime<Utc>) -> DispatchReport {
        let level = if snapshot.is_urgent { "critical" } else { "regular" };

        let voice = if self.enable_voice {
            let script = messages::voice_script(snapshot);
            ChannelOutcome::from_result(self.channel.send_voice(&script).await)
        } else {
            ChannelOutcome::Disabled
        };

        let text = if self.enable_text {
            let body = messages::text_alert(snapshot, at);
            ChannelOutcome::from_result(self.channel.send_text(&body).await)
        } else {
            ChannelOutcome::Disabled
        };

        for (kind, outcome) in [("voice", &voice), ("text", &text)] {
            match outcome {
                ChannelOutcome::Delivered => {
                    info!(channel = %self.channel.name(), kind, level, "alert delivered")
                }
                ChannelOutcome::Failed(error) => {
                    warn!(channel = %self.channel.name(), kind, level, %error, "alert delivery failed")
                }
                ChannelOutcome::Disabled => {}
            }
        }

        DispatchReport { voice, text }
    }

    /// Status updates bypass the cooldown and go out as plain text.
    pub async fn send_status(
        &self,
        asset: &str,
        snapshot: &AnalysisSnapshot,
        at: DateTime<Utc>,
    ) -> Result<(), NotifyError> {
        let body = messages::status_update(asset, snapshot, at);
        self.channel.send_text(&body).await
    }

    pub async fn send_test_voice(&self) -> Result<(), NotifyError> {
        if !self.enable_voice {
            return Err(NotifyError::Disabled("voice"));
        }
        self.channel.send_voice(messages::TEST_VOICE_PHRASE).await
    }
}
