//! Cooldown gate.
//!
//! Rate-limits alert dispatch independently of how often decisions are made.
//!
//! ```text
//!            dispatch delivered (record_dispatch)
//!   READY ─────────────────────────────────────────▶ COOLING
//!     ▲                                                 │
//!     └──────── now - last_alert >= window(urgent) ─────┘
//! ```
//!
//! The window is picked per call from the urgency flag; nothing about urgency is
//! stored. One timestamp is shared by every channel.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CooldownError {
    #[error("dispatch at {now_ms}ms precedes last recorded alert at {last_ms}ms")]
    NonMonotonic { last_ms: u64, now_ms: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CooldownPolicy {
    pub standard: Duration,
    pub urgent: Duration,
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self {
            standard: Duration::from_secs(5 * 60),
            urgent: Duration::from_secs(60),
        }
    }
}

impl CooldownPolicy {
    pub fn window(&self, is_urgent: bool) -> Duration {
        if is_urgent { self.urgent } else { self.standard }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    Ready,
    Cooling { remaining: Duration },
}

#[derive(Clone, Debug, Default)]
pub struct CooldownGate {
    policy: CooldownPolicy,
    last_alert_ms: Option<u64>,
}

impl CooldownGate {
    pub fn new(policy: CooldownPolicy) -> Self {
        Self {
            policy,
            last_alert_ms: None,
        }
    }

    pub fn policy(&self) -> CooldownPolicy {
        self.policy
    }

    pub fn last_alert_ms(&self) -> Option<u64> {
        self.last_alert_ms
    }

    pub fn state(&self, is_urgent: bool, now_ms: u64) -> GateState {
        let Some(last_ms) = self.last_alert_ms else {
            return GateState::Ready;
        };

        let window_ms = self.policy.window(is_urgent).as_millis() as u64;
        let elapsed = now_ms.saturating_sub(last_ms);

        if elapsed >= window_ms {
            GateState::Ready
        } else {
            GateState::Cooling {
                remaining: Duration::from_millis(window_ms - elapsed),
            }
        }
    }

    pub fn can_dispatch(&self, is_urgent: bool, now_ms: u64) -> bool {
        self.state(is_urgent, now_ms) == GateState::Ready
    }

    /// READY -> COOLING. Call only after a channel reported successful delivery.
    pub fn record_dispatch(&mut self, now_ms: u64) -> Result<(), CooldownError> {
        if let Some(last_ms) = self.last_alert_ms {
            if now_ms < last_ms {
                return Err(CooldownError::NonMonotonic { last_ms, now_ms });
            }
        }

        self.last_alert_ms = Some(now_ms);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: u64 = 60_000;

    fn gate() -> CooldownGate {
        CooldownGate::new(CooldownPolicy::default())
    }

    #[test]
    fn starts_ready() {
        let g = gate();

        assert!(g.can_dispatch(false, 0));
        assert!(g.can_dispatch(true, 0));
        assert_eq!(g.last_alert_ms(), None);
    }

    #[test]
    fn standard_window_after_regular_dispatch() {
        let mut g = gate();
        let t = 1_000_000;
        g.record_dispatch(t).unwrap();

        assert!(!g.can_dispatch(false, t));
        assert!(!g.can_dispatch(false, t + 5 * MIN - 1));
        assert!(g.can_dispatch(false, t + 5 * MIN));
        assert!(g.can_dispatch(false, t + 60 * MIN));
    }

    #[test]
    fn urgent_window_is_shorter() {
        let mut g = gate();
        let t = 1_000_000;
        g.record_dispatch(t).unwrap();

        assert!(!g.can_dispatch(true, t + MIN - 1));
        assert!(g.can_dispatch(true, t + MIN));
        // Same timestamp, regular urgency still cooling.
        assert!(!g.can_dispatch(false, t + MIN));
    }

    #[test]
    fn reports_remaining_time() {
        let mut g = gate();
        g.record_dispatch(0).unwrap();

        assert_eq!(
            g.state(false, 2 * MIN),
            GateState::Cooling {
                remaining: Duration::from_millis(3 * MIN)
            }
        );
    }

    #[test]
    fn clock_behind_last_alert_keeps_cooling() {
        let mut g = gate();
        g.record_dispatch(10 * MIN).unwrap();

        assert!(!g.can_dispatch(true, 0));
    }

    #[test]
    fn rejects_non_monotonic_record() {
        let mut g = gate();
        g.record_dispatch(10 * MIN).unwrap();

        let err = g.record_dispatch(MIN).unwrap_err();
        assert_eq!(
            err,
            CooldownError::NonMonotonic {
                last_ms: 10 * MIN,
                now_ms: MIN
            }
        );
        assert_eq!(g.last_alert_ms(), Some(10 * MIN));
    }

    #[test]
    fn repeated_record_at_same_instant_is_fine() {
        let mut g = gate();
        g.record_dispatch(MIN).unwrap();
        g.record_dispatch(MIN).unwrap();

        assert_eq!(g.last_alert_ms(), Some(MIN));
    }
}
