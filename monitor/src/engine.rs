//! Price monitor engine.
//!
//! Owns the bounded price history and the cooldown gate behind one lock, so an
//! observation, its analysis and the cooldown bookkeeping are never seen
//! half-applied. Analysis runs on a copy taken under the lock; nothing awaits
//! while it is held.

use alerts::{
    AlertDispatcher, AlertStatus, AlertThresholds, AnalysisSnapshot, CooldownGate,
    CooldownPolicy, GateState, analyze,
};
use market::PriceHistory;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::MonitorError;

struct MonitorState {
    history: PriceHistory,
    gate: CooldownGate,
}

pub struct PriceMonitor {
    thresholds: AlertThresholds,
    state: Mutex<MonitorState>,
}

impl PriceMonitor {
    pub fn new(
        thresholds: AlertThresholds,
        history_capacity: usize,
        cooldown: CooldownPolicy,
    ) -> Result<Self, MonitorError> {
        Ok(Self {
            thresholds,
            state: Mutex::new(MonitorState {
                history: PriceHistory::new(history_capacity)?,
                gate: CooldownGate::new(cooldown),
            }),
        })
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    /// Appends one observation. Returns the history length afterwards.
    pub fn add_price(&self, price: f64) -> Result<usize, MonitorError> {
        let mut st = self.state.lock();
        st.history.push(price)?;
        debug!(price, len = st.history.len(), "price recorded");
        Ok(st.history.len())
    }

    pub fn history_len(&self) -> usize {
        self.state.lock().history.len()
    }

    /// Prices currently held, oldest first.
    pub fn history(&self) -> Vec<f64> {
        self.state.lock().history.snapshot()
    }

    pub fn analysis(&self) -> AnalysisSnapshot {
        let prices = self.history();
        analyze(&prices, &self.thresholds)
    }

    /// Records `price` and analyzes the resulting history as one step.
    pub fn ingest(&self, price: f64) -> Result<AnalysisSnapshot, MonitorError> {
        let prices = {
            let mut st = self.state.lock();
            st.history.push(price)?;
            st.history.snapshot()
        };
        Ok(analyze(&prices, &self.thresholds))
    }

    pub fn gate_state(&self, is_urgent: bool, now_ms: u64) -> GateState {
        self.state.lock().gate.state(is_urgent, now_ms)
    }

    pub fn can_dispatch(&self, is_urgent: bool, now_ms: u64) -> bool {
        self.state.lock().gate.can_dispatch(is_urgent, now_ms)
    }

    /// Starts a new cooldown window at `now_ms`.
    pub fn record_dispatch(&self, now_ms: u64) -> Result<(), MonitorError> {
        self.state.lock().gate.record_dispatch(now_ms)?;
        Ok(())
    }

    pub fn last_alert_ms(&self) -> Option<u64> {
        self.state.lock().gate.last_alert_ms()
    }

    pub fn alert_status(&self, dispatcher: &AlertDispatcher, now_ms: u64) -> AlertStatus {
        let gate = self.state.lock().gate.clone();
        dispatcher.alert_status(&gate, now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerts::AlertReason;
    use market::HistoryError;
    use std::time::Duration;

    fn monitor(capacity: usize) -> PriceMonitor {
        PriceMonitor::new(AlertThresholds::default(), capacity, CooldownPolicy::default()).unwrap()
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = PriceMonitor::new(AlertThresholds::default(), 0, CooldownPolicy::default())
            .err()
            .unwrap();
        assert_eq!(err, MonitorError::History(HistoryError::ZeroCapacity));
    }

    #[test]
    fn history_is_bounded() {
        let m = monitor(10);
        for i in 0..15 {
            m.add_price(50.0 + i as f64).unwrap();
        }

        assert_eq!(m.history_len(), 10);
        assert_eq!(m.history().first(), Some(&55.0));
        assert_eq!(m.history().last(), Some(&64.0));
    }

    #[test]
    fn invalid_prices_leave_history_untouched() {
        let m = monitor(10);
        m.add_price(42.0).unwrap();

        for bad in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                m.ingest(bad),
                Err(MonitorError::History(HistoryError::InvalidSample(_)))
            ));
        }
        assert_eq!(m.history(), vec![42.0]);
    }

    #[test]
    fn ingest_analyzes_the_new_history() {
        let m = monitor(100);
        for _ in 0..5 {
            m.add_price(42.0).unwrap();
        }

        let s = m.ingest(40.0).unwrap();

        assert_eq!(s.history_length, 6);
        assert!(s.should_alert && s.is_urgent);
        assert_eq!(s.reason, Some(AlertReason::CurrentPriceBelowTarget));
        assert_eq!(m.analysis(), s);
    }

    #[test]
    fn cooldown_follows_recorded_dispatch() {
        let m = monitor(10);
        let t0 = 1_000_000;

        assert!(m.can_dispatch(false, t0));
        m.record_dispatch(t0).unwrap();

        assert_eq!(m.last_alert_ms(), Some(t0));
        assert!(!m.can_dispatch(false, t0 + 60_000));
        assert!(m.can_dispatch(true, t0 + 60_000));
        assert_eq!(
            m.gate_state(false, t0 + 60_000),
            GateState::Cooling {
                remaining: Duration::from_secs(240)
            }
        );
        assert!(m.record_dispatch(t0 - 1).is_err());
    }
}
