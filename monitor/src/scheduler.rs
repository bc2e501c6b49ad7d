//! Monitoring scheduler.
//!
//! Drives the poll -> analyze -> decide -> notify cycle for one asset on a fixed
//! cadence.
//!
//! Responsibilities:
//! - Fetch one price per cycle and feed it to the engine.
//! - Consult the cooldown gate once, dispatch, and record the gate once.
//! - Publish every evaluated snapshot for status readers.
//!
//! Non-responsibilities:
//! - Retrying deliveries (the notification channel owns that).
//! - Retrying price fetches. A failed fetch skips the cycle.
//!
//! Liveness:
//! - A failing or panicking cycle is logged and followed by a short backoff; the
//!   loop itself only ends on a stop request.
//! - Every wait races the stop signal, so stopping never waits out an interval.

use std::sync::Arc;
use std::time::Duration;

use alerts::{AlertDispatcher, AlertStatus, AnalysisSnapshot, DispatchReport, GateState};
use anyhow::Context;
use chrono::{DateTime, Utc};
use common::logger::{TraceId, child_span, cycle_span, warn_if_slow};
use market::PriceSource;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{Instrument, Span, error, info, warn};

use crate::engine::PriceMonitor;
use crate::error::MonitorError;

/// Source of "now" in unix milliseconds.
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    pub asset: String,
    pub update_interval: Duration,
    pub error_backoff: Duration,
    pub send_status_updates: bool,
    /// Budget for one external call before a performance warning is logged.
    pub slow_call: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            asset: "SOL".to_string(),
            update_interval: Duration::from_secs(30 * 60),
            error_backoff: Duration::from_secs(60),
            send_status_updates: true,
            slow_call: Duration::from_secs(5),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AlertOutcome {
    NotNeeded,
    /// Both channels are disabled.
    NoChannels,
    CoolingDown { remaining: Duration },
    Dispatched(DispatchReport),
}

#[derive(Clone, Debug, PartialEq)]
pub enum CycleOutcome {
    /// Nothing was recorded this cycle.
    Skipped { reason: String },
    Evaluated {
        snapshot: AnalysisSnapshot,
        alert: AlertOutcome,
    },
}

pub struct MonitorService {
    cfg: SchedulerConfig,
    monitor: Arc<PriceMonitor>,
    source: Arc<dyn PriceSource>,
    dispatcher: AlertDispatcher,
    status_tx: watch::Sender<Option<AnalysisSnapshot>>,
    clock: Clock,
}

impl MonitorService {
    pub fn new(
        cfg: SchedulerConfig,
        monitor: Arc<PriceMonitor>,
        source: Arc<dyn PriceSource>,
        dispatcher: AlertDispatcher,
    ) -> Self {
        let (status_tx, _) = watch::channel(None);

        Self {
            cfg,
            monitor,
            source,
            dispatcher,
            status_tx,
            clock: Arc::new(common::time::now_ms),
        }
    }

    pub fn with_clock(mut self, clock: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn monitor(&self) -> &Arc<PriceMonitor> {
        &self.monitor
    }

    pub fn dispatcher(&self) -> &AlertDispatcher {
        &self.dispatcher
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.cfg
    }

    /// Latest evaluated snapshot; `None` until the first successful cycle.
    pub fn subscribe(&self) -> watch::Receiver<Option<AnalysisSnapshot>> {
        self.status_tx.subscribe()
    }

    pub fn now_ms(&self) -> u64 {
        (self.clock)()
    }

    /// Live cooldown and channel state at the clock's current time.
    pub fn alert_status(&self) -> AlertStatus {
        self.monitor.alert_status(&self.dispatcher, self.now_ms())
    }

    /// Runs one cycle at the clock's current time.
    ///
    /// Fetch failures and rejected samples are reported as [`CycleOutcome::Skipped`];
    /// only unexpected failures come back as errors.
    pub async fn run_cycle(&self) -> anyhow::Result<CycleOutcome> {
        let now_ms = self.now_ms();
        let asset = self.cfg.asset.as_str();

        let fetched = warn_if_slow(
            "price_fetch",
            self.cfg.slow_call,
            self.source.fetch_price(asset),
        )
        .await;

        let price = match fetched {
            Ok(p) => p,
            Err(e) => {
                warn!(asset, error = %e, "price fetch failed, skipping cycle");
                return Ok(CycleOutcome::Skipped {
                    reason: e.to_string(),
                });
            }
        };

        Span::current().record("price", price);

        let snapshot = match self.monitor.ingest(price) {
            Ok(s) => s,
            Err(MonitorError::History(e)) => {
                warn!(asset, price, error = %e, "rejected price sample, skipping cycle");
                return Ok(CycleOutcome::Skipped {
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            asset,
            price,
            mean = snapshot.mean,
            std = snapshot.std,
            trend = %snapshot.trend,
            probability = snapshot.breach_probability,
            should_alert = snapshot.should_alert,
            is_urgent = snapshot.is_urgent,
            history_len = snapshot.history_length,
            "price analyzed"
        );

        let at = timestamp(now_ms);
        let alert = self.maybe_alert(&snapshot, now_ms, at).await;

        // Status goes out even when the alert bookkeeping failed.
        self.status_tx.send_replace(Some(snapshot.clone()));

        if self.cfg.send_status_updates {
            if let Err(e) = self.dispatcher.send_status(asset, &snapshot, at).await {
                warn!(asset, error = %e, "status update delivery failed");
            }
        }

        Ok(CycleOutcome::Evaluated {
            snapshot,
            alert: alert?,
        })
    }

    async fn maybe_alert(
        &self,
        snapshot: &AnalysisSnapshot,
        now_ms: u64,
        at: DateTime<Utc>,
    ) -> anyhow::Result<AlertOutcome> {
        if !snapshot.should_alert {
            return Ok(AlertOutcome::NotNeeded);
        }

        if !self.dispatcher.is_enabled() {
            warn!("alert condition met but every channel is disabled");
            return Ok(AlertOutcome::NoChannels);
        }

        if let GateState::Cooling { remaining } = self.monitor.gate_state(snapshot.is_urgent, now_ms)
        {
            info!(
                is_urgent = snapshot.is_urgent,
                remaining_s = remaining.as_secs(),
                "alert suppressed by cooldown"
            );
            return Ok(AlertOutcome::CoolingDown { remaining });
        }

        let report = warn_if_slow(
            "alert_dispatch",
            self.cfg.slow_call,
            self.dispatcher
                .dispatch(snapshot, at)
                .instrument(child_span("dispatch")),
        )
        .await;

        if report.any_delivered() {
            self.monitor
                .record_dispatch(now_ms)
                .context("recording alert dispatch")?;
        }

        Ok(AlertOutcome::Dispatched(report))
    }

    /// Cycles until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!(
            asset = %self.cfg.asset,
            every_s = self.cfg.update_interval.as_secs(),
            backoff_s = self.cfg.error_backoff.as_secs(),
            "monitor started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let span = cycle_span(&self.cfg.asset, &TraceId::new());
            let svc = Arc::clone(&self);
            let cycle = tokio::spawn(async move { svc.run_cycle().await }.instrument(span));

            let wait = match cycle.await {
                Ok(Ok(_)) => self.cfg.update_interval,
                Ok(Err(e)) => {
                    error!(error = ?e, "monitoring cycle failed, backing off");
                    self.cfg.error_backoff
                }
                Err(e) => {
                    error!(error = %e, "monitoring cycle aborted, backing off");
                    self.cfg.error_backoff
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!(asset = %self.cfg.asset, "monitor stopped");
    }

    pub fn spawn(self: Arc<Self>) -> MonitorHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(stop_rx));

        MonitorHandle { stop_tx, task }
    }
}

/// Owner side of a running [`MonitorService`].
pub struct MonitorHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Requests a stop. The current cycle finishes; pending waits end immediately.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.stop();
        self.task.await.context("monitor task panicked")
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

pub(crate) fn timestamp(now_ms: u64) -> DateTime<Utc> {
    i64::try_from(now_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or_else(Utc::now)
}
