use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{Span, field};

use super::TraceId;

/// Root span for one scheduled cycle. `price` is recorded once it is known.
pub fn cycle_span(asset: &str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "cycle",
        trace_id = %trace_id,
        asset = %asset,
        price = field::Empty
    )
}

/// Child span (inherits trace_id from the enclosing cycle span)
pub fn child_span(name: &'static str) -> Span {
    tracing::info_span!("child", name = %name)
}

/// Awaits `fut` and emits a `performance` warning when it took longer than `max`.
pub async fn warn_if_slow<F, T>(label: &'static str, max: Duration, fut: F) -> T
where
    F: Future<Output = T>,
{
    let start = Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label = label,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}
