use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the unix epoch.
///
/// Everything downstream takes time as an explicit `now_ms` argument; this is the
/// only place the wall clock is read.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
