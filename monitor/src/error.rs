use alerts::CooldownError;
use market::HistoryError;
use thiserror::Error;

/// Startup-time configuration problems. Always fatal.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("missing required variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Error, Debug, PartialEq)]
pub enum MonitorError {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Cooldown(#[from] CooldownError),
}
