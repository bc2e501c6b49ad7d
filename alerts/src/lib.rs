pub mod analysis;
pub mod channel;
pub mod cooldown;
pub mod decision;
pub mod dispatch;
pub mod messages;

pub use analysis::{AnalysisSnapshot, analyze};
pub use channel::{NotificationChannel, NotifyError};
pub use cooldown::{CooldownError, CooldownGate, CooldownPolicy, GateState};
pub use decision::{AlertDecision, AlertReason, AlertThresholds, decide};
pub use dispatch::{AlertDispatcher, AlertStatus, ChannelOutcome, DispatchReport};
