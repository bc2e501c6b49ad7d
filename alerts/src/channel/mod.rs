pub mod telegram;
pub mod tts;

use async_trait::async_trait;
use thiserror::Error;

pub use telegram::{TelegramChannel, TelegramConfig};
pub use tts::GoogleTts;

/// Errors from delivering a notification.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api rejected message: {0}")]
    Api(String),

    #[error("speech synthesis failed: {0}")]
    Speech(String),

    #[error("{0} channel is disabled")]
    Disabled(&'static str),
}

/// A fixed-recipient channel that can deliver text and spoken messages.
///
/// `Ok(())` means the remote side accepted the message. Retries, if any, are the
/// implementation's concern.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &str;

    async fn send_text(&self, message: &str) -> Result<(), NotifyError>;

    /// Delivers `message` as synthesized speech.
    async fn send_voice(&self, message: &str) -> Result<(), NotifyError>;
}
