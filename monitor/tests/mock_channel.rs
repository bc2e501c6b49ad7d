use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use alerts::{NotificationChannel, NotifyError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sent {
    Text(String),
    Voice(String),
}

/// Records everything sent through it. Each kind can be switched to fail.
#[derive(Default, Clone)]
pub struct MockChannel {
    pub sent: Arc<Mutex<Vec<Sent>>>,
    pub fail_text: Arc<AtomicBool>,
    pub fail_voice: Arc<AtomicBool>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_voice(self) -> Self {
        self.fail_voice.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_text(self) -> Self {
        self.fail_text.store(true, Ordering::SeqCst);
        self
    }

    pub async fn sent(&self) -> Vec<Sent> {
        self.sent.lock().await.clone()
    }

    /// Sent items other than status updates.
    pub async fn alerts(&self) -> Vec<Sent> {
        self.sent()
            .await
            .into_iter()
            .filter(|s| !matches!(s, Sent::Text(t) if t.contains("Price Status")))
            .collect()
    }
}

#[async_trait]
impl NotificationChannel for MockChannel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send_text(&self, message: &str) -> Result<(), NotifyError> {
        if self.fail_text.load(Ordering::SeqCst) {
            return Err(NotifyError::Api("text rejected".into()));
        }
        self.sent.lock().await.push(Sent::Text(message.to_string()));
        Ok(())
    }

    async fn send_voice(&self, message: &str) -> Result<(), NotifyError> {
        if self.fail_voice.load(Ordering::SeqCst) {
            return Err(NotifyError::Speech("tts unavailable".into()));
        }
        self.sent.lock().await.push(Sent::Voice(message.to_string()));
        Ok(())
    }
}
