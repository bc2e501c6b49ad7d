use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, multipart};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{GoogleTts, NotificationChannel, NotifyError};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

const VOICE_CAPTION: &str = "🚨 Price Alert Voice Message";

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub api_url: String,
    pub bot_token: String,
    pub chat_id: String,
}

/// Telegram Bot API channel bound to a single chat.
pub struct TelegramChannel {
    http: Client,
    cfg: TelegramConfig,
    tts: GoogleTts,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Envelope every Bot API method replies with.
#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    description: Option<String>,
}

impl ApiReply {
    fn into_result(self) -> Result<(), NotifyError> {
        if self.ok {
            Ok(())
        } else {
            Err(NotifyError::Api(
                self.description.unwrap_or_else(|| "unknown error".into()),
            ))
        }
    }
}

impl TelegramChannel {
    pub fn new(cfg: TelegramConfig, tts: GoogleTts) -> Result<Self, NotifyError> {
        let http = Client::builder().timeout(Duration::from_secs(15)).build()?;

        Ok(Self { http, cfg, tts })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.cfg.api_url.trim_end_matches('/'),
            self.cfg.bot_token,
            method
        )
    }

    /// Telegram answers errors with a JSON body, so the status code is not checked
    /// before decoding. Urls are stripped from transport errors: they carry the token.
    async fn read_reply(resp: reqwest::Response) -> Result<(), NotifyError> {
        let reply: ApiReply = resp.json().await.map_err(|e| e.without_url())?;
        reply.into_result()
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    #[instrument(skip(self, message), fields(chat_id = %self.cfg.chat_id), level = "debug")]
    async fn send_text(&self, message: &str) -> Result<(), NotifyError> {
        let body = SendMessage {
            chat_id: &self.cfg.chat_id,
            text: message,
            parse_mode: "HTML",
        };

        let resp = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| e.without_url())?;

        Self::read_reply(resp).await?;
        debug!("telegram text delivered");
        Ok(())
    }

    #[instrument(skip(self, message), fields(chat_id = %self.cfg.chat_id), level = "debug")]
    async fn send_voice(&self, message: &str) -> Result<(), NotifyError> {
        let audio = self.tts.synthesize(message).await?;
        let audio_len = audio.len();

        let voice = multipart::Part::bytes(audio)
            .file_name("alert.mp3")
            .mime_str("audio/mpeg")?;

        let form = multipart::Form::new()
            .text("chat_id", self.cfg.chat_id.clone())
            .text("caption", VOICE_CAPTION)
            .part("voice", voice);

        let resp = self
            .http
            .post(self.method_url("sendVoice"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| e.without_url())?;

        Self::read_reply(resp).await?;
        debug!(bytes = audio_len, "telegram voice delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::tts::DEFAULT_TTS_URL;

    fn channel(api_url: &str) -> TelegramChannel {
        TelegramChannel::new(
            TelegramConfig {
                api_url: api_url.into(),
                bot_token: "123:secret".into(),
                chat_id: "42".into(),
            },
            GoogleTts::new(DEFAULT_TTS_URL, "en").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn builds_method_urls() {
        let c = channel("https://api.telegram.org/");
        assert_eq!(
            c.method_url("sendMessage"),
            "https://api.telegram.org/bot123:secret/sendMessage"
        );
    }

    #[test]
    fn rejected_reply_carries_description() {
        let reply: ApiReply = serde_json::from_str(
            r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#,
        )
        .unwrap();

        match reply.into_result() {
            Err(NotifyError::Api(msg)) => assert_eq!(msg, "Bad Request: chat not found"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn accepted_reply_is_ok() {
        let reply: ApiReply =
            serde_json::from_str(r#"{"ok":true,"result":{"message_id":7}}"#).unwrap();
        assert!(reply.into_result().is_ok());
    }

    #[test]
    fn message_body_uses_html() {
        let body = SendMessage {
            chat_id: "42",
            text: "<b>hi</b>",
            parse_mode: "HTML",
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({"chat_id": "42", "text": "<b>hi</b>", "parse_mode": "HTML"})
        );
    }
}
