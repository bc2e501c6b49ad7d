use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};

use super::NotifyError;

pub const DEFAULT_TTS_URL: &str = "https://translate.google.com/translate_tts";

/// Longest text the endpoint accepts in one request.
const MAX_CHUNK_CHARS: usize = 200;

/// Google Translate speech endpoint. Produces MP3 audio.
#[derive(Clone)]
pub struct GoogleTts {
    http: Client,
    url: String,
    lang: String,
}

impl GoogleTts {
    pub fn new(url: impl Into<String>, lang: impl Into<String>) -> Result<Self, NotifyError> {
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            http,
            url: url.into(),
            lang: lang.into(),
        })
    }

    /// Synthesizes `text`, fetching each chunk in order and concatenating the MP3
    /// frames.
    #[instrument(skip(self, text), fields(lang = %self.lang, chars = text.len()), level = "debug")]
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, NotifyError> {
        let chunks = split_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(NotifyError::Speech("nothing to say".into()));
        }

        let total = chunks.len().to_string();
        let mut audio = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            let idx = idx.to_string();
            let textlen = chunk.chars().count().to_string();

            let bytes = self
                .http
                .get(&self.url)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", self.lang.as_str()),
                    ("q", chunk.as_str()),
                    ("total", total.as_str()),
                    ("idx", idx.as_str()),
                    ("textlen", textlen.as_str()),
                ])
                .send()
                .await?
                .error_for_status()?
                .bytes()
                .await?;

            audio.extend_from_slice(&bytes);
        }

        if audio.is_empty() {
            return Err(NotifyError::Speech("empty audio response".into()));
        }

        debug!(chunks = chunks.len(), bytes = audio.len(), "speech synthesized");
        Ok(audio)
    }
}

/// Packs whitespace-separated words into chunks of at most `max` characters.
/// A single word longer than `max` is cut at character boundaries.
pub(crate) fn split_text(text: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { word_len + 1 };
        if current.chars().count() + needed > max {
            chunks.push(std::mem::take(&mut current));
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_text("  hello\n   world ", 200), vec!["hello world"]);
    }

    #[test]
    fn blank_text_has_no_chunks() {
        assert!(split_text(" \n\t ", 200).is_empty());
    }

    #[test]
    fn packs_on_word_boundaries() {
        let chunks = split_text("aaa bbb ccc ddd", 7);
        assert_eq!(chunks, vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn oversized_word_is_cut() {
        let chunks = split_text("ab abcdefgh c", 3);
        assert_eq!(chunks, vec!["ab", "abc", "def", "gh", "c"]);
    }

    #[test]
    fn chunks_respect_limit() {
        let text = "Current price is 41.25 dollars. ".repeat(30);
        for chunk in split_text(&text, MAX_CHUNK_CHARS) {
            assert!(chunk.chars().count() <= MAX_CHUNK_CHARS);
        }
    }

    #[tokio::test]
    async fn blank_text_is_a_speech_error() {
        let tts = GoogleTts::new(DEFAULT_TTS_URL, "en").unwrap();

        let err = tts.synthesize("   ").await.unwrap_err();
        assert!(matches!(err, NotifyError::Speech(_)));
    }
}
