//! Text-to-speech (TTS) processing
//!
//! Adapter over the public Google Translate TTS endpoint: text plus a
//! two-letter language code in, an MP3 byte stream out. The endpoint
//! caps query length, so long replies are synthesized in chunks and the
//! MP3 segments concatenated.

use async_trait::async_trait;

use crate::{Error, Result};

/// Public synthesis endpoint
const TTS_URL: &str = "https://translate.google.com/translate_tts";

/// Maximum text length per synthesis request, in characters
const MAX_CHUNK_CHARS: usize = 200;

/// Synthesizes speech from text
#[async_trait(?Send)]
pub trait Synthesizer {
    /// Synthesize text for a two-letter language code
    ///
    /// # Returns
    ///
    /// Audio bytes (MP3 format)
    ///
    /// # Errors
    ///
    /// Returns `Tts` on any service failure
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>>;
}

/// Google Translate TTS client
pub struct GoogleTranslateTts {
    client: reqwest::Client,
}

impl GoogleTranslateTts {
    /// Create a new synthesis client
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Synthesize one chunk of text
    async fn synthesize_chunk(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        let url = format!(
            "{TTS_URL}?ie=UTF-8&client=tw-ob&tl={language}&q={}",
            urlencoding::encode(text)
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!(error = %e, "synthesis request failed");
            e
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "synthesis API error");
            return Err(Error::Tts(format!("synthesis API error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        Ok(audio.to_vec())
    }
}

impl Default for GoogleTranslateTts {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl Synthesizer for GoogleTranslateTts {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(Error::Tts("nothing to synthesize".to_string()));
        }

        tracing::debug!(chars = text.len(), language, "starting synthesis");

        let mut audio = Vec::new();
        for chunk in chunk_text(text, MAX_CHUNK_CHARS) {
            // MP3 frames are self-contained, so segments concatenate
            audio.extend(self.synthesize_chunk(&chunk, language).await?);
        }

        tracing::info!(audio_bytes = audio.len(), "synthesis complete");
        Ok(audio)
    }
}

/// Split text into synthesis-sized chunks, preferring sentence and then
/// word boundaries
fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        // A single oversized word still becomes its own chunk
        if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > max_chars {
            chunks.push(std::mem::take(&mut current));
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);

        // Break eagerly at sentence ends once a chunk has some body
        if current.chars().count() > max_chars / 2
            && word.ends_with(['.', '!', '?', '\u{06D4}'])
        {
            chunks.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
