//! Configuration management for the Sada assistant

pub mod file;

use std::time::Duration;

use crate::Result;

/// Default generation model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default BCP-47 transcription locale
pub const DEFAULT_STT_LANGUAGE: &str = "ur-PK";

/// Default two-letter synthesis fallback language
pub const DEFAULT_TTS_LANGUAGE: &str = "ur";

/// Default wait for speech onset before `CaptureTimeout`
const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 10;

/// Default maximum utterance length
const DEFAULT_PHRASE_LIMIT_SECS: u64 = 10;

/// Resolved assistant configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Generation model identifier (fixed per session)
    pub model: String,

    /// Generation API key, if provided via env or config file
    pub api_key: Option<String>,

    /// Voice configuration
    pub voice: VoiceConfig,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Enable voice input/output
    pub enabled: bool,

    /// BCP-47 locale sent to the transcription service
    pub stt_language: String,

    /// Fallback synthesis language when detection is ambiguous
    pub default_tts_language: String,

    /// How long to wait for speech to begin
    pub wait_timeout: Duration,

    /// Maximum utterance length
    pub phrase_limit: Duration,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stt_language: DEFAULT_STT_LANGUAGE.to_string(),
            default_tts_language: DEFAULT_TTS_LANGUAGE.to_string(),
            wait_timeout: Duration::from_secs(DEFAULT_WAIT_TIMEOUT_SECS),
            phrase_limit: Duration::from_secs(DEFAULT_PHRASE_LIMIT_SECS),
        }
    }
}

impl Config {
    /// Load configuration: defaults, overlaid by the config file,
    /// overlaid by environment variables
    ///
    /// # Errors
    ///
    /// Currently infallible but kept fallible for future validation,
    /// matching the rest of the loading surface
    pub fn load() -> Result<Self> {
        Self::load_with_options(false)
    }

    /// Load configuration with voice forcibly disabled when requested
    /// (headless servers without audio hardware)
    ///
    /// # Errors
    ///
    /// See [`Config::load`]
    pub fn load_with_options(disable_voice: bool) -> Result<Self> {
        let file = file::load_config_file();

        let model = std::env::var("SADA_MODEL")
            .ok()
            .or(file.llm.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let api_key = std::env::var("SADA_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or(file.llm.api_key);

        let voice = VoiceConfig {
            enabled: !disable_voice && file.voice.enabled.unwrap_or(true),
            stt_language: file
                .voice
                .stt_language
                .unwrap_or_else(|| DEFAULT_STT_LANGUAGE.to_string()),
            default_tts_language: file
                .voice
                .default_tts_language
                .unwrap_or_else(|| DEFAULT_TTS_LANGUAGE.to_string()),
            wait_timeout: Duration::from_secs(
                file.voice.wait_timeout_secs.unwrap_or(DEFAULT_WAIT_TIMEOUT_SECS),
            ),
            phrase_limit: Duration::from_secs(
                file.voice.phrase_limit_secs.unwrap_or(DEFAULT_PHRASE_LIMIT_SECS),
            ),
        };

        tracing::debug!(model = %model, voice_enabled = voice.enabled, "configuration resolved");

        Ok(Self {
            model,
            api_key,
            voice,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_defaults() {
        let voice = VoiceConfig::default();
        assert!(voice.enabled);
        assert_eq!(voice.stt_language, "ur-PK");
        assert_eq!(voice.default_tts_language, "ur");
        assert_eq!(voice.wait_timeout, Duration::from_secs(10));
        assert_eq!(voice.phrase_limit, Duration::from_secs(10));
    }
}
