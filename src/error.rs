//! Error types for the Sada assistant

use thiserror::Error;

/// Result type alias for Sada operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Sada pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Generation API credential has not been provided for this session
    #[error("no API credential set; provide one before submitting a turn")]
    CredentialMissing,

    /// No usable microphone (or speaker) device
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// No speech began within the capture wait window
    #[error("listening timed out before any speech was detected")]
    CaptureTimeout,

    /// The transcription service returned no recognizable text
    #[error("could not understand the audio")]
    Unintelligible,

    /// Speech-to-text service failure
    #[error("transcription error: {0}")]
    Stt(String),

    /// Text-to-speech service failure
    #[error("synthesis error: {0}")]
    Tts(String),

    /// Generative-language service failure
    #[error("generation error: {0}")]
    Generation(String),

    /// Audio encoding/decoding/stream error
    #[error("audio error: {0}")]
    Audio(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
