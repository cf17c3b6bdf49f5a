//! TOML configuration file loading
//!
//! Supports `~/.config/sada/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of
//! defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct SadaConfigFile {
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,
}

/// LLM-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Model identifier (e.g. "gemini-1.5-flash")
    pub model: Option<String>,

    /// Generation API key; usually set via SADA_API_KEY instead
    pub api_key: Option<String>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Enable voice input/output
    pub enabled: Option<bool>,

    /// BCP-47 transcription locale (e.g. "ur-PK")
    pub stt_language: Option<String>,

    /// Two-letter synthesis fallback language (e.g. "ur")
    pub default_tts_language: Option<String>,

    /// Seconds to wait for speech to begin before timing out
    pub wait_timeout_secs: Option<u64>,

    /// Maximum utterance length in seconds
    pub phrase_limit_secs: Option<u64>,
}

/// Load the TOML config file from the standard path
///
/// Returns `SadaConfigFile::default()` if the file doesn't exist or
/// can't be parsed.
pub fn load_config_file() -> SadaConfigFile {
    let Some(path) = config_file_path() else {
        return SadaConfigFile::default();
    };

    if !path.exists() {
        return SadaConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                SadaConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            SadaConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/sada/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("sada").join("config.toml"))
}
