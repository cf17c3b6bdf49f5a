//! Sada - voice and chat assistant pipeline for Urdu and English
//!
//! This library provides the conversation-orchestration core for a
//! voice/chat assistant:
//! - Conversation history and session state
//! - Remote STT, TTS, and generation adapters
//! - Microphone capture with bounded utterance endpointing
//! - Reply-language detection for voice selection
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Presentation (CLI)                  │
//! │        text REPL  │  voice turns  │  playback       │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │            ConversationOrchestrator                  │
//! │   Session  │  History  │  Credential  │  Artifact   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              Remote services (adapters)              │
//! │   STT (Google)  │  LLM (Gemini)  │  TTS (Google)    │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod artifact;
pub mod config;
pub mod conversation;
pub mod error;
pub mod lang;
pub mod llm;
pub mod orchestrator;
pub mod session;
pub mod voice;

pub use artifact::AudioArtifact;
pub use config::Config;
pub use conversation::{ConversationHistory, Role, Turn};
pub use error::{Error, Result};
pub use lang::LanguageDetector;
pub use llm::{Gemini, Generator};
pub use orchestrator::{ConversationOrchestrator, FALLBACK_REPLY};
pub use session::{CredentialStore, SessionContext};
