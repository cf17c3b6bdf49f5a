//! Voice processing module
//!
//! Handles microphone capture and utterance endpointing, remote STT and
//! TTS adapters, and speaker playback.

mod capture;
mod playback;
mod stt;
mod tts;

pub use capture::{
    AudioCapture, MicSource, SAMPLE_RATE, SpeechSource, UtteranceDetector, UtteranceState,
    samples_to_wav,
};
pub use playback::AudioPlayback;
pub use stt::{GoogleSpeech, Transcriber};
pub use tts::{GoogleTranslateTts, Synthesizer};
