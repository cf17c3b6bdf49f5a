//! Shared test doubles for the external collaborators
//!
//! The orchestrator is exercised without audio hardware or network:
//! each adapter trait gets a scriptable mock that records its calls.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use secrecy::SecretString;

use sada::conversation::Turn;
use sada::llm::Generator;
use sada::voice::{SpeechSource, Synthesizer, Transcriber};
use sada::{Error, Result};

/// Generator returning a fixed reply (or a scripted failure)
pub struct MockGenerator {
    reply: Result<String>,
    pub calls: Rc<RefCell<Vec<Vec<Turn>>>>,
}

impl MockGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: Err(Error::Generation("service unavailable".to_string())),
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

#[async_trait(?Send)]
impl Generator for MockGenerator {
    async fn generate(&self, _credential: &SecretString, history: &[Turn]) -> Result<String> {
        self.calls.borrow_mut().push(history.to_vec());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(_) => Err(Error::Generation("service unavailable".to_string())),
        }
    }
}

/// Transcriber returning fixed text or a scripted failure kind
pub struct MockTranscriber {
    outcome: Result<String>,
}

impl MockTranscriber {
    pub fn recognizing(text: &str) -> Self {
        Self {
            outcome: Ok(text.to_string()),
        }
    }

    pub fn unintelligible() -> Self {
        Self {
            outcome: Err(Error::Unintelligible),
        }
    }
}

#[async_trait(?Send)]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _wav: &[u8], _language: &str) -> Result<String> {
        match &self.outcome {
            Ok(text) => Ok(text.clone()),
            Err(Error::Unintelligible) => Err(Error::Unintelligible),
            Err(_) => Err(Error::Stt("service unavailable".to_string())),
        }
    }
}

/// Synthesizer recording (text, language) pairs
pub struct MockSynthesizer {
    fail: bool,
    pub calls: Rc<RefCell<Vec<(String, String)>>>,
}

impl MockSynthesizer {
    pub fn working() -> Self {
        Self {
            fail: false,
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

#[async_trait(?Send)]
impl Synthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        self.calls
            .borrow_mut()
            .push((text.to_string(), language.to_string()));
        if self.fail {
            Err(Error::Tts("service unavailable".to_string()))
        } else {
            Ok(b"fake mp3 bytes".to_vec())
        }
    }
}

/// Speech source yielding canned WAV bytes or a capture failure
pub struct MockSpeechSource {
    outcome: Result<Vec<u8>>,
}

impl MockSpeechSource {
    pub fn capturing() -> Self {
        Self {
            outcome: Ok(b"RIFFfakewav".to_vec()),
        }
    }

    pub fn timing_out() -> Self {
        Self {
            outcome: Err(Error::CaptureTimeout),
        }
    }

    pub fn without_device() -> Self {
        Self {
            outcome: Err(Error::DeviceUnavailable("no input device".to_string())),
        }
    }
}

#[async_trait(?Send)]
impl SpeechSource for MockSpeechSource {
    async fn listen(&mut self) -> Result<Vec<u8>> {
        match &self.outcome {
            Ok(wav) => Ok(wav.clone()),
            Err(Error::CaptureTimeout) => Err(Error::CaptureTimeout),
            Err(_) => Err(Error::DeviceUnavailable("no input device".to_string())),
        }
    }
}
