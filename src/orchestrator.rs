//! Conversation orchestration
//!
//! Sequences capture → transcribe → generate → synthesize for one
//! session, owning the transcript and the pending audio artifact. Each
//! submit call runs the pipeline to completion; the presentation layer
//! reads the returned history and renders it; nothing is re-triggered
//! implicitly.

use crate::conversation::Turn;
use crate::lang::LanguageDetector;
use crate::llm::Generator;
use crate::session::SessionContext;
use crate::voice::{SpeechSource, Synthesizer, Transcriber};
use crate::{AudioArtifact, Error, Result};

/// Assistant turn recorded when generation fails, keeping every user
/// turn paired with exactly one assistant-role turn
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error.";

/// Drives one assistant session over its external collaborators
///
/// Every external failure is absorbed at the call site: transcription
/// failures abort a voice turn before any history mutation, generation
/// failures append the fallback reply, synthesis failures keep the text
/// turns and simply produce no audio. No failure is fatal to the
/// session.
pub struct ConversationOrchestrator {
    session: SessionContext,
    generator: Box<dyn Generator>,
    transcriber: Box<dyn Transcriber>,
    synthesizer: Box<dyn Synthesizer>,
    detector: LanguageDetector,
    stt_language: String,
}

impl ConversationOrchestrator {
    /// Create an orchestrator for a fresh session
    #[must_use]
    pub fn new(
        generator: Box<dyn Generator>,
        transcriber: Box<dyn Transcriber>,
        synthesizer: Box<dyn Synthesizer>,
        detector: LanguageDetector,
        stt_language: impl Into<String>,
    ) -> Self {
        Self {
            session: SessionContext::new(),
            generator,
            transcriber,
            synthesizer,
            detector,
            stt_language: stt_language.into(),
        }
    }

    /// Store the generation credential for this session
    pub fn set_credential(&mut self, token: impl Into<String>) {
        self.session.credential_mut().set(token);
    }

    /// Whether the session can submit turns yet
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.session.credential().is_set()
    }

    /// The session transcript in conversation order
    #[must_use]
    pub fn history(&self) -> &[Turn] {
        self.session.history().turns()
    }

    /// Submit one text turn
    ///
    /// Appends the user turn, generates a reply over the full history,
    /// and appends the assistant turn (or the fallback reply when
    /// generation fails). No synthesis is triggered.
    ///
    /// # Errors
    ///
    /// Returns `CredentialMissing` before any mutation when no
    /// credential is set, `Config` for empty input
    pub async fn submit_text_turn(&mut self, text: &str) -> Result<&[Turn]> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Config("empty message".to_string()));
        }
        // Precondition, checked before any network call or mutation
        self.session.credential().get()?;

        self.session.history_mut().push(Turn::user(text));

        let reply = {
            let credential = self.session.credential().get()?;
            let history = self.session.history().turns();
            match self.generator.generate(credential, history).await {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::error!(error = %e, "generation failed, recording fallback reply");
                    FALLBACK_REPLY.to_string()
                }
            }
        };

        self.session.history_mut().push(Turn::assistant(reply));

        tracing::debug!(
            session = %self.session.id(),
            turns = self.session.history().len(),
            "text turn complete"
        );
        Ok(self.history())
    }

    /// Submit one voice turn
    ///
    /// Captures an utterance from `source`, transcribes it, then behaves
    /// as a text turn; additionally detects the reply language and
    /// stages synthesized audio for one-shot playback. Capture and
    /// transcription failures abort before any history mutation.
    ///
    /// # Errors
    ///
    /// Returns `CredentialMissing`, `DeviceUnavailable`,
    /// `CaptureTimeout`, `Unintelligible`, or `Stt`; in every case the
    /// history is unchanged
    pub async fn submit_voice_turn(&mut self, source: &mut dyn SpeechSource) -> Result<&[Turn]> {
        // Precondition first: don't touch the microphone without a way
        // to answer
        self.session.credential().get()?;

        let wav = source.listen().await?;
        let text = self.transcriber.transcribe(&wav, &self.stt_language).await?;
        tracing::info!(transcript = %text, "voice input recognized");

        self.submit_text_turn(&text).await?;

        let reply = self
            .session
            .history()
            .last_assistant()
            .map(|t| t.text.clone());
        if let Some(reply) = reply {
            let language = self.detector.detect(&reply);
            match self.synthesizer.synthesize(&reply, &language).await {
                Ok(mp3) => match AudioArtifact::from_mp3(&mp3) {
                    Ok(artifact) => self.session.set_pending_audio(artifact),
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to stage audio artifact");
                    }
                },
                Err(e) => {
                    // Reply text still stands; the turn just has no audio
                    tracing::warn!(error = %e, "synthesis failed");
                }
            }
        }

        Ok(self.history())
    }

    /// The transcribed text of the most recent user turn, if any
    #[must_use]
    pub fn last_user_text(&self) -> Option<&str> {
        self.session
            .history()
            .turns()
            .iter()
            .rev()
            .find(|t| t.role == crate::conversation::Role::User)
            .map(|t| t.text.as_str())
    }

    /// Take the audio staged by the last voice turn, if any
    ///
    /// One-shot: the pending reference is null afterwards, and the
    /// artifact deletes its backing file once consumed or dropped.
    pub const fn take_pending_audio(&mut self) -> Option<AudioArtifact> {
        self.session.take_pending_audio()
    }

    /// Whether audio is staged for playback
    #[must_use]
    pub const fn has_pending_audio(&self) -> bool {
        self.session.has_pending_audio()
    }

    /// Reset the transcript and discard any pending audio
    pub fn clear_history(&mut self) {
        self.session.reset();
    }
}
