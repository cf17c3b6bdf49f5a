//! Session-scoped state
//!
//! Credential, history, and the pending audio reference live in an
//! explicit `SessionContext` owned by the orchestrator, with a
//! create/reset lifecycle instead of ambient globals.

use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::conversation::ConversationHistory;
use crate::{AudioArtifact, Error, Result};

/// Holds the generation-service API credential for one session
///
/// Set at most once logically; a repeated set replaces the previous
/// value (last write wins). Required non-empty before any generation
/// call.
#[derive(Default)]
pub struct CredentialStore {
    token: Option<SecretString>,
}

impl CredentialStore {
    /// Create an empty store
    #[must_use]
    pub const fn new() -> Self {
        Self { token: None }
    }

    /// Store a credential, replacing any previous one
    ///
    /// Empty input is ignored: an empty credential can never satisfy the
    /// generation precondition, so it does not overwrite a valid one.
    pub fn set(&mut self, token: impl Into<String>) {
        let token = token.into();
        if token.is_empty() {
            tracing::warn!("ignoring empty credential");
            return;
        }
        self.token = Some(SecretString::from(token));
        tracing::debug!("credential stored");
    }

    /// Whether a credential has been provided
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.token.is_some()
    }

    /// The credential, or `CredentialMissing` when unset
    ///
    /// # Errors
    ///
    /// Returns `CredentialMissing` if no credential has been stored
    pub fn get(&self) -> Result<&SecretString> {
        self.token.as_ref().ok_or(Error::CredentialMissing)
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("set", &self.is_set())
            .finish()
    }
}

/// All mutable state for one assistant session
///
/// Credential and history live for the session; the pending artifact
/// lives for one render cycle. At most one pending artifact exists at a
/// time; storing a new one discards (and deletes) the previous.
#[derive(Debug)]
pub struct SessionContext {
    id: Uuid,
    credential: CredentialStore,
    history: ConversationHistory,
    pending_audio: Option<AudioArtifact>,
}

impl SessionContext {
    /// Create a fresh session
    #[must_use]
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session = %id, "session created");
        Self {
            id,
            credential: CredentialStore::new(),
            history: ConversationHistory::new(),
            pending_audio: None,
        }
    }

    /// Session identifier
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Credential store for this session
    pub const fn credential_mut(&mut self) -> &mut CredentialStore {
        &mut self.credential
    }

    /// Credential store for this session
    #[must_use]
    pub const fn credential(&self) -> &CredentialStore {
        &self.credential
    }

    /// Conversation transcript
    #[must_use]
    pub const fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Conversation transcript, mutable
    pub const fn history_mut(&mut self) -> &mut ConversationHistory {
        &mut self.history
    }

    /// Stage an artifact for one-shot playback, discarding any previous
    pub fn set_pending_audio(&mut self, artifact: AudioArtifact) {
        if self.pending_audio.is_some() {
            tracing::debug!("discarding unconsumed audio artifact");
        }
        self.pending_audio = Some(artifact);
    }

    /// Take the pending artifact, leaving none
    pub const fn take_pending_audio(&mut self) -> Option<AudioArtifact> {
        self.pending_audio.take()
    }

    /// Whether an artifact is waiting for playback
    #[must_use]
    pub const fn has_pending_audio(&self) -> bool {
        self.pending_audio.is_some()
    }

    /// Reset history and discard any pending artifact; the credential
    /// survives for the rest of the session
    pub fn reset(&mut self) {
        self.history.clear();
        self.pending_audio = None;
        tracing::debug!(session = %self.id, "session reset");
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Expose the credential for building a request header
///
/// Lives here so adapter code never touches `secrecy` directly.
#[must_use]
pub fn credential_header_value(token: &SecretString) -> &str {
    token.expose_secret()
}
