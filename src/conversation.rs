//! Conversation history types
//!
//! A conversation is an ordered sequence of turns. The ordering is the
//! wire contract: generation requests always carry the full transcript,
//! not just the latest turn.

use serde::{Deserialize, Serialize};

/// Speaker role for a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human user
    User,
    /// The assistant's reply
    Assistant,
}

impl Role {
    /// Role label used by the generation service wire format
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "model",
        }
    }
}

/// One message exchanged in the conversation, immutable once appended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who spoke
    pub role: Role,
    /// What was said
    pub text: String,
}

impl Turn {
    /// Create a user turn
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Create an assistant turn
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Ordered conversation transcript for one session
///
/// Lives for the session, cleared only by explicit user action, never
/// persisted across process restarts.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    /// Create an empty history
    #[must_use]
    pub const fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Append a turn in conversation order
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// All turns in order
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the history is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Remove all turns
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// The most recent assistant turn, if any
    #[must_use]
    pub fn last_assistant(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.role == Role::Assistant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(Role::User.wire_name(), "user");
        assert_eq!(Role::Assistant.wire_name(), "model");
    }

    #[test]
    fn test_history_ordering() {
        let mut history = ConversationHistory::new();
        history.push(Turn::user("salaam"));
        history.push(Turn::assistant("wa alaikum salaam"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.turns()[0].role, Role::User);
        assert_eq!(history.last_assistant().unwrap().text, "wa alaikum salaam");

        history.clear();
        assert!(history.is_empty());
    }
}
