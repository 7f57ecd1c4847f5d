//! Per-conversation state
//!
//! A `ConversationSession` is owned by exactly one conversation and is
//! mutated only by the orchestrator handling that conversation's turns.
//! The caller (the request-handling shell) is responsible for keeping it
//! between turns; nothing here persists anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One history entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Dialogue state, derived from the pending topic.
///
/// `AwaitingClarification` means the previous turn found no grounding and
/// asked the user to narrow the topic; the remembered topic is merged into
/// the next turn's query and consumed at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueState {
    Idle,
    AwaitingClarification,
}

/// Mutable per-conversation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    /// Conversation identifier
    pub id: Uuid,

    /// Ordered turn history
    pub history: Vec<ChatMessage>,

    /// Unresolved topic remembered from a clarification turn
    pub pending_topic: Option<String>,
}

impl ConversationSession {
    /// Create a fresh session (first interaction)
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            history: Vec::new(),
            pending_topic: None,
        }
    }

    /// Current state of the dialogue state machine
    pub fn state(&self) -> DialogueState {
        if self.pending_topic.is_some() {
            DialogueState::AwaitingClarification
        } else {
            DialogueState::Idle
        }
    }

    /// Append a user message
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.history.push(ChatMessage {
            role: Role::User,
            text: text.into(),
            timestamp: Utc::now(),
        });
    }

    /// Append an assistant message
    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.history.push(ChatMessage {
            role: Role::Assistant,
            text: text.into(),
            timestamp: Utc::now(),
        });
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle() {
        let session = ConversationSession::new();
        assert_eq!(session.state(), DialogueState::Idle);
        assert!(session.history.is_empty());
    }

    #[test]
    fn test_state_follows_pending_topic() {
        let mut session = ConversationSession::new();
        session.pending_topic = Some("общежитие".to_string());
        assert_eq!(session.state(), DialogueState::AwaitingClarification);

        session.pending_topic = None;
        assert_eq!(session.state(), DialogueState::Idle);
    }

    #[test]
    fn test_history_order() {
        let mut session = ConversationSession::new();
        session.push_user("вопрос");
        session.push_assistant("ответ");

        assert_eq!(session.history.len(), 2);
        assert_eq!(session.history[0].role, Role::User);
        assert_eq!(session.history[1].role, Role::Assistant);
    }
}
