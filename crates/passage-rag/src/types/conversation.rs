//! Conversation turns

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn in a session's conversation. The per-session sequence is
/// append-only; a turn is never recorded for a failed exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    /// Segments the turn's answer was grounded on (assistant turns only).
    /// These are exactly the segments that were embedded in the prompt.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cited_segments: Vec<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            cited_segments: Vec::new(),
            created_at: chrono::Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>, cited_segments: Vec<Uuid>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            cited_segments,
            created_at: chrono::Utc::now(),
        }
    }
}
