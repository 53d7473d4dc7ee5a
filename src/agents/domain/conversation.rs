//! Transcript entries owned by the caller

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationRole {
    User,
    Assistant,
    /// Reserved; never forwarded to the engine
    System,
}

/// One immutable entry of the visible transcript.
///
/// A transcript is an ordered `Vec<ConversationMessage>`; insertion order is
/// the context window handed to the engine on the next turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    id: String,
    role: ConversationRole,
    content: String,
    timestamp: DateTime<Utc>,
}

impl ConversationMessage {
    /// Create a new entry with a fresh id and the current time
    pub fn new(role: ConversationRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ConversationRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ConversationRole::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ConversationRole::System, content)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> ConversationRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
