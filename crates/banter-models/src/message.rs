//! Message model - one turn inside a conversation.

use serde::{Deserialize, Serialize};

/// Who produced a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Single persisted message.
///
/// Messages are immutable after creation. `seq` is assigned by the store at
/// append time and is strictly increasing within a conversation; it is the
/// only order used for display and context assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub seq: u64,
    pub role: MessageRole,
    pub content: String,
    pub created_at: i64,
}

impl Message {
    pub fn new(
        conversation_id: impl Into<String>,
        seq: u64,
        role: MessageRole,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation_id.into(),
            seq,
            role,
            content: content.into(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
