//! Conversation model.

use serde::{Deserialize, Serialize};

/// A conversation owned by a single user.
///
/// `title` is `None` until the first exchange produces one (or the owner
/// sets it explicitly). `updated_at` moves on every appended message and is
/// the sort key for listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Conversation {
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            title: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_conversation_is_untitled() {
        let conversation = Conversation::new("user-1");
        assert!(!conversation.id.is_empty());
        assert_eq!(conversation.user_id, "user-1");
        assert!(conversation.title.is_none());
        assert_eq!(conversation.created_at, conversation.updated_at);
    }

    #[test]
    fn test_with_title() {
        let conversation = Conversation::new("user-1").with_title("Trip planning");
        assert_eq!(conversation.title.as_deref(), Some("Trip planning"));
    }
}
