//! Banter Storage - persistence layer over the redb embedded database.
//!
//! Each entity family gets its own tables plus secondary index tables with
//! composite string keys; values are serde_json-encoded model structs.
//! Ordered access (messages within a conversation, conversations per user)
//! uses prefix-range scans over those composite keys.
//!
//! # Tables
//!
//! - `users` / `users_by_username` / `users_by_email`
//! - `conversations` / `conversations_by_user`
//! - `messages` (key `conversation_id:{seq:010}`)

pub mod conversation;
pub mod error;
pub mod user;

pub use conversation::ConversationStorage;
pub use error::{Result, StoreError};
pub use user::UserStorage;

use redb::Database;
use std::path::Path;
use std::sync::Arc;

/// Central storage manager that initializes all storage subsystems.
#[derive(Debug, Clone)]
pub struct Storage {
    db: Arc<Database>,
    pub users: UserStorage,
    pub conversations: ConversationStorage,
}

impl Storage {
    /// Create a new storage instance at the given path.
    ///
    /// Creates the database file if it doesn't exist and initializes all
    /// required tables.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let db = Arc::new(Database::create(path)?);

        let users = UserStorage::new(db.clone())?;
        let conversations = ConversationStorage::new(db.clone())?;

        Ok(Self {
            db,
            users,
            conversations,
        })
    }

    /// Get a reference to the underlying database.
    pub fn get_db(&self) -> Arc<Database> {
        self.db.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_storage_initializes_all_tables() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(temp_dir.path().join("test.db")).unwrap();

        assert!(storage.users.get("nobody").unwrap().is_none());
        assert!(storage.conversations.list_for_user("nobody").unwrap().is_empty());
    }
}
