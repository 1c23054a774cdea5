//! User storage - account persistence with identity uniqueness.

use banter_models::User;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::sync::Arc;

use crate::error::{Result, StoreError};

const USERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("users");
/// Index table: username -> user_id
const USERNAME_INDEX_TABLE: TableDefinition<&str, &str> = TableDefinition::new("users_by_username");
/// Index table: email -> user_id
const EMAIL_INDEX_TABLE: TableDefinition<&str, &str> = TableDefinition::new("users_by_email");

/// User storage with unique username/email enforcement.
#[derive(Debug, Clone)]
pub struct UserStorage {
    db: Arc<Database>,
}

impl UserStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(USERS_TABLE)?;
        write_txn.open_table(USERNAME_INDEX_TABLE)?;
        write_txn.open_table(EMAIL_INDEX_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Persist a new user.
    ///
    /// Uniqueness of username and email is checked inside the same write
    /// transaction as the insert, so concurrent registrations cannot race
    /// past each other.
    pub fn create(&self, user: &User) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut username_index = write_txn.open_table(USERNAME_INDEX_TABLE)?;
            let mut email_index = write_txn.open_table(EMAIL_INDEX_TABLE)?;

            if username_index.get(user.username.as_str())?.is_some()
                || email_index.get(user.email.as_str())?.is_some()
            {
                return Err(StoreError::DuplicateIdentity);
            }

            username_index.insert(user.username.as_str(), user.id.as_str())?;
            email_index.insert(user.email.as_str(), user.id.as_str())?;

            let mut users = write_txn.open_table(USERS_TABLE)?;
            let serialized = serde_json::to_vec(user)?;
            users.insert(user.id.as_str(), serialized.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a user by id.
    pub fn get(&self, id: &str) -> Result<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS_TABLE)?;

        if let Some(data) = table.get(id)? {
            Ok(Some(serde_json::from_slice(data.value())?))
        } else {
            Ok(None)
        }
    }

    /// Get a user by username via the index table.
    pub fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(USERNAME_INDEX_TABLE)?;

        let Some(id) = index.get(username)? else {
            return Ok(None);
        };

        let table = read_txn.open_table(USERS_TABLE)?;
        if let Some(data) = table.get(id.value())? {
            Ok(Some(serde_json::from_slice(data.value())?))
        } else {
            Ok(None)
        }
    }
}
