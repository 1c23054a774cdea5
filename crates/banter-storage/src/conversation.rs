//! Conversation storage - conversations and their ordered messages.
//!
//! Messages live under composite keys `"{conversation_id}:{seq:010}"` so a
//! prefix-range scan returns them in append order. Every operation that
//! touches a conversation takes the acting user id and checks ownership
//! before reading or mutating anything.

use banter_models::{Conversation, Message, MessageRole};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::sync::Arc;

use crate::error::{Result, StoreError};

const CONVERSATIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("conversations");
/// Index table: user_id:conversation_id -> conversation_id
const USER_INDEX_TABLE: TableDefinition<&str, &str> = TableDefinition::new("conversations_by_user");
/// Message table: conversation_id:{seq:010} -> message bytes
const MESSAGES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("messages");

fn message_key(conversation_id: &str, seq: u64) -> String {
    format!("{}:{:010}", conversation_id, seq)
}

fn user_index_key(user_id: &str, conversation_id: &str) -> String {
    format!("{}:{}", user_id, conversation_id)
}

/// Bounds for a range scan over all keys `"{id}:..."`.
///
/// Ids are uuids and never contain `:`, so bumping the separator to the
/// next ASCII character gives the exclusive end of the scan.
fn scan_bounds(id: &str) -> (String, String) {
    (format!("{id}:"), format!("{id};"))
}

/// Conversation and message storage with ownership enforcement.
#[derive(Debug, Clone)]
pub struct ConversationStorage {
    db: Arc<Database>,
}

impl ConversationStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(CONVERSATIONS_TABLE)?;
        write_txn.open_table(USER_INDEX_TABLE)?;
        write_txn.open_table(MESSAGES_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Persist a new conversation and its user index entry.
    pub fn create(&self, conversation: &Conversation) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CONVERSATIONS_TABLE)?;
            let serialized = serde_json::to_vec(conversation)?;
            table.insert(conversation.id.as_str(), serialized.as_slice())?;

            let mut index = write_txn.open_table(USER_INDEX_TABLE)?;
            let key = user_index_key(&conversation.user_id, &conversation.id);
            index.insert(key.as_str(), conversation.id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Load a conversation, enforcing ownership.
    ///
    /// `NotFound` when the id does not exist, `AccessDenied` when it exists
    /// but belongs to a different user.
    pub fn get_owned(&self, conversation_id: &str, user_id: &str) -> Result<Conversation> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CONVERSATIONS_TABLE)?;

        let Some(data) = table.get(conversation_id)? else {
            return Err(StoreError::NotFound("conversation"));
        };
        let conversation: Conversation = serde_json::from_slice(data.value())?;
        if conversation.user_id != user_id {
            return Err(StoreError::AccessDenied);
        }
        Ok(conversation)
    }

    /// List a user's conversations, most recently updated first.
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(USER_INDEX_TABLE)?;
        let table = read_txn.open_table(CONVERSATIONS_TABLE)?;

        let (start, end) = scan_bounds(user_id);
        let mut conversations = Vec::new();
        for item in index.range(start.as_str()..end.as_str())? {
            let (_, conversation_id) = item?;
            if let Some(data) = table.get(conversation_id.value())? {
                conversations.push(serde_json::from_slice::<Conversation>(data.value())?);
            }
        }

        conversations.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(conversations)
    }

    /// Append a message to an owned conversation.
    ///
    /// Runs in a single write transaction: ownership check, next sequence
    /// number from the tail of the message range, insert, and the bump of
    /// the conversation's `updated_at`.
    pub fn append_message(
        &self,
        conversation_id: &str,
        user_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<Message> {
        let write_txn = self.db.begin_write()?;
        let message = {
            let mut table = write_txn.open_table(CONVERSATIONS_TABLE)?;

            let mut conversation: Conversation = match table.get(conversation_id)? {
                Some(data) => serde_json::from_slice(data.value())?,
                None => return Err(StoreError::NotFound("conversation")),
            };
            if conversation.user_id != user_id {
                return Err(StoreError::AccessDenied);
            }

            let mut messages = write_txn.open_table(MESSAGES_TABLE)?;
            let (start, end) = scan_bounds(conversation_id);
            let next_seq = match messages.range(start.as_str()..end.as_str())?.next_back() {
                Some(item) => {
                    let (_, data) = item?;
                    let last: Message = serde_json::from_slice(data.value())?;
                    last.seq + 1
                }
                None => 0,
            };

            let message = Message::new(conversation_id, next_seq, role, content);
            let serialized = serde_json::to_vec(&message)?;
            messages.insert(message_key(conversation_id, next_seq).as_str(), serialized.as_slice())?;

            conversation.updated_at = chrono::Utc::now().timestamp_millis();
            let serialized = serde_json::to_vec(&conversation)?;
            table.insert(conversation_id, serialized.as_slice())?;

            message
        };
        write_txn.commit()?;
        Ok(message)
    }

    /// List an owned conversation's messages in append order.
    pub fn list_messages(&self, conversation_id: &str, user_id: &str) -> Result<Vec<Message>> {
        // Ownership first; the scan below never runs for foreign conversations.
        self.get_owned(conversation_id, user_id)?;

        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MESSAGES_TABLE)?;

        let (start, end) = scan_bounds(conversation_id);
        let mut messages = Vec::new();
        for item in table.range(start.as_str()..end.as_str())? {
            let (_, data) = item?;
            messages.push(serde_json::from_slice::<Message>(data.value())?);
        }
        Ok(messages)
    }

    /// Set an owned conversation's title.
    pub fn set_title(&self, conversation_id: &str, user_id: &str, title: &str) -> Result<Conversation> {
        let write_txn = self.db.begin_write()?;
        let conversation = {
            let mut table = write_txn.open_table(CONVERSATIONS_TABLE)?;

            let mut conversation: Conversation = match table.get(conversation_id)? {
                Some(data) => serde_json::from_slice(data.value())?,
                None => return Err(StoreError::NotFound("conversation")),
            };
            if conversation.user_id != user_id {
                return Err(StoreError::AccessDenied);
            }

            conversation.title = Some(title.to_string());
            conversation.updated_at = chrono::Utc::now().timestamp_millis();
            let serialized = serde_json::to_vec(&conversation)?;
            table.insert(conversation_id, serialized.as_slice())?;

            conversation
        };
        write_txn.commit()?;
        Ok(conversation)
    }

    /// Delete an owned conversation, cascading to its messages.
    pub fn delete(&self, conversation_id: &str, user_id: &str) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CONVERSATIONS_TABLE)?;

            let conversation: Conversation = match table.get(conversation_id)? {
                Some(data) => serde_json::from_slice(data.value())?,
                None => return Err(StoreError::NotFound("conversation")),
            };
            if conversation.user_id != user_id {
                return Err(StoreError::AccessDenied);
            }

            table.remove(conversation_id)?;

            let mut index = write_txn.open_table(USER_INDEX_TABLE)?;
            index.remove(user_index_key(user_id, conversation_id).as_str())?;

            let mut messages = write_txn.open_table(MESSAGES_TABLE)?;
            let (start, end) = scan_bounds(conversation_id);
            let keys: Vec<String> = messages
                .range(start.as_str()..end.as_str())?
                .map(|item| item.map(|(key, _)| key.value().to_string()))
                .collect::<std::result::Result<_, _>>()?;
            for key in keys {
                messages.remove(key.as_str())?;
            }
        }
        write_txn.commit()?;
        tracing::debug!(conversation_id, "conversation deleted");
        Ok(())
    }
}
