//! Banter Models - domain types shared across the workspace.
//!
//! Pure data definitions for users, conversations and messages. Storage and
//! HTTP concerns live in their own crates; everything here is plain serde
//! structs with uuid ids and millisecond timestamps.

pub mod conversation;
pub mod message;
pub mod user;

pub use conversation::Conversation;
pub use message::{Message, MessageRole};
pub use user::{User, UserProfile};
