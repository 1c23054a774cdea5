pub mod auth;
pub mod chat;
pub mod conversations;
pub mod state;
pub mod users;

pub use state::{AppContext, AppState};
