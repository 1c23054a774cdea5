//! Application state shared across all API handlers.

use std::sync::Arc;

use banter_llm::{ChatClient, ContextAssembler};
use banter_storage::Storage;

use crate::auth::TokenService;
use crate::config::AppConfig;

pub struct AppContext {
    pub config: AppConfig,
    pub storage: Storage,
    pub llm: Arc<dyn ChatClient>,
    pub tokens: TokenService,
    pub assembler: ContextAssembler,
}

pub type AppState = Arc<AppContext>;
