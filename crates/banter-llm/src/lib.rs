//! Banter LLM - completion gateway and context assembly.
//!
//! Wraps the outbound call to an OpenAI-compatible chat completions API
//! behind the [`ChatClient`] trait, and owns everything that shapes what is
//! sent there: the context-window assembler and conversation title
//! generation. Errors separate "provider unreachable" from "provider
//! refused"; neither is retried.

mod client;
mod context;
mod error;
mod http_client;
#[cfg(any(test, feature = "test-utils"))]
mod mock_client;
mod openai;
mod title;

pub use client::{ChatClient, ChatTurn, CompletionRequest, CompletionResponse, Role, TokenUsage};
pub use context::{ContextAssembler, ContextConfig, DEFAULT_SYSTEM_PROMPT};
pub use error::{LlmError, Result};
#[cfg(any(test, feature = "test-utils"))]
pub use mock_client::{MockChatClient, MockStep};
pub use openai::OpenAiClient;
pub use title::{fallback_title, generate_title};
