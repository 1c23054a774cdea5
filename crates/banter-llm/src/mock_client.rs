//! Deterministic scripted mock client for tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::client::{ChatClient, CompletionRequest, CompletionResponse, TokenUsage};
use crate::error::{LlmError, Result};

/// Scripted completion step.
#[derive(Debug, Clone)]
pub enum MockStep {
    /// Return a plain assistant reply.
    Text(String),
    /// Fail as if the provider rejected the request.
    Rejected(String),
    /// Fail as if the provider was unreachable.
    Unavailable(String),
}

impl MockStep {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// A deterministic mock gateway driven by scripted steps.
///
/// Each `complete` call consumes the next step; an exhausted script fails
/// as unavailable so tests notice unexpected extra calls.
#[derive(Debug, Clone, Default)]
pub struct MockChatClient {
    script: Arc<Mutex<VecDeque<MockStep>>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: Vec<MockStep>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::from(steps))),
        }
    }

    pub async fn push_step(&self, step: MockStep) {
        self.script.lock().await.push_back(step);
    }

    /// Number of unconsumed steps.
    pub async fn remaining_steps(&self) -> usize {
        self.script.lock().await.len()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let step = self.script.lock().await.pop_front();
        match step {
            Some(MockStep::Text(content)) => {
                let prompt_tokens = request.messages.len() as u32;
                let completion_tokens = content.len() as u32;
                Ok(CompletionResponse {
                    content,
                    usage: Some(TokenUsage {
                        prompt_tokens,
                        completion_tokens,
                        total_tokens: prompt_tokens + completion_tokens,
                    }),
                })
            }
            Some(MockStep::Rejected(message)) => Err(LlmError::Rejected {
                status: 400,
                message,
            }),
            Some(MockStep::Unavailable(message)) => Err(LlmError::Unavailable(message)),
            None => Err(LlmError::Unavailable("mock script exhausted".to_string())),
        }
    }
}
