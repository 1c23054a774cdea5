//! Conversation title generation.
//!
//! One extra gateway call with a dedicated prompt; cosmetic only, so every
//! failure path falls back to a deterministic truncation of the first
//! message.

use crate::client::{ChatClient, ChatTurn, CompletionRequest};
use crate::error::Result;

const TITLE_PROMPT: &str = "Generate a short, descriptive title (3-5 words) for a chat \
     that starts with the following message. Only return the title, nothing else.";

const MAX_TITLE_CHARS: usize = 80;
const FALLBACK_SNIPPET_CHARS: usize = 30;

/// Ask the gateway for a title based on the first message.
pub async fn generate_title(client: &dyn ChatClient, first_message: &str) -> Result<String> {
    let request = CompletionRequest::new(vec![
        ChatTurn::system(TITLE_PROMPT),
        ChatTurn::user(first_message),
    ])
    .with_temperature(0.5)
    .with_max_tokens(24);

    let response = client.complete(request).await?;
    Ok(normalize_title(&response.content))
}

/// Deterministic title used when the gateway call fails or returns nothing.
pub fn fallback_title(first_message: &str) -> String {
    let snippet: String = first_message
        .trim()
        .chars()
        .take(FALLBACK_SNIPPET_CHARS)
        .collect();
    if snippet.is_empty() {
        "New conversation".to_string()
    } else {
        format!("Chat about {}...", snippet)
    }
}

/// Collapse the model's answer onto a single bounded line.
fn normalize_title(raw: &str) -> String {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
        .trim_matches('"');
    line.chars().take(MAX_TITLE_CHARS).collect()
}
