//! Chat handler - the request pipeline around the completion gateway.

use axum::{Extension, Json, extract::State};
use banter_llm::{ChatClient, CompletionRequest, fallback_title, generate_title};
use banter_models::{Conversation, Message, MessageRole};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub conversation_id: String,
    pub user_message: Message,
    pub assistant_message: Message,
}

// POST /chat
//
// authenticate (middleware) -> load/create conversation -> load history ->
// persist user turn -> assemble context -> gateway -> persist reply ->
// auto-title -> respond. The user turn is durable before the gateway is
// consulted, so a failed reply never loses input.
pub async fn chat(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let text = request.message.trim();
    if text.is_empty() {
        return Err(ApiError::bad_request("Message must not be empty"));
    }

    let conversation = match &request.conversation_id {
        Some(id) => state.storage.conversations.get_owned(id, &user.id)?,
        None => {
            let conversation = Conversation::new(&user.id);
            state.storage.conversations.create(&conversation)?;
            conversation
        }
    };

    let history = state
        .storage
        .conversations
        .list_messages(&conversation.id, &user.id)?;

    let user_message = state.storage.conversations.append_message(
        &conversation.id,
        &user.id,
        MessageRole::User,
        text,
    )?;

    let context = state.assembler.build(&history, text);
    let completion_request = CompletionRequest::new(context)
        .with_temperature(0.7)
        .with_max_tokens(1_000);
    let completion = state.llm.complete(completion_request).await?;

    if let Some(usage) = &completion.usage {
        tracing::debug!(
            conversation_id = %conversation.id,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "completion generated"
        );
    }

    let assistant_message = state.storage.conversations.append_message(
        &conversation.id,
        &user.id,
        MessageRole::Assistant,
        &completion.content,
    )?;

    if conversation.title.is_none() && history.is_empty() {
        let title = title_for_first_exchange(&state, text).await;
        if let Err(err) = state
            .storage
            .conversations
            .set_title(&conversation.id, &user.id, &title)
        {
            tracing::warn!(error = %err, "failed to store conversation title");
        }
    }

    Ok(Json(ChatResponse {
        conversation_id: conversation.id,
        user_message,
        assistant_message,
    }))
}

/// Title generation is cosmetic: any failure falls back to a deterministic
/// truncation of the first message.
async fn title_for_first_exchange(state: &AppState, first_message: &str) -> String {
    match generate_title(state.llm.as_ref(), first_message).await {
        Ok(title) if !title.is_empty() => title,
        Ok(_) => fallback_title(first_message),
        Err(err) => {
            tracing::warn!(error = %err, "title generation failed, using fallback");
            fallback_title(first_message)
        }
    }
}
