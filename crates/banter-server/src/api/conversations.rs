//! Conversation CRUD handlers.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use banter_models::{Conversation, Message};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;

const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTitleRequest {
    pub title: String,
}

// POST /conversations
pub async fn create_conversation(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<CreateConversationRequest>,
) -> Result<Json<Conversation>, ApiError> {
    let mut conversation = Conversation::new(&user.id);
    if let Some(title) = request.title {
        conversation = conversation.with_title(validate_title(&title)?);
    }

    state.storage.conversations.create(&conversation)?;
    Ok(Json(conversation))
}

// GET /conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    let conversations = state.storage.conversations.list_for_user(&user.id)?;
    Ok(Json(conversations))
}

// GET /conversations/{id}
pub async fn get_conversation(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ConversationDetail>, ApiError> {
    let conversation = state.storage.conversations.get_owned(&id, &user.id)?;
    let messages = state.storage.conversations.list_messages(&id, &user.id)?;
    Ok(Json(ConversationDetail {
        conversation,
        messages,
    }))
}

// GET /conversations/{id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = state.storage.conversations.list_messages(&id, &user.id)?;
    Ok(Json(messages))
}

// PUT /conversations/{id}/title
pub async fn update_title(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTitleRequest>,
) -> Result<Json<Conversation>, ApiError> {
    let title = validate_title(&request.title)?;
    let conversation = state.storage.conversations.set_title(&id, &user.id, title)?;
    Ok(Json(conversation))
}

// DELETE /conversations/{id}
pub async fn delete_conversation(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.storage.conversations.delete(&id, &user.id)?;
    Ok(Json(serde_json::json!({ "deleted": true, "id": id })))
}

fn validate_title(title: &str) -> Result<&str, ApiError> {
    let title = title.trim();
    if title.is_empty() || title.len() > MAX_TITLE_LEN {
        return Err(ApiError::bad_request("Title must be 1-200 characters"));
    }
    Ok(title)
}
