//! Registration and login handlers.

use axum::{Json, extract::State};
use banter_models::{User, UserProfile};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_IDENTITY_LEN: usize = 120;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserProfile,
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let (username, email) = validate_registration(&request)?;

    let user = User::new(username, email, hash_password(&request.password));
    state.storage.users.create(&user)?;

    let access_token = issue_token(&state, &user.id)?;
    tracing::info!(user_id = %user.id, username = %user.username, "user registered");

    Ok(Json(RegisterResponse {
        user: UserProfile::from(&user),
        access_token,
        token_type: "bearer".to_string(),
    }))
}

// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    // One indistinct message for unknown user and wrong password.
    let invalid = || ApiError::unauthorized("Incorrect username or password");

    let user = state
        .storage
        .users
        .get_by_username(request.username.trim())?
        .ok_or_else(invalid)?;

    if !verify_password(&request.password, &user.password_hash) {
        return Err(invalid());
    }

    let access_token = issue_token(&state, &user.id)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

fn issue_token(state: &AppState, user_id: &str) -> Result<String, ApiError> {
    state.tokens.issue(user_id).map_err(|err| {
        tracing::error!(error = %err, "failed to sign token");
        ApiError::internal("Internal error")
    })
}

/// Boundary validation, independent of the storage layer.
fn validate_registration(request: &RegisterRequest) -> Result<(&str, &str), ApiError> {
    let username = request.username.trim();
    let email = request.email.trim();

    if username.is_empty() || username.len() > MAX_IDENTITY_LEN {
        return Err(ApiError::bad_request("Username must be 1-120 characters"));
    }
    if email.is_empty() || email.len() > MAX_IDENTITY_LEN || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email address is required"));
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters",
        ));
    }
    Ok((username, email))
}
