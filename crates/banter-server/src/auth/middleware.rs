//! Bearer-token authentication middleware.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use banter_models::User;

use crate::api::state::AppState;
use crate::error::ApiError;

/// The authenticated user, injected as a request extension.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Verify the bearer token and attach the owning user to the request.
///
/// The user is loaded here so downstream handlers never see a token whose
/// account has disappeared.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = match extract_bearer(req.headers().get(header::AUTHORIZATION)) {
        Some(token) => token,
        None => return ApiError::unauthorized("Missing bearer token").into_response(),
    };

    let Some(user_id) = state.tokens.verify(&token) else {
        return ApiError::unauthorized("Expired or invalid token").into_response();
    };

    let user: User = match state.storage.users.get(&user_id) {
        Ok(Some(user)) => user,
        Ok(None) => return ApiError::unauthorized("Expired or invalid token").into_response(),
        Err(err) => return ApiError::from(err).into_response(),
    };

    req.extensions_mut().insert(CurrentUser(user));
    next.run(req).await
}

fn extract_bearer(header: Option<&HeaderValue>) -> Option<String> {
    let value = header?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(|token| token.trim().to_string())
}
