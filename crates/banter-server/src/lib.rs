//! Banter Server - HTTP surface for the chat backend.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;

use axum::{
    Router,
    http::{Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;

use api::AppState;
use api::{auth as auth_api, chat, conversations, users};
use auth::require_auth;

#[derive(serde::Serialize)]
struct Health {
    status: String,
}

async fn health() -> axum::Json<Health> {
    axum::Json(Health {
        status: "banter is working!".to_string(),
    })
}

/// Assemble the full application router.
///
/// Register/login and the health check are public; everything else sits
/// behind the bearer-token middleware.
pub fn build_router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let protected = Router::new()
        .route("/users/me", get(users::me))
        .route("/chat", post(chat::chat))
        .route(
            "/conversations",
            get(conversations::list_conversations).post(conversations::create_conversation),
        )
        .route(
            "/conversations/{id}",
            get(conversations::get_conversation).delete(conversations::delete_conversation),
        )
        .route(
            "/conversations/{id}/messages",
            get(conversations::list_messages),
        )
        .route("/conversations/{id}/title", put(conversations::update_title))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth_api::register))
        .route("/auth/login", post(auth_api::login))
        .merge(protected)
        .layer(cors)
        .with_state(state)
}
