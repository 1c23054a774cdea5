//! End-to-end API tests: real router, temp database, scripted gateway.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use banter_llm::{ContextAssembler, MockChatClient, MockStep};
use banter_server::api::AppContext;
use banter_server::auth::TokenService;
use banter_server::build_router;
use banter_server::config::AppConfig;
use banter_storage::Storage;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    llm: MockChatClient,
    _db_dir: tempfile::TempDir,
}

fn test_app() -> TestApp {
    let db_dir = tempfile::tempdir().unwrap();
    let storage = Storage::new(db_dir.path().join("test.db")).unwrap();
    let llm = MockChatClient::new();

    let config = AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_path: db_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .into_owned(),
        api_key: "test-key".to_string(),
        model: "mock-model".to_string(),
        api_base_url: "http://localhost".to_string(),
        token_secret: "integration-test-secret".to_string(),
        token_expire_minutes: 30,
        upstream_timeout_secs: 5,
        context_max_turns: 10,
        context_max_tokens: 3_000,
    };

    let state = Arc::new(AppContext {
        tokens: TokenService::new(&config.token_secret, config.token_expire_minutes),
        config,
        storage,
        llm: Arc::new(llm.clone()),
        assembler: ContextAssembler::with_default_config(),
    });

    TestApp {
        router: build_router(state),
        llm,
        _db_dir: db_dir,
    }
}

async fn request(
    router: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register(app: &TestApp, username: &str) -> String {
    let (status, body) = request(
        &app.router,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "correct-horse",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = test_app();
    let (status, body) = request(&app.router, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["status"].as_str().unwrap().contains("banter"));
}

#[tokio::test]
async fn test_register_login_me_roundtrip() {
    let app = test_app();

    let token = register(&app, "alice").await;

    let (status, profile) = request(&app.router, "GET", "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["username"], "alice");
    assert_eq!(profile["email"], "alice@example.com");
    assert!(profile.get("password_hash").is_none());

    let (status, login) = request(
        &app.router,
        "POST",
        "/auth/login",
        None,
        Some(json!({"username": "alice", "password": "correct-horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["token_type"], "bearer");

    let fresh_token = login["access_token"].as_str().unwrap();
    let (status, fresh_profile) =
        request(&app.router, "GET", "/users/me", Some(fresh_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fresh_profile["id"], profile["id"]);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = test_app();
    register(&app, "alice").await;

    let (status, _) = request(
        &app.router,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "username": "alice",
            "email": "fresh@example.com",
            "password": "correct-horse",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = request(
        &app.router,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "username": "alice2",
            "email": "alice@example.com",
            "password": "correct-horse",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_registration_validation() {
    let app = test_app();

    let (status, _) = request(
        &app.router,
        "POST",
        "/auth/register",
        None,
        Some(json!({"username": "alice", "email": "not-an-email", "password": "correct-horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &app.router,
        "POST",
        "/auth/register",
        None,
        Some(json!({"username": "alice", "email": "a@b.c", "password": "short"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wrong_credentials_are_unauthorized() {
    let app = test_app();
    register(&app, "alice").await;

    let (status, _) = request(
        &app.router,
        "POST",
        "/auth/login",
        None,
        Some(json!({"username": "alice", "password": "wrong-horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(
        &app.router,
        "POST",
        "/auth/login",
        None,
        Some(json!({"username": "nobody", "password": "correct-horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = test_app();

    let (status, _) = request(&app.router, "GET", "/conversations", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(
        &app.router,
        "GET",
        "/conversations",
        Some("not-a-real-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_chat_end_to_end() {
    let app = test_app();
    let token = register(&app, "alice").await;

    app.llm.push_step(MockStep::text("Hello, alice!")).await;
    app.llm.push_step(MockStep::text("Greeting chat")).await;

    let (status, chat) = request(
        &app.router,
        "POST",
        "/chat",
        Some(&token),
        Some(json!({"message": "Hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "chat failed: {chat}");
    let conversation_id = chat["conversation_id"].as_str().unwrap().to_string();
    assert_eq!(chat["user_message"]["content"], "Hi");
    assert_eq!(chat["assistant_message"]["content"], "Hello, alice!");
    assert_eq!(chat["assistant_message"]["role"], "assistant");

    // Exactly one conversation, auto-titled from the scripted second call.
    let (status, conversations) =
        request(&app.router, "GET", "/conversations", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conversations.as_array().unwrap().len(), 1);
    assert_eq!(conversations[0]["id"].as_str().unwrap(), conversation_id);
    assert_eq!(conversations[0]["title"], "Greeting chat");

    // Second turn in the same conversation: no extra title call.
    app.llm.push_step(MockStep::text("Still here.")).await;
    let (status, chat) = request(
        &app.router,
        "POST",
        "/chat",
        Some(&token),
        Some(json!({"message": "Are you there?", "conversation_id": conversation_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "second chat failed: {chat}");
    assert_eq!(app.llm.remaining_steps().await, 0);

    let (status, messages) = request(
        &app.router,
        "GET",
        &format!("/conversations/{}/messages", conversation_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = messages.as_array().unwrap().clone();
    assert_eq!(messages.len(), 4);
    let roles: Vec<&str> = messages.iter().map(|m| m["role"].as_str().unwrap()).collect();
    assert_eq!(roles, ["user", "assistant", "user", "assistant"]);
    let seqs: Vec<u64> = messages.iter().map(|m| m["seq"].as_u64().unwrap()).collect();
    assert_eq!(seqs, [0, 1, 2, 3]);
}

#[tokio::test]
async fn test_foreign_conversation_is_forbidden() {
    let app = test_app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    app.llm.push_step(MockStep::text("Hello!")).await;
    app.llm.push_step(MockStep::text("Title")).await;
    let (_, chat) = request(
        &app.router,
        "POST",
        "/chat",
        Some(&alice),
        Some(json!({"message": "Hi"})),
    )
    .await;
    let conversation_id = chat["conversation_id"].as_str().unwrap().to_string();

    let (status, _) = request(
        &app.router,
        "GET",
        &format!("/conversations/{}", conversation_id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &app.router,
        "POST",
        "/chat",
        Some(&bob),
        Some(json!({"message": "mine now", "conversation_id": conversation_id})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &app.router,
        "PUT",
        &format!("/conversations/{}/title", conversation_id),
        Some(&bob),
        Some(json!({"title": "stolen"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &app.router,
        "DELETE",
        &format!("/conversations/{}", conversation_id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Alice is unaffected.
    let (status, messages) = request(
        &app.router,
        "GET",
        &format!("/conversations/{}/messages", conversation_id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_conversation_is_not_found() {
    let app = test_app();
    let token = register(&app, "alice").await;

    let (status, _) = request(
        &app.router,
        "GET",
        "/conversations/does-not-exist/messages",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &app.router,
        "POST",
        "/chat",
        Some(&token),
        Some(json!({"message": "Hi", "conversation_id": "does-not-exist"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_gateway_failure_preserves_user_message() {
    let app = test_app();
    let token = register(&app, "alice").await;

    app.llm.push_step(MockStep::unavailable("connect refused")).await;

    let (status, body) = request(
        &app.router,
        "POST",
        "/chat",
        Some(&token),
        Some(json!({"message": "Hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    // No provider detail leaks.
    assert!(!body["error"]["message"].as_str().unwrap().contains("connect"));

    let (_, conversations) =
        request(&app.router, "GET", "/conversations", Some(&token), None).await;
    let conversation_id = conversations[0]["id"].as_str().unwrap().to_string();

    let (status, messages) = request(
        &app.router,
        "GET",
        &format!("/conversations/{}/messages", conversation_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "Hi");
}

#[tokio::test]
async fn test_title_falls_back_when_generation_fails() {
    let app = test_app();
    let token = register(&app, "alice").await;

    app.llm.push_step(MockStep::text("Hello!")).await;
    app.llm.push_step(MockStep::unavailable("down")).await;

    let (status, _) = request(
        &app.router,
        "POST",
        "/chat",
        Some(&token),
        Some(json!({"message": "Hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, conversations) =
        request(&app.router, "GET", "/conversations", Some(&token), None).await;
    assert_eq!(conversations[0]["title"], "Chat about Hi...");
}

#[tokio::test]
async fn test_delete_cascades() {
    let app = test_app();
    let token = register(&app, "alice").await;

    app.llm.push_step(MockStep::text("Hello!")).await;
    app.llm.push_step(MockStep::text("Title")).await;
    let (_, chat) = request(
        &app.router,
        "POST",
        "/chat",
        Some(&token),
        Some(json!({"message": "Hi"})),
    )
    .await;
    let conversation_id = chat["conversation_id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &app.router,
        "DELETE",
        &format!("/conversations/{}", conversation_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    let (status, conversations) =
        request(&app.router, "GET", "/conversations", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(conversations.as_array().unwrap().is_empty());

    let (status, _) = request(
        &app.router,
        "GET",
        &format!("/conversations/{}/messages", conversation_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_explicit_conversation_create_and_rename() {
    let app = test_app();
    let token = register(&app, "alice").await;

    let (status, conversation) = request(
        &app.router,
        "POST",
        "/conversations",
        Some(&token),
        Some(json!({"title": "Planning"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conversation["title"], "Planning");
    let conversation_id = conversation["id"].as_str().unwrap().to_string();

    let (status, renamed) = request(
        &app.router,
        "PUT",
        &format!("/conversations/{}/title", conversation_id),
        Some(&token),
        Some(json!({"title": "Planning v2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["title"], "Planning v2");

    let (status, detail) = request(
        &app.router,
        "GET",
        &format!("/conversations/{}", conversation_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["title"], "Planning v2");
    assert!(detail["messages"].as_array().unwrap().is_empty());

    let (status, _) = request(
        &app.router,
        "POST",
        "/chat",
        Some(&token),
        Some(json!({"message": "", "conversation_id": conversation_id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
