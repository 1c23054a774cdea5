#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::sync::Arc;
use std::time::Duration;

use banter_llm::{ContextAssembler, ContextConfig, DEFAULT_SYSTEM_PROMPT, OpenAiClient};
use banter_server::api::AppContext;
use banter_server::auth::TokenService;
use banter_server::build_router;
use banter_server::config::AppConfig;
use banter_storage::Storage;

#[tokio::main]
async fn main() {
    // Initialize tracing logger
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,banter_server=debug".into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting banter backend server");

    let config = AppConfig::load().expect("Invalid configuration");

    let storage = Storage::new(&config.database_path).expect("Failed to open database");

    let llm = OpenAiClient::with_timeout(
        config.api_key.clone(),
        Duration::from_secs(config.upstream_timeout_secs),
    )
    .with_model(config.model.clone())
    .with_base_url(config.api_base_url.clone());

    let tokens = TokenService::new(&config.token_secret, config.token_expire_minutes);

    let assembler = ContextAssembler::new(ContextConfig {
        system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        max_turns: config.context_max_turns,
        max_context_tokens: config.context_max_tokens,
    });

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!(model = %config.model, database = %config.database_path, "configured");

    let state = Arc::new(AppContext {
        config,
        storage,
        llm: Arc::new(llm),
        tokens,
        assembler,
    });

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|err| panic!("Failed to bind to {}: {}", addr, err));

    tracing::info!("banter running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
