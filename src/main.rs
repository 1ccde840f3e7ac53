// src/main.rs

use std::{net::SocketAddr, sync::Arc, time::Duration};

use dotenvy::dotenv;
use quiz_backend::{
    config::Config,
    quiz::SessionRegistry,
    routes,
    sources::{QuestionCache, QuestionLoader},
    state::AppState,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Question cache shared by every session
    let questions = Arc::new(QuestionCache::new(
        QuestionLoader::from_config(&config),
        Duration::from_secs(config.cache_ttl_secs),
    ));

    // Warm the cache. A failure here is not fatal: sessions are refused
    // until a later load succeeds.
    match questions.get().await {
        Ok(store) => tracing::info!("{} questions ready from {}", store.len(), store.source()),
        Err(e) => tracing::error!("Initial question load failed: {}", e),
    }

    let state = AppState {
        questions,
        sessions: SessionRegistry::new(),
        config: config.clone(),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server
    axum::serve(listener, app).await.unwrap();
}
