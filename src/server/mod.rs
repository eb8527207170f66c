pub mod handlers;
pub mod render;
pub mod types;

use crate::{Result, chat::ChatSession, config::Config, history};
use axum::{
    Router,
    routing::{get, post},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

pub fn router(state: handlers::AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/send", post(handlers::send_form))
        .route(
            "/api/messages",
            get(handlers::list_messages).post(handlers::post_message),
        )
        .route("/api/reload", post(handlers::reload))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    let store = history::open_store(&config.store).await?;
    let session = Arc::new(ChatSession::new(store, config.chat.clone()));

    if !session.load_history().await {
        warn!("Initial history load failed; serving with an empty list");
    }

    let app = router(handlers::AppState { session });

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
