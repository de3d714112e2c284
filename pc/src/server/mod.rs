//! HTTP API
//!
//! Routes:
//! - `POST /generate` - pitch
//! - `POST /code-prompt` - full scaffolding prompt
//! - `POST /buildprompt` - quick scaffolding prompt
//! - `GET /history`, `GET /history/:id` - stored pitches
//! - `GET /health`

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use eyre::{Context, Result};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::generator::Generators;
use crate::store::PitchStore;

pub mod error;
mod handlers;

pub use error::ApiError;

/// Shared state for all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub generators: Generators,
    pub store: Option<Arc<PitchStore>>,
}

impl AppState {
    pub fn new(generators: Generators, store: Option<PitchStore>) -> Self {
        Self {
            generators,
            store: store.map(Arc::new),
        }
    }
}

/// Build the router with all endpoints
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/generate", post(handlers::generate_pitch))
        .route("/code-prompt", post(handlers::code_prompt))
        .route("/buildprompt", post(handlers::build_prompt))
        .route("/history", get(handlers::list_history))
        .route("/history/:id", get(handlers::get_history))
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn serve(bind: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .context(format!("Failed to bind {}", bind))?;
    let addr = listener.local_addr()?;
    info!(
        remote = state.generators.remote_configured(),
        storage = state.store.is_some(),
        "API server listening on http://{}",
        addr
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .context("API server failed")
}
