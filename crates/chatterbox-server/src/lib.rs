//! Chatterbox Server - Messaging REST API
//!
//! HTTP server exposing create, list, update, and delete over the message
//! repository.

pub mod error;
pub mod extract;
pub mod http;
pub mod middleware;

use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use chatterbox_core::{ChatterboxConfig, CorsConfig, Repository};

/// Shared application state
pub struct AppState {
    pub repository: Repository,
    pub cors: CorsConfig,
}

impl AppState {
    pub fn new(repository: Repository, cors: CorsConfig) -> Self {
        Self { repository, cors }
    }

    /// Create with an in-memory database and default CORS settings
    pub fn in_memory() -> chatterbox_core::Result<Self> {
        Ok(Self::new(Repository::in_memory()?, CorsConfig::default()))
    }

    /// Create with the database file named in the config
    pub fn with_persistence(config: &ChatterboxConfig) -> chatterbox_core::Result<Self> {
        let repository = Repository::open(&config.database.path)?;
        tracing::info!("Opened message store at {:?}", config.database.path);
        Ok(Self::new(repository, config.cors.clone()))
    }
}

/// Create the API router
///
/// CORS applies to the message routes only, so an OPTIONS request to an
/// unknown path still reaches the JSON 404 fallback.
pub fn create_router(state: Arc<AppState>) -> Router {
    let messages = Router::new()
        .route(
            "/messages",
            get(http::list_messages).post(http::create_message),
        )
        .route(
            "/messages/{id}",
            patch(http::update_message).delete(http::delete_message),
        )
        .method_not_allowed_fallback(http::method_not_allowed)
        .route_layer(middleware::cors_layer(&state.cors));

    Router::new()
        // Informational endpoints
        .route("/", get(http::service_info))
        .route("/health", get(http::health))
        .method_not_allowed_fallback(http::method_not_allowed)
        // Message endpoints
        .merge(messages)
        .fallback(http::not_found)
        // Middleware
        .layer(CatchPanicLayer::custom(middleware::handle_panic))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::after_request,
        ))
        .with_state(state)
}

/// Start the server
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        "Chatterbox server v{} listening on {}",
        chatterbox_core::version(),
        addr
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
