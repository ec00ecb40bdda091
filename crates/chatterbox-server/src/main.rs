//! Chatterbox Server Binary
//!
//! Standalone server for the chatterbox messaging API.

use std::sync::Arc;

use chatterbox_core::ChatterboxConfig;
use chatterbox_server::{serve, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut config = match std::env::var("CHATTERBOX_CONFIG") {
        Ok(path) => {
            tracing::info!("Loading configuration from {}", path);
            ChatterboxConfig::load(&path)?
        }
        Err(_) => ChatterboxConfig::default(),
    };
    if let Ok(addr) = std::env::var("CHATTERBOX_ADDR") {
        config.server.addr = addr;
    }

    let state = Arc::new(AppState::with_persistence(&config)?);

    serve(&config.server.addr, state).await
}
