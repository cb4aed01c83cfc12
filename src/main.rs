//! Book API - token-protected book catalogue service
//!
//! Loads the catalogue CSV into memory, then serves `/token`, `/books` and
//! `/health` until interrupted.

use anyhow::{Context, Result};
use book_api::{
    auth::{AuthState, StaticCredentials, TokenCodec},
    books, create_router, Config,
};
use clap::Parser;
use dotenv::dotenv;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment first so clap sees .env values
    load_env();
    init_tracing();

    let config = Config::parse();
    config.validate()?;

    info!("🚀 Book API starting");

    let store = Arc::new(books::load_store(&config.data)?);

    let codec = Arc::new(TokenCodec::new(
        &config.token_secret,
        i64::from(config.token_ttl_secs),
    ));
    let credentials = Arc::new(StaticCredentials::new(
        config.admin_username.clone(),
        config.admin_password.clone(),
    ));
    let auth_state = AuthState::new(codec, credentials);

    info!(
        "🔐 Token authentication initialized (expiry {}s)",
        config.token_ttl_secs
    );

    let app = create_router(store, auth_state);

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("🎯 API server listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("👋 Book API stopped");
    Ok(())
}

/// Initialize tracing with an env-overridable filter
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "book_api=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate directory (running with --manifest-path from elsewhere)
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
