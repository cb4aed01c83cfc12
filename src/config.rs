//! Service configuration
//!
//! Read once at startup from flags, falling back to environment variables
//! (a `.env` file is loaded first). Immutable afterwards.

use anyhow::{ensure, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::warn;

/// Fallback signing secret for local runs
pub const DEV_TOKEN_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";

#[derive(Parser, Debug, Clone)]
#[command(name = "book-api")]
#[command(about = "Book catalogue API with signed-token authentication")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "BOOK_API_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// Book catalogue CSV loaded at startup
    #[arg(long, env = "BOOK_API_DATA", default_value = "Books.csv")]
    pub data: PathBuf,

    /// Shared secret used to sign tokens
    #[arg(long, env = "TOKEN_SECRET", default_value = DEV_TOKEN_SECRET, hide_env_values = true)]
    pub token_secret: String,

    /// Token lifetime in seconds
    #[arg(long, env = "TOKEN_TTL_SECS", default_value = "600")]
    pub token_ttl_secs: u32,

    /// Username allowed to request tokens
    #[arg(long, env = "ADMIN_USERNAME", default_value = "admin")]
    pub admin_username: String,

    /// Password for the admin user
    #[arg(long, env = "ADMIN_PASSWORD", default_value = "admin", hide_env_values = true)]
    pub admin_password: String,
}

impl Config {
    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.token_secret.is_empty(), "TOKEN_SECRET must not be empty");
        ensure!(self.token_ttl_secs > 0, "TOKEN_TTL_SECS must be positive");
        ensure!(
            !self.admin_username.is_empty(),
            "ADMIN_USERNAME must not be empty"
        );

        if self.token_secret == DEV_TOKEN_SECRET {
            warn!("⚠️  Using the development token secret. SET TOKEN_SECRET IN PRODUCTION!");
        }

        Ok(())
    }
}
