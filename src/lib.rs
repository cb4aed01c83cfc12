//! Book API Library
//!
//! Signed-token authentication in front of an in-memory book catalogue.
//! The binary in `main.rs` only wires configuration, logging and the listener.

pub mod api;
pub mod auth;
pub mod books;
pub mod config;
pub mod middleware;

pub use api::create_router;
pub use config::Config;
