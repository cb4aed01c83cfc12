//! Middleware for observability.
//!
//! Request logging with latency tracking. Authentication has its own gate in
//! `auth::middleware`.

pub mod logging;

pub use logging::request_logging;
