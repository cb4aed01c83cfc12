//! Request logging middleware.
//!
//! One line per request with method, path, status, the authenticated user and
//! latency. Runs outside the auth gate, so the user is read back from the
//! response extensions the gate stamps.

use crate::auth::Principal;
use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};

/// Logged in place of a user for public or rejected requests
const ANONYMOUS: &str = "-";

/// Middleware that logs HTTP requests with timing information.
///
/// WARN for 5xx, INFO otherwise. Health checks are not logged.
pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    if path == "/health" {
        return next.run(request).await;
    }

    let start = Instant::now();
    let response = next
        .run(request)
        .instrument(info_span!("http_request", %method, %path))
        .await;
    let latency_ms = start.elapsed().as_millis();

    let status = response.status();
    let user = request_user(&response);

    if status.is_server_error() {
        warn!(%method, %path, status = status.as_u16(), user, latency_ms, "Request failed");
    } else if status.is_client_error() {
        info!(%method, %path, status = status.as_u16(), user, latency_ms, "Request refused");
    } else {
        info!(%method, %path, status = status.as_u16(), user, latency_ms, "Request served");
    }

    response
}

fn request_user(response: &Response) -> &str {
    response
        .extensions()
        .get::<Principal>()
        .map(|Principal(name)| name.as_str())
        .unwrap_or(ANONYMOUS)
}
