//! Authentication Middleware
//! Mission: Gate protected routes on a valid, unexpired `AUTH-TOKEN` header

use crate::auth::{
    models::Principal,
    token::{TokenCodec, TokenError},
};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

/// Request header carrying the signed token
pub const AUTH_TOKEN_HEADER: &str = "AUTH-TOKEN";

/// Auth gate applied with `middleware::from_fn_with_state`.
///
/// The wrapped handler only runs when the token verifies; its principal is
/// then available to it as `Extension<Principal>`.
pub async fn auth_gate(
    State(codec): State<Arc<TokenCodec>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = req
        .headers()
        .get(AUTH_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let principal = codec.verify(token).map_err(|e| {
        warn!(path = %req.uri().path(), "Rejected token: {}", e);
        AuthError::from(e)
    })?;

    req.extensions_mut().insert(Principal(principal.clone()));

    // Outer layers see the principal on the response
    let mut response = next.run(req).await;
    response.extensions_mut().insert(Principal(principal));
    Ok(response)
}

/// Auth error types
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    Expired,
    InvalidSignature,
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::Expired,
            _ => AuthError::InvalidSignature,
        }
    }
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Authentication token is missing",
            AuthError::Expired => "Token has expired",
            AuthError::InvalidSignature => "Invalid token signature",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "message": self.message() }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
