//! Authentication API Endpoints
//! Mission: Exchange a valid credential pair for a signed token

use crate::auth::{
    credentials::CredentialCheck,
    models::{TokenQuery, TokenResponse},
    token::TokenCodec,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub codec: Arc<TokenCodec>,
    pub credentials: Arc<dyn CredentialCheck>,
}

impl AuthState {
    pub fn new(codec: Arc<TokenCodec>, credentials: Arc<dyn CredentialCheck>) -> Self {
        Self { codec, credentials }
    }
}

/// Token endpoint - GET /token?username=&password=
pub async fn issue_token(
    State(state): State<AuthState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<TokenResponse>, AuthApiError> {
    let username = query.username.unwrap_or_default();
    let password = query.password.unwrap_or_default();

    if !state.credentials.verify(&username, &password) {
        warn!("❌ Failed token request for user: {:?}", username);
        return Err(AuthApiError::InvalidCredentials);
    }

    let token = state.codec.issue(&username).map_err(|e| {
        error!("Token issuance failed: {}", e);
        AuthApiError::InternalError
    })?;

    info!("✅ Token issued: {}", username);

    Ok(Json(TokenResponse { token }))
}

/// Token endpoint errors
#[derive(Debug)]
pub enum AuthApiError {
    InvalidCredentials,
    InternalError,
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Incorrect credentials"),
            AuthApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
