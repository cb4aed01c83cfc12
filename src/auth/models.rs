//! Authentication Models
//! Mission: Define the token payload and the token endpoint wire types

use serde::{Deserialize, Serialize};

/// Signed token payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // principal (username)
    pub iat: i64,    // issued-at, unix seconds
}

/// Query string of `GET /token`
#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Principal attached to a request once the auth gate has accepted its token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(pub String);
