//! Authentication Module
//! Mission: Issue signed tokens and gate protected routes on them

pub mod api;
pub mod credentials;
pub mod middleware;
pub mod models;
pub mod token;

pub use api::AuthState;
pub use credentials::{CredentialCheck, StaticCredentials};
pub use middleware::{auth_gate, AuthError, AUTH_TOKEN_HEADER};
pub use models::Principal;
pub use token::{TokenCodec, TokenError};
