//! Credential Check
//! Mission: Decide whether a username/password pair may be issued a token

use tracing::info;

/// Credential lookup collaborator used by the token endpoint
pub trait CredentialCheck: Send + Sync {
    /// Returns true when the pair is valid
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Single configured admin pair
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let username = username.into();
        info!("🔐 Token issuance enabled for user: {}", username);
        Self {
            username,
            password: password.into(),
        }
    }
}

impl CredentialCheck for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        // Compare both fields unconditionally
        let user_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let pass_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        user_ok & pass_ok
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
