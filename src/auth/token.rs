//! Signed Token Codec
//! Mission: Issue tamper-evident tokens and verify them against a fixed expiry window

use crate::auth::models::Claims;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;
use tracing::debug;

/// Token issuance / verification failure
#[derive(Debug)]
pub enum TokenError {
    EmptyPrincipal,
    InvalidSignature,
    Expired,
    Encoding(jsonwebtoken::errors::Error),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::EmptyPrincipal => write!(f, "Token principal must not be empty"),
            TokenError::InvalidSignature => write!(f, "Invalid token signature"),
            TokenError::Expired => write!(f, "Token has expired"),
            TokenError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
        }
    }
}

impl std::error::Error for TokenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TokenError::Encoding(e) => Some(e),
            _ => None,
        }
    }
}

/// HS256 token codec with a shared secret and an expiry window.
///
/// Expiry is enforced against the `iat` claim rather than an `exp` claim, so
/// the window stays a property of the verifier and not of the token.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry_window: Duration,
}

impl TokenCodec {
    /// Create a codec from a shared secret and an expiry window in seconds
    pub fn new(secret: &str, expires_in_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry_window: Duration::seconds(expires_in_secs),
        }
    }

    pub fn expiry_window(&self) -> Duration {
        self.expiry_window
    }

    /// Issue a token for `principal`, stamped with the current time
    pub fn issue(&self, principal: &str) -> Result<String, TokenError> {
        self.issue_at(principal, Utc::now())
    }

    /// Issue a token for `principal` stamped with `issued_at`
    pub fn issue_at(&self, principal: &str, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        if principal.is_empty() {
            return Err(TokenError::EmptyPrincipal);
        }

        let claims = Claims {
            sub: principal.to_string(),
            iat: issued_at.timestamp(),
        };

        debug!(
            "Issuing token for {}, valid for {}s",
            principal,
            self.expiry_window.num_seconds()
        );

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Encoding)
    }

    /// Verify a token against the current time and return its principal
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as of `now`.
    ///
    /// The signature is checked before the expiry window; a malformed or
    /// altered token is always `InvalidSignature`, whatever its age.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let decoded = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("Token rejected: {}", e);
            TokenError::InvalidSignature
        })?;

        let age = now.timestamp() - decoded.claims.iat;
        if age > self.expiry_window.num_seconds() {
            debug!(
                "Token for {} expired ({}s old)",
                decoded.claims.sub, age
            );
            return Err(TokenError::Expired);
        }

        Ok(decoded.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-12345";

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let codec = TokenCodec::new(TEST_SECRET, 600);

        let token = codec.issue("admin").unwrap();
        assert!(!token.is_empty());
        assert_eq!(codec.verify(&token).unwrap(), "admin");
    }

    #[test]
    fn test_empty_principal_rejected() {
        let codec = TokenCodec::new(TEST_SECRET, 600);
        assert!(matches!(codec.issue(""), Err(TokenError::EmptyPrincipal)));
    }

    #[test]
    fn test_expiry_boundary() {
        let codec = TokenCodec::new(TEST_SECRET, 600);
        let issued = 1_700_000_000;
        let token = codec.issue_at("admin", at(issued)).unwrap();

        assert_eq!(codec.verify_at(&token, at(issued)).unwrap(), "admin");
        assert_eq!(codec.verify_at(&token, at(issued + 599)).unwrap(), "admin");
        assert_eq!(codec.verify_at(&token, at(issued + 600)).unwrap(), "admin");
        assert!(matches!(
            codec.verify_at(&token, at(issued + 601)),
            Err(TokenError::Expired)
        ));
        assert!(matches!(
            codec.verify_at(&token, at(issued + 86_400)),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_different_secrets_reject() {
        let codec1 = TokenCodec::new("secret1", 600);
        let codec2 = TokenCodec::new("secret2", 600);

        let token = codec1.issue("admin").unwrap();
        assert!(matches!(
            codec2.verify(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_signature_checked_before_expiry() {
        let codec1 = TokenCodec::new("secret1", 600);
        let codec2 = TokenCodec::new("secret2", 600);
        let issued = 1_700_000_000;

        let token = codec1.issue_at("admin", at(issued)).unwrap();

        // Old and signed with the wrong secret: signature failure wins
        assert!(matches!(
            codec2.verify_at(&token, at(issued + 10_000)),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let codec = TokenCodec::new(TEST_SECRET, 600);
        let token = codec.issue("admin").unwrap();

        for bad in [
            "",
            "invalid.token.here",
            "not-a-token",
            &token[..token.len() - 5],
            &token[..token.rfind('.').unwrap()],
        ] {
            assert!(
                matches!(codec.verify(bad), Err(TokenError::InvalidSignature)),
                "accepted malformed token {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_single_character_flip_rejected() {
        let codec = TokenCodec::new(TEST_SECRET, 600);
        let token = codec.issue("admin").unwrap();

        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();

            assert!(
                matches!(codec.verify(&tampered), Err(TokenError::InvalidSignature)),
                "tampered token at byte {} was not rejected",
                i
            );
        }
    }

    #[test]
    fn test_forged_payload_rejected() {
        let codec = TokenCodec::new(TEST_SECRET, 600);
        let token = codec.issue("viewer").unwrap();
        let other = codec.issue("admin").unwrap();

        // Splice the admin payload onto the viewer signature
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(matches!(
            codec.verify(&forged),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(TokenError::Expired.to_string(), "Token has expired");
        assert_eq!(
            TokenError::InvalidSignature.to_string(),
            "Invalid token signature"
        );
    }
}
