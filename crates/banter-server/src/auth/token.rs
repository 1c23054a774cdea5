//! Bearer token issuance and verification.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256-signed bearer tokens with a fixed expiry.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_minutes: i64,
}

impl TokenService {
    pub fn new(secret: &str, ttl_minutes: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_minutes: ttl_minutes as i64,
        }
    }

    /// Issue a token for the given user id.
    pub fn issue(&self, user_id: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl_minutes * 60,
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Verify a token, returning the user id it was issued for.
    ///
    /// Expired, tampered and otherwise malformed tokens all come back as
    /// `None`; callers never learn which.
    pub fn verify(&self, token: &str) -> Option<String> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .ok()
            .map(|data| data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_verify_roundtrip() {
        let service = TokenService::new("test-secret", 30);
        let token = service.issue("user-42").unwrap();
        assert_eq!(service.verify(&token).as_deref(), Some("user-42"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenService::new("secret-a", 30);
        let verifier = TokenService::new("secret-b", 30);
        let token = issuer.issue("user-42").unwrap();
        assert!(verifier.verify(&token).is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = TokenService::new("test-secret", 30);
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "user-42".to_string(),
            iat: now - 7_200,
            exp: now - 3_600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(service.verify(&token).is_none());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let service = TokenService::new("test-secret", 30);
        assert!(service.verify("not-a-token").is_none());
    }
}
