pub mod workspace;

pub use workspace::{
    has_required_role, is_valid_workspace_token, sign_workspace_token, AuthorizedWorkspace, WorkspaceClaims, WorkspaceGate,
    WorkspaceTokenState, WorkspaceTokenValidation,
};

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Identity token claims; `sub` is the caller id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: impl Into<String>, expiry_hours: u64) -> Result<Self, JwtError> {
        let (iat, exp) = token_window(expiry_hours)?;

        Ok(Self {
            sub: user_id.into(),
            exp,
            iat,
        })
    }
}

/// `(iat, exp)` for a token issued now. Lifetimes that do not fit a
/// timestamp are an error, never a wrapped or panicking value.
pub(crate) fn token_window(expiry_hours: u64) -> Result<(i64, i64), JwtError> {
    let now = Utc::now();
    let exp = i64::try_from(expiry_hours)
        .ok()
        .and_then(TimeDelta::try_hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| {
            JwtError::TokenGeneration(format!("token expiry of {} hours is out of range", expiry_hours))
        })?;

    Ok((now.timestamp(), exp.timestamp()))
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,
}

/// Issues and verifies caller identity tokens (HS256)
#[derive(Clone)]
pub struct IdentityProvider {
    secret: String,
    expiry_hours: u64,
}

impl IdentityProvider {
    pub fn new(secret: impl Into<String>, expiry_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours,
        }
    }

    pub fn issue(&self, user_id: &str) -> Result<String, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }
        if user_id.trim().is_empty() {
            return Err(JwtError::TokenGeneration("empty user id".to_string()));
        }

        let claims = Claims::new(user_id, self.expiry_hours)?;
        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());

        encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(JwtError::InvalidToken("empty subject".to_string()));
        }
        Ok(token_data.claims)
    }
}

/// Short, non-reversible token label for logs
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{:x}", digest)[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify() {
        let provider = IdentityProvider::new("secret", 1);
        let token = provider.issue("user-1").unwrap();
        let claims = provider.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let token = IdentityProvider::new("other", 1).issue("user-1").unwrap();
        assert!(matches!(
            IdentityProvider::new("secret", 1).verify(&token),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn empty_secret_is_refused() {
        let provider = IdentityProvider::new("", 1);
        assert!(matches!(provider.issue("user-1"), Err(JwtError::InvalidSecret)));
        assert!(matches!(provider.verify("x.y.z"), Err(JwtError::InvalidSecret)));
    }

    #[test]
    fn out_of_range_expiry_is_an_error() {
        for hours in [u64::MAX, 3_000_000_000_000] {
            let provider = IdentityProvider::new("secret", hours);
            assert!(matches!(provider.issue("user-1"), Err(JwtError::TokenGeneration(_))));
        }
    }

    #[test]
    fn token_window_spans_the_expiry() {
        let (iat, exp) = token_window(2).unwrap();
        assert_eq!(exp - iat, 2 * 3600);
    }

    #[test]
    fn fingerprint_is_stable_and_short() {
        let a = token_fingerprint("abc");
        assert_eq!(a.len(), 12);
        assert_eq!(a, token_fingerprint("abc"));
        assert_ne!(a, token_fingerprint("abd"));
    }
}
