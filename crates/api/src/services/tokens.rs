//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the user id (`sub`) and role claims. The
//! rest of the application treats them as opaque: routes only ever see the
//! verified [`Claims`].

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use clementine_core::{Role, UserId};

/// Errors from token issuance or verification.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token is missing, malformed, expired, or has a bad signature.
    #[error("invalid token")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried by an issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated user's id.
    pub sub: UserId,
    /// Role claim checked by admin-only routes.
    pub role: Role,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Issues and verifies bearer tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
}

impl TokenService {
    /// Create a token service from the signing secret and lifetime.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_hours: u64) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();

        Self {
            encoding: EncodingKey::from_secret(secret_bytes),
            decoding: DecodingKey::from_secret(secret_bytes),
            validation: Validation::default(),
            ttl_seconds: i64::try_from(ttl_hours).unwrap_or(i64::MAX / 3600) * 3600,
        }
    }

    /// Issue a token for the given user identity and role.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if signing fails.
    pub fn issue(&self, user_id: UserId, role: Role) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            role,
            iat: now,
            exp: now + self.ttl_seconds,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if the token is malformed, expired, or
    /// signed with a different secret.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&SecretString::from("k9#mQ2$vL7@xR4!pW8&nB3*jF6^hT1%z"), 24)
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let tokens = service();
        let token = tokens.issue(UserId::new(42), Role::Customer).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, UserId::new(42));
        assert_eq!(claims.role, Role::Customer);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_role_claim_preserved() {
        let tokens = service();
        let token = tokens.issue(UserId::new(1), Role::Admin).unwrap();
        assert_eq!(tokens.verify(&token).unwrap().role, Role::Admin);
    }

    #[test]
    fn test_rejects_tampered_token() {
        let tokens = service();
        let token = tokens.issue(UserId::new(1), Role::Customer).unwrap();

        // Corrupt the signature segment
        let mut tampered = token;
        tampered.pop();
        tampered.push('x');
        assert!(tokens.verify(&tampered).is_err());
    }

    #[test]
    fn test_rejects_token_from_other_secret() {
        let issuer = service();
        let verifier =
            TokenService::new(&SecretString::from("z1%T6h^F3j*B8n&W4p!R7x@L2v$Q9m#k"), 24);

        let token = issuer.issue(UserId::new(1), Role::Customer).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(service().verify("not-a-token").is_err());
    }
}
