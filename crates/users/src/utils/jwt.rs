//! Signed auth token utilities.
//!
//! Tokens are HS256 JWTs carrying the user id as subject, issued-at, and
//! a seven-day expiry (configurable). Decode failures stay split into
//! "expired" and "invalid" so callers can tell a stale session from a
//! forged or mangled credential.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use parley_config::AuthConfig;
use parley_database::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};

/// Claims carried by an auth token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64, // user id
    pub iat: i64, // issued at (unix seconds)
    pub exp: i64, // expiry (unix seconds)
}

/// Issues and verifies signed auth tokens with the process-wide secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret_key.as_ref()),
            decoding_key: DecodingKey::from_secret(config.secret_key.as_ref()),
            token_ttl: Duration::days(config.token_ttl_days),
        }
    }

    /// Produce a signed, time-bounded token for a user. Signing failures
    /// surface as an error value rather than propagating a panic.
    pub fn encode(&self, user_id: i64) -> AuthResult<String> {
        self.encode_issued_at(user_id, Utc::now().timestamp())
    }

    /// Like [`encode`](Self::encode) but with an explicit issued-at,
    /// which also pins the expiry to `issued_at + ttl`.
    pub fn encode_issued_at(&self, user_id: i64, issued_at: i64) -> AuthResult<String> {
        let claims = Claims {
            sub: user_id,
            iat: issued_at,
            exp: issued_at + self.token_ttl.num_seconds(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::SigningFailed(e.to_string()))
    }

    /// Verify signature and expiry, returning the subject's user id.
    /// Expired and otherwise-invalid tokens map to distinct variants.
    pub fn decode(&self, token: &str) -> AuthResult<i64> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims.sub),
            Err(err) => match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(AuthError::TokenExpired),
                _ => Err(AuthError::TokenInvalid),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&AuthConfig {
            secret_key: "test_secret_key_that_is_long_enough_for_hs256".to_string(),
            token_ttl_days: 7,
        })
    }

    #[test]
    fn test_token_round_trip() {
        let issuer = issuer();
        let token = issuer.encode(123).unwrap();
        assert_eq!(issuer.decode(&token).unwrap(), 123);
    }

    #[test]
    fn test_token_issued_eight_days_ago_is_expired() {
        let issuer = issuer();
        let eight_days_ago = Utc::now().timestamp() - 8 * 24 * 60 * 60;
        let token = issuer.encode_issued_at(42, eight_days_ago).unwrap();

        assert_eq!(issuer.decode(&token).unwrap_err(), AuthError::TokenExpired);
    }

    #[test]
    fn test_garbage_token_is_invalid_not_expired() {
        let issuer = issuer();
        assert_eq!(
            issuer.decode("definitely.not.a-jwt").unwrap_err(),
            AuthError::TokenInvalid
        );
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = issuer().encode(7).unwrap();

        let other = TokenIssuer::new(&AuthConfig {
            secret_key: "a_completely_different_secret_key".to_string(),
            token_ttl_days: 7,
        });
        assert_eq!(other.decode(&token).unwrap_err(), AuthError::TokenInvalid);
    }

    #[test]
    fn test_failure_messages_are_distinguishable() {
        assert_ne!(
            AuthError::TokenExpired.to_string(),
            AuthError::TokenInvalid.to_string()
        );
    }
}
