// SPDX-License-Identifier: AGPL-3.0-or-later

//! Access-token issuance and verification, plus refresh-token generation.
//!
//! Access tokens are HS256 JWTs carrying the account's identity claims.
//! Signature, expiry, issuer, and audience are all checked on every
//! verification; nothing is trusted from the claims alone. Refresh tokens
//! are opaque random values whose state lives server-side on the account
//! row (see `storage::users`).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;
use crate::config::ACCESS_TOKEN_TTL_SECS;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Signing configuration shared by issuance and verification.
#[derive(Clone)]
pub struct AuthConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    pub issuer: String,
    pub audience: String,
}

impl AuthConfig {
    pub fn new(secret: &[u8], issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }
}

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the account id
    pub sub: String,
    pub username: String,
    pub email: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated account identity extracted from a verified token.
///
/// This is the value the `Auth` extractor yields; handlers thread its
/// `user_id` into every storage call as the ownership scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub expires_at: i64,
}

/// Issue a signed access token for the given account, expiring in one hour.
pub fn issue_access_token(
    config: &AuthConfig,
    user_id: &str,
    username: &str,
    email: &str,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = AccessClaims {
        sub: user_id.to_string(),
        username: username.to_string(),
        email: email.to_string(),
        iss: config.issuer.clone(),
        aud: config.audience.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ACCESS_TOKEN_TTL_SECS)).timestamp(),
    };

    encode(&Header::default(), &claims, &config.encoding_key)
        .map_err(|e| AuthError::Internal(e.to_string()))
}

/// Verify an access token and extract the account identity.
pub fn verify_access_token(
    config: &AuthConfig,
    token: &str,
) -> Result<AuthenticatedUser, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = CLOCK_SKEW_LEEWAY;
    validation.set_issuer(&[&config.issuer]);
    validation.set_audience(&[&config.audience]);

    let token_data =
        decode::<AccessClaims>(token, &config.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
                jsonwebtoken::errors::ErrorKind::InvalidAudience => AuthError::InvalidAudience,
                jsonwebtoken::errors::ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
                _ => AuthError::MalformedToken,
            }
        })?;

    let claims = token_data.claims;
    Ok(AuthenticatedUser {
        user_id: claims.sub,
        username: claims.username,
        email: claims.email,
        expires_at: claims.exp,
    })
}

/// Generate a fresh opaque refresh token.
pub fn new_refresh_token() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig::new(b"test-secret", "todo-server", "todo-client")
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let config = test_config();
        let token = issue_access_token(&config, "user-1", "alice", "alice@gmail.com").unwrap();

        let user = verify_access_token(&config, &token).unwrap();
        assert_eq!(user.user_id, "user-1");
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@gmail.com");
        assert!(user.expires_at > Utc::now().timestamp());
    }

    #[test]
    fn wrong_secret_fails_signature_check() {
        let config = test_config();
        let token = issue_access_token(&config, "user-1", "alice", "alice@gmail.com").unwrap();

        let other = AuthConfig::new(b"other-secret", "todo-server", "todo-client");
        let result = verify_access_token(&other, &token);
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn wrong_issuer_or_audience_is_rejected() {
        let config = test_config();
        let token = issue_access_token(&config, "user-1", "alice", "alice@gmail.com").unwrap();

        let bad_iss = AuthConfig::new(b"test-secret", "someone-else", "todo-client");
        assert!(matches!(
            verify_access_token(&bad_iss, &token),
            Err(AuthError::InvalidIssuer)
        ));

        let bad_aud = AuthConfig::new(b"test-secret", "todo-server", "other-app");
        assert!(matches!(
            verify_access_token(&bad_aud, &token),
            Err(AuthError::InvalidAudience)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = test_config();
        // Expiry one hour in the past, well beyond the leeway window.
        let past = Utc::now() - Duration::hours(1);
        let claims = AccessClaims {
            sub: "user-1".to_string(),
            username: "alice".to_string(),
            email: "alice@gmail.com".to_string(),
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
            iat: (past - Duration::hours(1)).timestamp(),
            exp: past.timestamp(),
        };
        let token = encode(&Header::default(), &claims, &config.encoding_key).unwrap();

        let result = verify_access_token(&config, &token);
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn garbage_token_is_malformed() {
        let config = test_config();
        let result = verify_access_token(&config, "not.a.jwt");
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }

    #[test]
    fn refresh_tokens_are_unique() {
        assert_ne!(new_refresh_token(), new_refresh_token());
    }
}
