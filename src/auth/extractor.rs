// SPDX-License-Identifier: AGPL-3.0-or-later

//! Axum extractor for authenticated accounts.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! Only the register, login, and refresh endpoints skip it; every other
//! route takes `Auth` and scopes its storage calls by `user.user_id`.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{tokens, AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Extractor that validates the bearer access token and yields the acting
/// account identity.
#[derive(Debug, Clone)]
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // A middleware (or a test) may have resolved the identity already.
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?
            .trim();

        let user = tokens::verify_access_token(&state.auth, token)?;
        Ok(Auth(user))
    }
}
