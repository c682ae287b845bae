// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Authentication Module
//!
//! Credential and session handling for the todo API.
//!
//! ## Session Flow
//!
//! 1. `POST /api/auth/register` stores an account with a bcrypt password hash
//! 2. `POST /api/auth/login` verifies the password and returns:
//!    - a short-lived HS256 access token (identity claims, 1 h expiry)
//!    - a long-lived opaque refresh token (7 d, stored server-side)
//! 3. Subsequent requests send `Authorization: Bearer <access token>`;
//!    the [`Auth`] extractor verifies signature, expiry, issuer, audience
//!    and yields the acting account id
//! 4. `POST /api/token/refresh` rotates the refresh token: the presented
//!    value is invalidated in the same transaction that stores its
//!    replacement
//!
//! Only register, login, and refresh are reachable anonymously.

pub mod error;
pub mod extractor;
pub mod password;
pub mod tokens;

pub use error::AuthError;
pub use extractor::Auth;
pub use tokens::{AuthConfig, AuthenticatedUser};
