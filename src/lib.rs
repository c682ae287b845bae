// SPDX-License-Identifier: AGPL-3.0-or-later

//! Multi-user todo service with per-account data ownership.
//!
//! Accounts authenticate with bcrypt-checked credentials and hold a
//! short-lived HS256 access token plus a rotating opaque refresh token.
//! Lists and todos are private to the account that created them; the tag
//! catalog is global, while todo↔tag assignments stay owner-scoped.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers and route table (Axum)
//! - `auth` - Password hashing, token issuance, bearer-token extraction
//! - `storage` - redb-backed records, indexes, and cascades
//! - `state` - Shared application state handed to every handler

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
pub mod storage;
