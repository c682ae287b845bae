// SPDX-License-Identifier: AGPL-3.0-or-later

use std::env;
use std::path::Path;
use std::sync::Arc;

use crate::auth::AuthConfig;
use crate::config::{
    DATABASE_FILE, DATA_DIR_ENV, DEFAULT_DATA_DIR, DEFAULT_JWT_AUDIENCE, DEFAULT_JWT_ISSUER,
    DEV_JWT_SECRET, JWT_AUDIENCE_ENV, JWT_ISSUER_ENV, JWT_SECRET_ENV,
};
use crate::storage::{StorageResult, TodoDatabase};

/// Shared application state, cloned per request.
///
/// The only cross-request state is the database handle; everything else is
/// immutable configuration.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<TodoDatabase>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(db: TodoDatabase, auth: AuthConfig) -> Self {
        Self {
            db: Arc::new(db),
            auth: Arc::new(auth),
        }
    }

    /// Build state from environment configuration, opening (or creating)
    /// the database under `DATA_DIR`.
    pub fn from_env() -> StorageResult<Self> {
        let data_dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        let db = TodoDatabase::open(&Path::new(&data_dir).join(DATABASE_FILE))?;

        let secret = env::var(JWT_SECRET_ENV).unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using insecure development secret");
            DEV_JWT_SECRET.to_string()
        });
        let issuer = env::var(JWT_ISSUER_ENV).unwrap_or_else(|_| DEFAULT_JWT_ISSUER.to_string());
        let audience =
            env::var(JWT_AUDIENCE_ENV).unwrap_or_else(|_| DEFAULT_JWT_AUDIENCE.to_string());

        Ok(Self::new(
            db,
            AuthConfig::new(secret.as_bytes(), issuer, audience),
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Fresh state over a temp database; shared by handler tests.
    pub(crate) fn test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = TodoDatabase::open(&dir.path().join("test.redb")).expect("Failed to open db");
        let auth = AuthConfig::new(b"test-secret", "todo-server", "todo-client");
        (AppState::new(db, auth), dir)
    }

    #[test]
    fn state_clones_share_the_database() {
        let (state, _dir) = test_state();
        let clone = state.clone();
        assert!(Arc::ptr_eq(&state.db, &clone.db));
    }
}
