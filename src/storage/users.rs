// SPDX-License-Identifier: AGPL-3.0-or-later

//! Account records and the refresh-token lifecycle.
//!
//! Usernames and emails are kept unique through dedicated index tables,
//! checked inside the same write transaction as the insert. The refresh
//! token is rotated with a single write transaction, so a presented token
//! can never be redeemed twice.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::database::{TodoDatabase, EMAIL_INDEX, REFRESH_INDEX, USERNAME_INDEX, USERS};
use super::{StorageError, StorageResult};

/// Account row. The password is only ever stored as a bcrypt hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// Single active refresh token, overwritten on every login and rotation.
    pub refresh_token: Option<String>,
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TodoDatabase {
    /// Insert a new account.
    ///
    /// Fails with `AlreadyExists` if the username or email is taken.
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> StorageResult<StoredUser> {
        let now = Utc::now();
        let user = StoredUser {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            refresh_token: None,
            refresh_token_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_vec(&user)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            let mut by_username = write_txn.open_table(USERNAME_INDEX)?;
            let mut by_email = write_txn.open_table(EMAIL_INDEX)?;

            if by_username.get(username)?.is_some() || by_email.get(email)?.is_some() {
                return Err(StorageError::AlreadyExists(
                    "Username or email already exists".to_string(),
                ));
            }

            users.insert(user.id.as_str(), json.as_slice())?;
            by_username.insert(username, user.id.as_str())?;
            by_email.insert(email, user.id.as_str())?;
        }
        write_txn.commit()?;
        Ok(user)
    }

    /// Look up an account by id.
    pub fn get_user(&self, user_id: &str) -> StorageResult<Option<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let users = read_txn.open_table(USERS)?;
        match users.get(user_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Look up an account by username (login path).
    pub fn find_user_by_username(&self, username: &str) -> StorageResult<Option<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let by_username = read_txn.open_table(USERNAME_INDEX)?;
        let user_id = match by_username.get(username)? {
            Some(value) => value.value().to_string(),
            None => return Ok(None),
        };
        let users = read_txn.open_table(USERS)?;
        match users.get(user_id.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Change an account's email, keeping the email index consistent.
    ///
    /// Fails with `AlreadyExists` if another account already uses the email.
    pub fn update_user_email(&self, user_id: &str, email: &str) -> StorageResult<StoredUser> {
        let write_txn = self.db.begin_write()?;
        let user = {
            let mut users = write_txn.open_table(USERS)?;
            let mut by_email = write_txn.open_table(EMAIL_INDEX)?;

            let bytes = users
                .get(user_id)?
                .map(|value| value.value().to_vec())
                .ok_or_else(|| StorageError::NotFound("User not found".to_string()))?;
            let mut user: StoredUser = serde_json::from_slice(&bytes)?;

            let holder = by_email.get(email)?.map(|value| value.value().to_string());
            if holder.is_some_and(|id| id != user_id) {
                return Err(StorageError::AlreadyExists(
                    "Email already in use by another account".to_string(),
                ));
            }

            by_email.remove(user.email.as_str())?;
            by_email.insert(email, user_id)?;

            user.email = email.to_string();
            user.updated_at = Utc::now();
            let json = serde_json::to_vec(&user)?;
            users.insert(user_id, json.as_slice())?;
            user
        };
        write_txn.commit()?;
        Ok(user)
    }

    /// Replace an account's password hash.
    pub fn update_user_password_hash(
        &self,
        user_id: &str,
        password_hash: &str,
    ) -> StorageResult<StoredUser> {
        let write_txn = self.db.begin_write()?;
        let user = {
            let mut users = write_txn.open_table(USERS)?;
            let bytes = users
                .get(user_id)?
                .map(|value| value.value().to_vec())
                .ok_or_else(|| StorageError::NotFound("User not found".to_string()))?;
            let mut user: StoredUser = serde_json::from_slice(&bytes)?;

            user.password_hash = password_hash.to_string();
            user.updated_at = Utc::now();
            let json = serde_json::to_vec(&user)?;
            users.insert(user_id, json.as_slice())?;
            user
        };
        write_txn.commit()?;
        Ok(user)
    }

    /// Persist a freshly issued refresh token, replacing any prior one.
    pub fn store_refresh_token(
        &self,
        user_id: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> StorageResult<StoredUser> {
        let write_txn = self.db.begin_write()?;
        let user = {
            let mut users = write_txn.open_table(USERS)?;
            let mut by_token = write_txn.open_table(REFRESH_INDEX)?;

            let bytes = users
                .get(user_id)?
                .map(|value| value.value().to_vec())
                .ok_or_else(|| StorageError::NotFound("User not found".to_string()))?;
            let mut user: StoredUser = serde_json::from_slice(&bytes)?;

            if let Some(old) = &user.refresh_token {
                by_token.remove(old.as_str())?;
            }
            by_token.insert(token, user_id)?;

            user.refresh_token = Some(token.to_string());
            user.refresh_token_expires_at = Some(expires_at);
            user.updated_at = Utc::now();
            let json = serde_json::to_vec(&user)?;
            users.insert(user_id, json.as_slice())?;
            user
        };
        write_txn.commit()?;
        Ok(user)
    }

    /// Redeem and rotate a refresh token in one atomic step.
    ///
    /// Returns the account with the new token stored, or `None` if the
    /// presented token is unknown or expired. The old token is gone the
    /// moment this commits, so concurrent redemptions cannot both succeed.
    pub fn rotate_refresh_token(
        &self,
        presented: &str,
        new_token: &str,
        new_expires_at: DateTime<Utc>,
    ) -> StorageResult<Option<StoredUser>> {
        let now = Utc::now();
        let write_txn = self.db.begin_write()?;
        let user = {
            let mut users = write_txn.open_table(USERS)?;
            let mut by_token = write_txn.open_table(REFRESH_INDEX)?;

            let user_id = match by_token.get(presented)? {
                Some(value) => value.value().to_string(),
                None => return Ok(None),
            };
            let bytes = match users.get(user_id.as_str())? {
                Some(value) => value.value().to_vec(),
                None => return Ok(None),
            };
            let mut user: StoredUser = serde_json::from_slice(&bytes)?;

            let valid = user.refresh_token.as_deref() == Some(presented)
                && user
                    .refresh_token_expires_at
                    .is_some_and(|expiry| expiry > now);
            if !valid {
                return Ok(None);
            }

            by_token.remove(presented)?;
            by_token.insert(new_token, user_id.as_str())?;

            user.refresh_token = Some(new_token.to_string());
            user.refresh_token_expires_at = Some(new_expires_at);
            user.updated_at = now;
            let json = serde_json::to_vec(&user)?;
            users.insert(user_id.as_str(), json.as_slice())?;
            user
        };
        write_txn.commit()?;
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::super::database::tests::temp_db;
    use super::*;

    #[test]
    fn create_and_find_user() {
        let (db, _dir) = temp_db();
        let user = db
            .create_user("alice", "alice@gmail.com", "$2b$12$hash")
            .unwrap();

        let by_name = db.find_user_by_username("alice").unwrap().unwrap();
        assert_eq!(by_name, user);

        let by_id = db.get_user(&user.id).unwrap().unwrap();
        assert_eq!(by_id.email, "alice@gmail.com");
    }

    #[test]
    fn duplicate_username_or_email_is_rejected() {
        let (db, _dir) = temp_db();
        db.create_user("alice", "alice@gmail.com", "h1").unwrap();

        let same_name = db.create_user("alice", "other@gmail.com", "h2");
        assert!(matches!(same_name, Err(StorageError::AlreadyExists(_))));

        let same_email = db.create_user("bob", "alice@gmail.com", "h3");
        assert!(matches!(same_email, Err(StorageError::AlreadyExists(_))));

        // The failed inserts must not leave index entries behind.
        assert!(db.find_user_by_username("bob").unwrap().is_none());
    }

    #[test]
    fn update_email_rejects_taken_address() {
        let (db, _dir) = temp_db();
        let alice = db.create_user("alice", "alice@gmail.com", "h").unwrap();
        db.create_user("bob", "bob@gmail.com", "h").unwrap();

        let taken = db.update_user_email(&alice.id, "bob@gmail.com");
        assert!(matches!(taken, Err(StorageError::AlreadyExists(_))));

        let updated = db.update_user_email(&alice.id, "alice2@gmail.com").unwrap();
        assert_eq!(updated.email, "alice2@gmail.com");
        assert!(updated.updated_at >= alice.updated_at);
    }

    #[test]
    fn refresh_rotation_invalidates_old_token() {
        let (db, _dir) = temp_db();
        let user = db.create_user("alice", "alice@gmail.com", "h").unwrap();
        let expiry = Utc::now() + Duration::days(7);

        db.store_refresh_token(&user.id, "token-1", expiry).unwrap();

        let rotated = db
            .rotate_refresh_token("token-1", "token-2", expiry)
            .unwrap()
            .unwrap();
        assert_eq!(rotated.refresh_token.as_deref(), Some("token-2"));

        // Replaying the consumed token fails.
        let replay = db.rotate_refresh_token("token-1", "token-3", expiry).unwrap();
        assert!(replay.is_none());

        // The new token works exactly once more.
        let again = db.rotate_refresh_token("token-2", "token-3", expiry).unwrap();
        assert!(again.is_some());
    }

    #[test]
    fn expired_refresh_token_is_rejected() {
        let (db, _dir) = temp_db();
        let user = db.create_user("alice", "alice@gmail.com", "h").unwrap();
        let past = Utc::now() - Duration::hours(1);
        db.store_refresh_token(&user.id, "stale", past).unwrap();

        let result = db.rotate_refresh_token("stale", "fresh", Utc::now()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn login_overwrites_previous_refresh_token() {
        let (db, _dir) = temp_db();
        let user = db.create_user("alice", "alice@gmail.com", "h").unwrap();
        let expiry = Utc::now() + Duration::days(7);

        db.store_refresh_token(&user.id, "first", expiry).unwrap();
        db.store_refresh_token(&user.id, "second", expiry).unwrap();

        // Only the latest token is redeemable.
        assert!(db
            .rotate_refresh_token("first", "x", expiry)
            .unwrap()
            .is_none());
        assert!(db
            .rotate_refresh_token("second", "x", expiry)
            .unwrap()
            .is_some());
    }
}
