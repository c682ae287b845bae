// SPDX-License-Identifier: AGPL-3.0-or-later

//! Embedded relational store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! Primary tables map a UUID string to a serialized JSON row. Index tables
//! either map a unique scalar to the owning row id, or use a composite
//! `a|b` key for prefix range scans.
//!
//! - `users`: user_id → StoredUser
//! - `username_index`: username → user_id
//! - `email_index`: email → user_id
//! - `refresh_index`: refresh_token → user_id
//! - `lists`: list_id → StoredList
//! - `list_owner_index`: owner_id|list_id → ()
//! - `todos`: todo_id → StoredTodo
//! - `todo_owner_index`: owner_id|todo_id → ()
//! - `todo_list_index`: list_id|todo_id → ()
//! - `tags`: tag_id → StoredTag
//! - `tag_name_index`: name → tag_id
//! - `todo_tags`: todo_id|tag_id → ()
//! - `tag_todos`: tag_id|todo_id → ()

use std::path::Path;

use redb::{Database, TableDefinition};

use super::StorageResult;

// =============================================================================
// Table Definitions
// =============================================================================

pub(super) const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");
pub(super) const USERNAME_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("username_index");
pub(super) const EMAIL_INDEX: TableDefinition<&str, &str> = TableDefinition::new("email_index");
pub(super) const REFRESH_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("refresh_index");

pub(super) const LISTS: TableDefinition<&str, &[u8]> = TableDefinition::new("lists");
pub(super) const LIST_OWNER_INDEX: TableDefinition<&str, ()> =
    TableDefinition::new("list_owner_index");

pub(super) const TODOS: TableDefinition<&str, &[u8]> = TableDefinition::new("todos");
pub(super) const TODO_OWNER_INDEX: TableDefinition<&str, ()> =
    TableDefinition::new("todo_owner_index");
pub(super) const TODO_LIST_INDEX: TableDefinition<&str, ()> =
    TableDefinition::new("todo_list_index");

pub(super) const TAGS: TableDefinition<&str, &[u8]> = TableDefinition::new("tags");
pub(super) const TAG_NAME_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("tag_name_index");
pub(super) const TODO_TAGS: TableDefinition<&str, ()> = TableDefinition::new("todo_tags");
pub(super) const TAG_TODOS: TableDefinition<&str, ()> = TableDefinition::new("tag_todos");

// =============================================================================
// Composite Key Helpers
// =============================================================================

/// Build a composite key for an index table. Row ids are UUIDs, so `|` can
/// never appear inside either half.
pub(super) fn composite_key(left: &str, right: &str) -> String {
    format!("{left}|{right}")
}

/// Range bounds covering every composite key with the given left half.
///
/// `}` is the byte immediately after `|`, so `left|` .. `left}` spans
/// exactly the keys prefixed with `left|`.
pub(super) fn prefix_bounds(left: &str) -> (String, String) {
    (format!("{left}|"), format!("{left}}}"))
}

/// Extract the right half of a composite key.
pub(super) fn composite_right(key: &str) -> &str {
    key.split_once('|').map(|(_, right)| right).unwrap_or(key)
}

// =============================================================================
// TodoDatabase
// =============================================================================

/// Embedded ACID store for accounts, lists, todos, and tags.
///
/// Entity operations live in the sibling modules (`users`, `lists`, `todos`,
/// `tags`) as `impl TodoDatabase` blocks. Every multi-step mutation runs in
/// a single write transaction, so cascades and index maintenance are atomic.
pub struct TodoDatabase {
    pub(super) db: Database,
}

impl TodoDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERNAME_INDEX)?;
            let _ = write_txn.open_table(EMAIL_INDEX)?;
            let _ = write_txn.open_table(REFRESH_INDEX)?;
            let _ = write_txn.open_table(LISTS)?;
            let _ = write_txn.open_table(LIST_OWNER_INDEX)?;
            let _ = write_txn.open_table(TODOS)?;
            let _ = write_txn.open_table(TODO_OWNER_INDEX)?;
            let _ = write_txn.open_table(TODO_LIST_INDEX)?;
            let _ = write_txn.open_table(TAGS)?;
            let _ = write_txn.open_table(TAG_NAME_INDEX)?;
            let _ = write_txn.open_table(TODO_TAGS)?;
            let _ = write_txn.open_table(TAG_TODOS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}

// =============================================================================
// Tests
// =============================================================================
