// SPDX-License-Identifier: AGPL-3.0-or-later

//! Storage error type shared by all database operations.

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Row absent, or present but owned by someone else. The two cases are
    /// deliberately indistinguishable to the caller.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// A referenced row failed validation (e.g. a todo's target list does
    /// not exist or belongs to another account).
    #[error("invalid reference: {0}")]
    InvalidReference(String),
}

pub type StorageResult<T> = Result<T, StorageError>;
