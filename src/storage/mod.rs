// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Storage Module
//!
//! Relational persistence for accounts, lists, todos, and tags on top of an
//! embedded redb database (pure Rust, ACID).
//!
//! ## Design
//!
//! - One [`TodoDatabase`] per process, shared through `AppState`. Handlers
//!   receive it per request; there is no other cross-request state.
//! - Every operation that touches a list or todo takes the acting account id
//!   and filters by it. Rows owned by someone else surface as `NotFound`.
//! - Multi-step mutations (cascade deletes, batch tag assignment,
//!   refresh-token rotation) each run in a single write transaction.

pub mod database;
pub mod error;
pub mod lists;
pub mod ownership;
pub mod tags;
pub mod todos;
pub mod users;

pub use database::TodoDatabase;
pub use error::{StorageError, StorageResult};
pub use lists::StoredList;
pub use ownership::OwnedRecord;
pub use tags::StoredTag;
pub use todos::{NewTodo, StoredTodo};
pub use users::StoredUser;
