// SPDX-License-Identifier: AGPL-3.0-or-later

//! Todo rows.
//!
//! A todo always belongs to exactly one list owned by the same account.
//! Creation and list reassignment both validate the target list inside the
//! write transaction, so a todo can never point at a foreign list.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::database::{
    composite_key, composite_right, prefix_bounds, TodoDatabase, LISTS, TAG_TODOS, TODOS,
    TODO_LIST_INDEX, TODO_OWNER_INDEX, TODO_TAGS,
};
use super::lists::StoredList;
use super::ownership::{require_owner, OwnedRecord};
use super::{StorageError, StorageResult};

const TODO_NOT_FOUND: &str = "Todo not found or access denied";
const LIST_REJECTED: &str = "List not found or access denied";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredTodo {
    pub id: String,
    pub owner_user_id: String,
    pub list_id: String,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedRecord for StoredTodo {
    fn owner_user_id(&self) -> &str {
        &self.owner_user_id
    }
}

/// Field set for creating or updating a todo.
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub list_id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<String>,
}

#[cfg(test)]
impl NewTodo {
    pub(crate) fn titled(list_id: &str, title: &str) -> Self {
        Self {
            list_id: list_id.to_string(),
            title: title.to_string(),
            description: None,
            due_date: None,
            priority: None,
        }
    }
}

/// Validate that the target list exists and belongs to the caller.
///
/// Used on create and on list reassignment; rejection is an
/// `InvalidReference` (HTTP 400), matching the contract for bad input
/// rather than a missing primary resource.
fn check_target_list(
    lists: &impl ReadableTable<&'static str, &'static [u8]>,
    owner_user_id: &str,
    list_id: &str,
) -> StorageResult<()> {
    let list = match lists.get(list_id)? {
        Some(value) => Some(serde_json::from_slice::<StoredList>(value.value())?),
        None => None,
    };
    match list {
        Some(list) if list.owner_user_id == owner_user_id => Ok(()),
        _ => Err(StorageError::InvalidReference(LIST_REJECTED.to_string())),
    }
}

impl TodoDatabase {
    /// Create a todo in one of the caller's lists.
    pub fn create_todo(&self, owner_user_id: &str, input: NewTodo) -> StorageResult<StoredTodo> {
        let now = Utc::now();
        let todo = StoredTodo {
            id: Uuid::new_v4().to_string(),
            owner_user_id: owner_user_id.to_string(),
            list_id: input.list_id.clone(),
            title: input.title,
            description: input.description,
            is_completed: false,
            due_date: input.due_date,
            priority: input.priority,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_vec(&todo)?;

        let write_txn = self.db.begin_write()?;
        {
            let lists = write_txn.open_table(LISTS)?;
            check_target_list(&lists, owner_user_id, &input.list_id)?;

            let mut todos = write_txn.open_table(TODOS)?;
            let mut by_owner = write_txn.open_table(TODO_OWNER_INDEX)?;
            let mut by_list = write_txn.open_table(TODO_LIST_INDEX)?;
            todos.insert(todo.id.as_str(), json.as_slice())?;
            by_owner.insert(composite_key(owner_user_id, &todo.id).as_str(), ())?;
            by_list.insert(composite_key(&input.list_id, &todo.id).as_str(), ())?;
        }
        write_txn.commit()?;
        Ok(todo)
    }

    /// All todos owned by the given account, across all lists.
    pub fn todos_for_owner(&self, owner_user_id: &str) -> StorageResult<Vec<StoredTodo>> {
        let read_txn = self.db.begin_read()?;
        let by_owner = read_txn.open_table(TODO_OWNER_INDEX)?;
        let todos = read_txn.open_table(TODOS)?;

        let (start, end) = prefix_bounds(owner_user_id);
        let mut result = Vec::new();
        for entry in by_owner.range(start.as_str()..end.as_str())? {
            let entry = entry?;
            let todo_id = composite_right(entry.0.value()).to_string();
            if let Some(value) = todos.get(todo_id.as_str())? {
                result.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(result)
    }

    /// Owner-scoped single-todo lookup.
    pub fn get_todo(&self, owner_user_id: &str, todo_id: &str) -> StorageResult<StoredTodo> {
        let read_txn = self.db.begin_read()?;
        let todos = read_txn.open_table(TODOS)?;
        let todo = match todos.get(todo_id)? {
            Some(value) => Some(serde_json::from_slice::<StoredTodo>(value.value())?),
            None => None,
        };
        require_owner(todo, owner_user_id, TODO_NOT_FOUND)
    }

    /// Update a todo the caller owns, optionally moving it to another of
    /// the caller's lists. `is_completed` of `None` leaves the completion
    /// flag untouched.
    pub fn update_todo(
        &self,
        owner_user_id: &str,
        todo_id: &str,
        input: NewTodo,
        is_completed: Option<bool>,
    ) -> StorageResult<StoredTodo> {
        let write_txn = self.db.begin_write()?;
        let todo = {
            let lists = write_txn.open_table(LISTS)?;
            let mut todos = write_txn.open_table(TODOS)?;
            let mut by_list = write_txn.open_table(TODO_LIST_INDEX)?;

            let stored = match todos.get(todo_id)? {
                Some(value) => Some(serde_json::from_slice::<StoredTodo>(value.value())?),
                None => None,
            };
            let mut todo = require_owner(stored, owner_user_id, TODO_NOT_FOUND)?;

            check_target_list(&lists, owner_user_id, &input.list_id)?;

            if todo.list_id != input.list_id {
                by_list.remove(composite_key(&todo.list_id, todo_id).as_str())?;
                by_list.insert(composite_key(&input.list_id, todo_id).as_str(), ())?;
                todo.list_id = input.list_id;
            }

            todo.title = input.title;
            todo.description = input.description;
            todo.due_date = input.due_date;
            todo.priority = input.priority;
            if let Some(done) = is_completed {
                todo.is_completed = done;
            }
            todo.updated_at = Utc::now();

            let json = serde_json::to_vec(&todo)?;
            todos.insert(todo_id, json.as_slice())?;
            todo
        };
        write_txn.commit()?;
        Ok(todo)
    }

    /// Delete a todo the caller owns along with its tag associations.
    pub fn delete_todo(&self, owner_user_id: &str, todo_id: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut todos = write_txn.open_table(TODOS)?;
            let mut by_owner = write_txn.open_table(TODO_OWNER_INDEX)?;
            let mut by_list = write_txn.open_table(TODO_LIST_INDEX)?;
            let mut todo_tags = write_txn.open_table(TODO_TAGS)?;
            let mut tag_todos = write_txn.open_table(TAG_TODOS)?;

            let stored = match todos.get(todo_id)? {
                Some(value) => Some(serde_json::from_slice::<StoredTodo>(value.value())?),
                None => None,
            };
            let todo = require_owner(stored, owner_user_id, TODO_NOT_FOUND)?;

            let (start, end) = prefix_bounds(todo_id);
            let mut assoc_tag_ids = Vec::new();
            for entry in todo_tags.range(start.as_str()..end.as_str())? {
                let entry = entry?;
                assoc_tag_ids.push(composite_right(entry.0.value()).to_string());
            }
            for tag_id in &assoc_tag_ids {
                todo_tags.remove(composite_key(todo_id, tag_id).as_str())?;
                tag_todos.remove(composite_key(tag_id, todo_id).as_str())?;
            }

            todos.remove(todo_id)?;
            by_owner.remove(composite_key(owner_user_id, todo_id).as_str())?;
            by_list.remove(composite_key(&todo.list_id, todo_id).as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
