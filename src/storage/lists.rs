// SPDX-License-Identifier: AGPL-3.0-or-later

//! List rows and the list → todos cascade.
//!
//! Every lookup is scoped by the calling account's id. A list owned by a
//! different account is reported exactly like a missing list.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::database::{
    composite_key, composite_right, prefix_bounds, TodoDatabase, LISTS, LIST_OWNER_INDEX,
    TAG_TODOS, TODOS, TODO_LIST_INDEX, TODO_OWNER_INDEX, TODO_TAGS,
};
use super::ownership::{require_owner, OwnedRecord};
use super::StorageResult;

const LIST_NOT_FOUND: &str = "List not found or access denied";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredList {
    pub id: String,
    pub owner_user_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl OwnedRecord for StoredList {
    fn owner_user_id(&self) -> &str {
        &self.owner_user_id
    }
}

impl TodoDatabase {
    /// Create a list owned by the given account.
    pub fn create_list(&self, owner_user_id: &str, name: &str) -> StorageResult<StoredList> {
        let list = StoredList {
            id: Uuid::new_v4().to_string(),
            owner_user_id: owner_user_id.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_vec(&list)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut lists = write_txn.open_table(LISTS)?;
            let mut by_owner = write_txn.open_table(LIST_OWNER_INDEX)?;
            lists.insert(list.id.as_str(), json.as_slice())?;
            by_owner.insert(composite_key(owner_user_id, &list.id).as_str(), ())?;
        }
        write_txn.commit()?;
        Ok(list)
    }

    /// All lists owned by the given account.
    pub fn lists_for_owner(&self, owner_user_id: &str) -> StorageResult<Vec<StoredList>> {
        let read_txn = self.db.begin_read()?;
        let by_owner = read_txn.open_table(LIST_OWNER_INDEX)?;
        let lists = read_txn.open_table(LISTS)?;

        let (start, end) = prefix_bounds(owner_user_id);
        let mut result = Vec::new();
        for entry in by_owner.range(start.as_str()..end.as_str())? {
            let entry = entry?;
            let list_id = composite_right(entry.0.value()).to_string();
            if let Some(value) = lists.get(list_id.as_str())? {
                result.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(result)
    }

    /// Owner-scoped single-list lookup.
    pub fn get_list(&self, owner_user_id: &str, list_id: &str) -> StorageResult<StoredList> {
        let read_txn = self.db.begin_read()?;
        let lists = read_txn.open_table(LISTS)?;
        let list = match lists.get(list_id)? {
            Some(value) => Some(serde_json::from_slice::<StoredList>(value.value())?),
            None => None,
        };
        require_owner(list, owner_user_id, LIST_NOT_FOUND)
    }

    /// Rename a list the caller owns.
    pub fn rename_list(
        &self,
        owner_user_id: &str,
        list_id: &str,
        name: &str,
    ) -> StorageResult<StoredList> {
        let write_txn = self.db.begin_write()?;
        let list = {
            let mut lists = write_txn.open_table(LISTS)?;
            let stored = match lists.get(list_id)? {
                Some(value) => Some(serde_json::from_slice::<StoredList>(value.value())?),
                None => None,
            };
            let mut list = require_owner(stored, owner_user_id, LIST_NOT_FOUND)?;

            list.name = name.to_string();
            let json = serde_json::to_vec(&list)?;
            lists.insert(list_id, json.as_slice())?;
            list
        };
        write_txn.commit()?;
        Ok(list)
    }

    /// Delete a list and every todo in it, including the todos' tag
    /// associations, as one atomic unit.
    pub fn delete_list(&self, owner_user_id: &str, list_id: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut lists = write_txn.open_table(LISTS)?;
            let mut list_owner = write_txn.open_table(LIST_OWNER_INDEX)?;
            let mut todos = write_txn.open_table(TODOS)?;
            let mut todo_owner = write_txn.open_table(TODO_OWNER_INDEX)?;
            let mut todo_list = write_txn.open_table(TODO_LIST_INDEX)?;
            let mut todo_tags = write_txn.open_table(TODO_TAGS)?;
            let mut tag_todos = write_txn.open_table(TAG_TODOS)?;

            let stored = match lists.get(list_id)? {
                Some(value) => Some(serde_json::from_slice::<StoredList>(value.value())?),
                None => None,
            };
            require_owner(stored, owner_user_id, LIST_NOT_FOUND)?;

            // Collect the member todos first; the range borrows the table.
            let (start, end) = prefix_bounds(list_id);
            let mut member_todo_ids = Vec::new();
            for entry in todo_list.range(start.as_str()..end.as_str())? {
                let entry = entry?;
                member_todo_ids.push(composite_right(entry.0.value()).to_string());
            }

            for todo_id in &member_todo_ids {
                todos.remove(todo_id.as_str())?;
                todo_owner.remove(composite_key(owner_user_id, todo_id).as_str())?;
                todo_list.remove(composite_key(list_id, todo_id).as_str())?;

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
            }

            lists.remove(list_id)?;
            list_owner.remove(composite_key(owner_user_id, list_id).as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
