// SPDX-License-Identifier: AGPL-3.0-or-later

//! Global tag catalog and the todo ↔ tag association.
//!
//! Tags are shared across accounts and carry no owner. Assignment and
//! removal still verify that the caller owns the target todo. Associations
//! are stored in both directions (`todo|tag` and `tag|todo`) so that both
//! "tags of a todo" and the tag-delete cascade are prefix scans.

use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::database::{
    composite_key, composite_right, prefix_bounds, TodoDatabase, TAGS, TAG_NAME_INDEX, TAG_TODOS,
    TODOS, TODO_TAGS,
};
use super::ownership::require_owner;
use super::todos::StoredTodo;
use super::{StorageError, StorageResult};

const TODO_NOT_FOUND: &str = "Todo not found or access denied";
const TAG_NOT_FOUND: &str = "Tag not found";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredTag {
    pub id: String,
    pub name: String,
}

impl TodoDatabase {
    /// The whole tag catalog.
    pub fn list_tags(&self) -> StorageResult<Vec<StoredTag>> {
        let read_txn = self.db.begin_read()?;
        let tags = read_txn.open_table(TAGS)?;
        let mut result = Vec::new();
        for entry in tags.iter()? {
            let entry = entry?;
            result.push(serde_json::from_slice(entry.1.value())?);
        }
        Ok(result)
    }

    /// Create a tag with a catalog-unique name.
    pub fn create_tag(&self, name: &str) -> StorageResult<StoredTag> {
        let tag = StoredTag {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        };
        let json = serde_json::to_vec(&tag)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut tags = write_txn.open_table(TAGS)?;
            let mut by_name = write_txn.open_table(TAG_NAME_INDEX)?;

            if by_name.get(name)?.is_some() {
                return Err(StorageError::AlreadyExists(
                    "Tag name already exists".to_string(),
                ));
            }

            tags.insert(tag.id.as_str(), json.as_slice())?;
            by_name.insert(name, tag.id.as_str())?;
        }
        write_txn.commit()?;
        Ok(tag)
    }

    /// Rename a tag, keeping the name index consistent and unique.
    pub fn rename_tag(&self, tag_id: &str, name: &str) -> StorageResult<StoredTag> {
        let write_txn = self.db.begin_write()?;
        let tag = {
            let mut tags = write_txn.open_table(TAGS)?;
            let mut by_name = write_txn.open_table(TAG_NAME_INDEX)?;

            let bytes = tags
                .get(tag_id)?
                .map(|value| value.value().to_vec())
                .ok_or_else(|| StorageError::NotFound(TAG_NOT_FOUND.to_string()))?;
            let mut tag: StoredTag = serde_json::from_slice(&bytes)?;

            let holder = by_name.get(name)?.map(|value| value.value().to_string());
            if holder.is_some_and(|id| id != tag_id) {
                return Err(StorageError::AlreadyExists(
                    "Tag name already exists".to_string(),
                ));
            }

            by_name.remove(tag.name.as_str())?;
            by_name.insert(name, tag_id)?;

            tag.name = name.to_string();
            let json = serde_json::to_vec(&tag)?;
            tags.insert(tag_id, json.as_slice())?;
            tag
        };
        write_txn.commit()?;
        Ok(tag)
    }

    /// Delete a tag and every association referencing it, atomically.
    pub fn delete_tag(&self, tag_id: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut tags = write_txn.open_table(TAGS)?;
            let mut by_name = write_txn.open_table(TAG_NAME_INDEX)?;
            let mut todo_tags = write_txn.open_table(TODO_TAGS)?;
            let mut tag_todos = write_txn.open_table(TAG_TODOS)?;

            let bytes = tags
                .get(tag_id)?
                .map(|value| value.value().to_vec())
                .ok_or_else(|| StorageError::NotFound(TAG_NOT_FOUND.to_string()))?;
            let tag: StoredTag = serde_json::from_slice(&bytes)?;

            let (start, end) = prefix_bounds(tag_id);
            let mut todo_ids = Vec::new();
            for entry in tag_todos.range(start.as_str()..end.as_str())? {
                let entry = entry?;
                todo_ids.push(composite_right(entry.0.value()).to_string());
            }
            for todo_id in &todo_ids {
                tag_todos.remove(composite_key(tag_id, todo_id).as_str())?;
                todo_tags.remove(composite_key(todo_id, tag_id).as_str())?;
            }

            tags.remove(tag_id)?;
            by_name.remove(tag.name.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Tags assigned to a todo the caller owns.
    pub fn tags_for_todo(
        &self,
        owner_user_id: &str,
        todo_id: &str,
    ) -> StorageResult<Vec<StoredTag>> {
        let read_txn = self.db.begin_read()?;
        let todos = read_txn.open_table(TODOS)?;
        let todo = match todos.get(todo_id)? {
            Some(value) => Some(serde_json::from_slice::<StoredTodo>(value.value())?),
            None => None,
        };
        require_owner(todo, owner_user_id, TODO_NOT_FOUND)?;

        let todo_tags = read_txn.open_table(TODO_TAGS)?;
        let tags = read_txn.open_table(TAGS)?;
        let (start, end) = prefix_bounds(todo_id);
        let mut result = Vec::new();
        for entry in todo_tags.range(start.as_str()..end.as_str())? {
            let entry = entry?;
            let tag_id = composite_right(entry.0.value()).to_string();
            if let Some(value) = tags.get(tag_id.as_str())? {
                result.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(result)
    }

    /// Assign a batch of tags to a todo the caller owns.
    ///
    /// Duplicate ids in the request, ids of nonexistent tags, and tags
    /// already assigned are silently skipped; valid new pairs are inserted
    /// in one transaction. Returns the number of pairs actually written.
    pub fn assign_tags(
        &self,
        owner_user_id: &str,
        todo_id: &str,
        tag_ids: &[String],
    ) -> StorageResult<usize> {
        let write_txn = self.db.begin_write()?;
        let inserted = {
            let todos = write_txn.open_table(TODOS)?;
            let tags = write_txn.open_table(TAGS)?;
            let mut todo_tags = write_txn.open_table(TODO_TAGS)?;
            let mut tag_todos = write_txn.open_table(TAG_TODOS)?;

            let todo = match todos.get(todo_id)? {
                Some(value) => Some(serde_json::from_slice::<StoredTodo>(value.value())?),
                None => None,
            };
            require_owner(todo, owner_user_id, TODO_NOT_FOUND)?;

            let mut seen: Vec<&str> = Vec::new();
            let mut inserted = 0usize;
            for tag_id in tag_ids {
                if seen.contains(&tag_id.as_str()) {
                    continue;
                }
                seen.push(tag_id);

                if tags.get(tag_id.as_str())?.is_none() {
                    continue;
                }
                let pair = composite_key(todo_id, tag_id);
                if todo_tags.get(pair.as_str())?.is_some() {
                    continue;
                }

                todo_tags.insert(pair.as_str(), ())?;
                tag_todos.insert(composite_key(tag_id, todo_id).as_str(), ())?;
                inserted += 1;
            }
            inserted
        };
        write_txn.commit()?;
        Ok(inserted)
    }

    /// Remove one tag from a todo the caller owns.
    ///
    /// Unlike assignment, removing an association that does not exist is an
    /// error, reported distinctly from a missing todo.
    pub fn remove_tag_from_todo(
        &self,
        owner_user_id: &str,
        todo_id: &str,
        tag_id: &str,
    ) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let todos = write_txn.open_table(TODOS)?;
            let mut todo_tags = write_txn.open_table(TODO_TAGS)?;
            let mut tag_todos = write_txn.open_table(TAG_TODOS)?;

            let todo = match todos.get(todo_id)? {
                Some(value) => Some(serde_json::from_slice::<StoredTodo>(value.value())?),
                None => None,
            };
            require_owner(todo, owner_user_id, TODO_NOT_FOUND)?;

            let removed = todo_tags.remove(composite_key(todo_id, tag_id).as_str())?;
            if removed.is_none() {
                return Err(StorageError::NotFound(
                    "Tag is not assigned to this todo".to_string(),
                ));
            }
            tag_todos.remove(composite_key(tag_id, todo_id).as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::database::tests::temp_db;
    use super::super::todos::NewTodo;
    use super::*;

    fn setup() -> (TodoDatabase, tempfile::TempDir, String, String) {
        let (db, dir) = temp_db();
        let owner = db.create_user("alice", "alice@gmail.com", "h").unwrap().id;
        let list = db.create_list(&owner, "Work").unwrap().id;
        let todo = db
            .create_todo(&owner, NewTodo::titled(&list, "tagged"))
            .unwrap()
            .id;
        (db, dir, owner, todo)
    }

    #[test]
    fn create_tag_rejects_duplicate_name() {
        let (db, _dir) = temp_db();
        db.create_tag("urgent").unwrap();
        let dup = db.create_tag("urgent");
        assert!(matches!(dup, Err(StorageError::AlreadyExists(_))));
        assert_eq!(db.list_tags().unwrap().len(), 1);
    }

    #[test]
    fn rename_tag_checks_uniqueness_but_allows_self() {
        let (db, _dir) = temp_db();
        let urgent = db.create_tag("urgent").unwrap();
        db.create_tag("later").unwrap();

        let clash = db.rename_tag(&urgent.id, "later");
        assert!(matches!(clash, Err(StorageError::AlreadyExists(_))));

        // Renaming to its own current name is a no-op, not a conflict.
        let same = db.rename_tag(&urgent.id, "urgent").unwrap();
        assert_eq!(same.name, "urgent");

        let renamed = db.rename_tag(&urgent.id, "asap").unwrap();
        assert_eq!(renamed.name, "asap");
        // The old name is free again.
        db.create_tag("urgent").unwrap();
    }

    #[test]
    fn assign_tags_is_idempotent_and_skips_unknown_ids() {
        let (db, _dir, owner, todo) = setup();
        let tag = db.create_tag("urgent").unwrap();

        let first = db
            .assign_tags(
                &owner,
                &todo,
                &[
                    tag.id.clone(),
                    tag.id.clone(),             // duplicate in the same request
                    "not-a-tag-id".to_string(), // unknown id
                ],
            )
            .unwrap();
        assert_eq!(first, 1);

        // Second call with the same tag succeeds and writes nothing.
        let second = db.assign_tags(&owner, &todo, &[tag.id.clone()]).unwrap();
        assert_eq!(second, 0);

        let assigned = db.tags_for_todo(&owner, &todo).unwrap();
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].name, "urgent");
    }

    #[test]
    fn assign_tags_requires_todo_ownership() {
        let (db, _dir, _owner, todo) = setup();
        let bob = db.create_user("bob", "bob@gmail.com", "h").unwrap().id;
        let tag = db.create_tag("urgent").unwrap();

        let result = db.assign_tags(&bob, &todo, &[tag.id]);
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn remove_tag_distinguishes_missing_association() {
        let (db, _dir, owner, todo) = setup();
        let tag = db.create_tag("urgent").unwrap();

        // Not assigned yet: association-level not-found.
        let unassigned = db.remove_tag_from_todo(&owner, &todo, &tag.id);
        assert!(matches!(unassigned, Err(StorageError::NotFound(_))));

        db.assign_tags(&owner, &todo, &[tag.id.clone()]).unwrap();
        db.remove_tag_from_todo(&owner, &todo, &tag.id).unwrap();
        assert!(db.tags_for_todo(&owner, &todo).unwrap().is_empty());
    }

    #[test]
    fn delete_tag_cascades_over_all_todos() {
        let (db, _dir, owner, todo) = setup();
        let list = db.create_list(&owner, "Second").unwrap().id;
        let other_todo = db
            .create_todo(&owner, NewTodo::titled(&list, "also tagged"))
            .unwrap()
            .id;
        let tag = db.create_tag("urgent").unwrap();
        let keep = db.create_tag("keep").unwrap();

        db.assign_tags(&owner, &todo, &[tag.id.clone(), keep.id.clone()])
            .unwrap();
        db.assign_tags(&owner, &other_todo, &[tag.id.clone()]).unwrap();

        db.delete_tag(&tag.id).unwrap();

        assert!(matches!(
            db.delete_tag(&tag.id),
            Err(StorageError::NotFound(_))
        ));
        let remaining: Vec<String> = db
            .tags_for_todo(&owner, &todo)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(remaining, vec!["keep".to_string()]);
        assert!(db.tags_for_todo(&owner, &other_todo).unwrap().is_empty());
        assert_eq!(db.list_tags().unwrap().len(), 1);
    }
}
