// SPDX-License-Identifier: AGPL-3.0-or-later

//! Ownership scoping for stored records.
//!
//! Every list and todo row carries its owning account id. Lookups on behalf
//! of a caller go through [`require_owner`], which reports a row owned by a
//! different account exactly like an absent row. Callers can therefore never
//! learn whether a foreign id exists.

use super::{StorageError, StorageResult};

/// Records bound to a single owning account.
pub trait OwnedRecord {
    fn owner_user_id(&self) -> &str;
}

/// Collapse "absent" and "not yours" into one `NotFound`.
pub fn require_owner<T: OwnedRecord>(
    record: Option<T>,
    owner_user_id: &str,
    not_found_message: &str,
) -> StorageResult<T> {
    match record {
        Some(record) if record.owner_user_id() == owner_user_id => Ok(record),
        _ => Err(StorageError::NotFound(not_found_message.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        owner: String,
    }

    impl OwnedRecord for Row {
        fn owner_user_id(&self) -> &str {
            &self.owner
        }
    }

    #[test]
    fn matching_owner_passes() {
        let row = Row {
            owner: "user-1".into(),
        };
        let result = require_owner(Some(row), "user-1", "missing");
        assert!(result.is_ok());
    }

    #[test]
    fn wrong_owner_and_absent_row_are_identical() {
        let row = Row {
            owner: "user-1".into(),
        };
        let foreign = require_owner(Some(row), "user-2", "Todo not found");
        let absent = require_owner::<Row>(None, "user-2", "Todo not found");

        let foreign_msg = match foreign {
            Err(StorageError::NotFound(msg)) => msg,
            _ => panic!("expected NotFound for foreign owner"),
        };
        let absent_msg = match absent {
            Err(StorageError::NotFound(msg)) => msg,
            _ => panic!("expected NotFound for absent row"),
        };
        assert_eq!(foreign_msg, absent_msg);
    }
}
