// SPDX-License-Identifier: AGPL-3.0-or-later

//! Password hashing.
//!
//! bcrypt with the library default cost. The produced hash embeds its salt
//! and cost, so verification needs nothing beyond the stored string.

use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};

/// Hash a plaintext password for storage.
pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Check a plaintext password against a stored hash.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, BcryptError> {
    verify(password, password_hash)
}
