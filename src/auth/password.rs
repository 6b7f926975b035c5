//! Password hashing for stored credentials (bcrypt, default work factor).

use bcrypt::{hash, verify, DEFAULT_COST};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(#[source] bcrypt::BcryptError),

    #[error("Password verification failed: {0}")]
    Verify(#[source] bcrypt::BcryptError),
}

/// Hash a plain password for storage.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash(password, DEFAULT_COST).map_err(PasswordError::Hash)
}

/// `Ok(false)` on mismatch; `Err` when the stored value is not a bcrypt hash.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    verify(password, stored).map_err(PasswordError::Verify)
}
