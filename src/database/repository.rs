use async_trait::async_trait;
use thiserror::Error;

use crate::auth::password::PasswordError;
use crate::database::models::user::{LoginKey, User, UserCreate, UserCredentials, UserFilter, UserUpdate};

/// Failures surfaced by a [`UserRepository`].
///
/// `NotFound` is the only kind the repository manufactures itself. The other
/// variants are storage failures passed through untouched.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{label}: {detail}")]
    NotFound { label: &'static str, detail: String },

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl RepositoryError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::not_found_labeled("Not Found", detail)
    }

    pub fn not_found_labeled(label: &'static str, detail: impl Into<String>) -> Self {
        RepositoryError::NotFound {
            label,
            detail: detail.into(),
        }
    }

    pub fn user_not_found(id: &str) -> Self {
        Self::not_found(format!("User {} not found", id))
    }

    /// Login attempted with a lookup key other than `email` or `name`.
    pub fn invalid_login_key() -> Self {
        Self::not_found_labeled("Not found", "Invalid parameters")
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }
}

/// Sole owner of user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Every user whose field equals the filter value. No match is an empty vec.
    async fn find_by_field(&self, filter: &UserFilter) -> Result<Vec<User>, RepositoryError>;

    /// First user matching `key`, narrowed to the credential projection.
    async fn search_for_login(&self, key: LoginKey, value: &str) -> Result<UserCredentials, RepositoryError>;

    async fn read_all(&self) -> Result<Vec<User>, RepositoryError>;

    async fn read_by_id(&self, id: &str) -> Result<User, RepositoryError>;

    async fn create(&self, input: UserCreate) -> Result<User, RepositoryError>;

    async fn update(&self, id: &str, input: UserUpdate) -> Result<User, RepositoryError>;

    /// Returns the row as it was just before removal.
    async fn delete(&self, id: &str) -> Result<User, RepositoryError>;

    /// Storage liveness probe for `/health`.
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

pub(crate) fn login_not_found(key: LoginKey) -> RepositoryError {
    RepositoryError::not_found(format!("Invalid {} or password", key))
}
