use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::database::models::user::{LoginKey, User, UserCreate, UserCredentials, UserFilter, UserUpdate};
use crate::database::repository::{login_not_found, RepositoryError, UserRepository};

/// [`UserRepository`] kept in process memory, ordered by id.
///
/// Used when no `DATABASE_URL` is configured. Enforces the same uniqueness
/// rules as the `users` table (primary key on `id`, unique `email`).
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<BTreeMap<String, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        debug!("Instantiated user repository (memory)");
        Self::default()
    }

    fn email_taken(users: &BTreeMap<String, User>, email: &str, except_id: Option<&str>) -> bool {
        users
            .values()
            .any(|u| u.email == email && Some(u.id.as_str()) != except_id)
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_field(&self, filter: &UserFilter) -> Result<Vec<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.values().filter(|u| filter.matches(u)).cloned().collect())
    }

    async fn search_for_login(&self, key: LoginKey, value: &str) -> Result<UserCredentials, RepositoryError> {
        let filter = key.filter(value);
        let users = self.users.read().await;
        users
            .values()
            .find(|u| filter.matches(u))
            .map(UserCredentials::from)
            .ok_or_else(|| login_not_found(key))
    }

    async fn read_all(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn read_by_id(&self, id: &str) -> Result<User, RepositoryError> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::user_not_found(id))
    }

    async fn create(&self, input: UserCreate) -> Result<User, RepositoryError> {
        let user = input.into_new_user()?;
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(RepositoryError::Constraint("users_pkey".to_string()));
        }
        if Self::email_taken(&users, &user.email, None) {
            return Err(RepositoryError::Constraint("users_email_key".to_string()));
        }
        debug!("create user {}", user.id);
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn update(&self, id: &str, input: UserUpdate) -> Result<User, RepositoryError> {
        let patch = input.into_patch()?;
        let mut users = self.users.write().await;
        if !users.contains_key(id) {
            return Err(RepositoryError::user_not_found(id));
        }
        if let Some(email) = &patch.email {
            if Self::email_taken(&users, email, Some(id)) {
                return Err(RepositoryError::Constraint("users_email_key".to_string()));
            }
        }
        let user = users
            .get_mut(id)
            .ok_or_else(|| RepositoryError::user_not_found(id))?;
        patch.apply_to(user);
        Ok(user.clone())
    }

    async fn delete(&self, id: &str) -> Result<User, RepositoryError> {
        debug!("delete user {}", id);
        self.users
            .write()
            .await
            .remove(id)
            .ok_or_else(|| RepositoryError::user_not_found(id))
    }
}
