use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserKey;
use crate::domain::user::models::UserPatch;
use crate::domain::user::ports::UserDirectory;
use crate::user::errors::DirectoryError;

/// Process-local directory backed by a map.
///
/// Used for tests and the `memory` backend. Email uniqueness is re-checked
/// under the write lock, so concurrent registrations cannot both claim an
/// address.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserKey, User>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

fn holds_email(user: &User, email: &EmailAddress, excluding: Option<&UserKey>) -> bool {
    user.email == email.as_str() && excluding.map_or(true, |key| user.key() != *key)
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get(&self, key: &UserKey) -> Result<Option<User>, DirectoryError> {
        Ok(self.users.read().await.get(key).cloned())
    }

    async fn get_by_email(&self, email: &EmailAddress) -> Result<Option<User>, DirectoryError> {
        let users = self.users.read().await;

        // Oldest record wins if duplicates ever slipped in
        Ok(users
            .values()
            .filter(|user| user.email == email.as_str())
            .min_by_key(|user| user.created_at)
            .cloned())
    }

    async fn upsert(&self, patch: UserPatch) -> Result<User, DirectoryError> {
        let key = patch.key();
        let mut users = self.users.write().await;

        if let Some(email) = &patch.email {
            if users
                .values()
                .any(|user| holds_email(user, email, Some(&key)))
            {
                return Err(DirectoryError::EmailConflict);
            }
        }

        let user = patch.apply_to(users.get(&key).cloned());
        users.insert(key, user.clone());

        Ok(user)
    }

    async fn exists_by_email(
        &self,
        email: &EmailAddress,
        excluding: Option<UserKey>,
    ) -> Result<bool, DirectoryError> {
        let users = self.users.read().await;

        Ok(users
            .values()
            .any(|user| holds_email(user, email, excluding.as_ref())))
    }

    async fn delete(&self, key: &UserKey) -> Result<(), DirectoryError> {
        self.users.write().await.remove(key);
        Ok(())
    }
}
