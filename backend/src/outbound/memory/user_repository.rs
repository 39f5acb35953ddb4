//! In-memory `UserRepository`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{User, UserId, Username};

#[derive(Debug, Default)]
struct UserTable {
    records: HashMap<UserId, User>,
    usernames: HashMap<String, UserId>,
}

/// User store backed by a process-local map.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    table: RwLock<UserTable>,
}

impl MemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.table.read().await.records.len()
    }

    /// Whether no users are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut table = self.table.write().await;
        if table.usernames.contains_key(user.username.as_ref()) {
            return Err(UserRepositoryError::duplicate_username(user.username.as_ref()));
        }
        if table.records.contains_key(&user.id) {
            return Err(UserRepositoryError::query(format!("duplicate user id {}", user.id)));
        }
        table
            .usernames
            .insert(user.username.as_ref().to_owned(), user.id);
        table.records.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.table.read().await.records.get(id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        let table = self.table.read().await;
        Ok(table
            .usernames
            .get(username.as_ref())
            .and_then(|id| table.records.get(id))
            .cloned())
    }

    async fn save(&self, user: &User, expected_revision: u32) -> Result<(), UserRepositoryError> {
        let mut table = self.table.write().await;
        let Some(stored) = table.records.get(&user.id) else {
            return Err(UserRepositoryError::missing(user.id.to_string()));
        };
        if stored.revision != expected_revision {
            return Err(UserRepositoryError::revision_mismatch(
                expected_revision,
                stored.revision,
            ));
        }
        let previous = stored.username.as_ref().to_owned();
        if previous != user.username.as_ref() {
            if table.usernames.contains_key(user.username.as_ref()) {
                return Err(UserRepositoryError::duplicate_username(user.username.as_ref()));
            }
            table.usernames.remove(&previous);
            table
                .usernames
                .insert(user.username.as_ref().to_owned(), user.id);
        }
        table.records.insert(user.id, user.clone());
        Ok(())
    }
}
