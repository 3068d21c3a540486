use crate::domain::repository::{UserConflict, UserRepository};
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Clone)]
pub struct InMemoryUserRepository {
    storage: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn find_by<F>(&self, predicate: F) -> Option<User>
    where
        F: Fn(&User) -> bool,
    {
        trace!("Acquiring read lock for user storage");
        let storage = self.storage.read().await;
        storage.values().find(|u| predicate(u)).cloned()
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self), fields(user_id = %user.id, username = %user.username))]
    async fn insert_user(&self, user: User) -> Result<Option<UserConflict>> {
        trace!("Acquiring write lock for user storage");
        let mut storage = self.storage.write().await;

        let conflict = storage.values().find_map(|existing| {
            if existing.username == user.username {
                Some(UserConflict::Username)
            } else if existing.email == user.email {
                Some(UserConflict::Email)
            } else {
                None
            }
        });
        if let Some(conflict) = conflict {
            debug!(?conflict, "User not saved, field already taken");
            return Ok(Some(conflict));
        }

        debug!(
            user_id = %user.id,
            username = %user.username,
            "User saved to memory storage"
        );
        storage.insert(user.id.clone(), user);
        Ok(None)
    }

    #[instrument(skip(self))]
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = self.find_by(|u| u.username == username).await;
        match &user {
            Some(u) => debug!(user_id = %u.id, "User found by username"),
            None => trace!(username, "User not found in storage"),
        }
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self.find_by(|u| u.email == email).await;
        match &user {
            Some(u) => debug!(user_id = %u.id, "User found by email"),
            None => trace!(email, "User not found in storage"),
        }
        Ok(user)
    }
}
