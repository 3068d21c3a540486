use crate::domain::models::{FinancialRecord, RecordPatch};
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;

/// Field that already belongs to another user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserConflict {
    Username,
    Email,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores `user` unless its username or email is taken. The check and
    /// the insert happen under one lock; a conflict is returned instead of
    /// inserting.
    async fn insert_user(&self, user: User) -> Result<Option<UserConflict>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait RecordRepository: Send + Sync {
    async fn save(&self, record: FinancialRecord) -> Result<()>;
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<FinancialRecord>>;
    /// Applies `patch` to an existing record in place. `None` if there is no
    /// record with that id; nothing is inserted.
    async fn update(&self, id: &str, patch: &RecordPatch) -> Result<Option<FinancialRecord>>;
    async fn delete(&self, id: &str) -> Result<Option<FinancialRecord>>;
}
