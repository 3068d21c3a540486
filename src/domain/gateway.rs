//! Client-side seams to the remote API and to durable session storage.

use crate::domain::error::{GatewayError, StorageError};
use crate::domain::models::{FinancialRecord, NewRecord, RecordPatch};
use crate::domain::session::Session;
use crate::domain::user::{CreateUser, LoginRequest};
use async_trait::async_trait;

#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, credentials: &LoginRequest) -> Result<Session, GatewayError>;
    async fn register(&self, request: &CreateUser) -> Result<Session, GatewayError>;
}

#[async_trait]
pub trait RecordGateway: Send + Sync {
    /// Raw list body. The caller decides what to do when it is not an array.
    async fn fetch_all(&self, owner_id: &str) -> Result<serde_json::Value, GatewayError>;
    async fn create(&self, record: &NewRecord) -> Result<FinancialRecord, GatewayError>;
    async fn update(&self, id: &str, patch: &RecordPatch) -> Result<RecordPatch, GatewayError>;
    async fn delete(&self, id: &str) -> Result<(), GatewayError>;
}

/// Durable home of the current session.
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<Session>, StorageError>;
    fn save(&self, session: &Session) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}
