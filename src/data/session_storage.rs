//! Durable storage for the current session.
//!
//! [`FileSessionStorage`] keeps the identity as a single JSON file, so a
//! restart restores the session without logging in again. Nothing checks
//! whether the stored identity is still valid on the server.

use crate::domain::error::StorageError;
use crate::domain::gateway::SessionStorage;
use crate::domain::session::Session;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

#[derive(Clone, Debug)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileSessionStorage {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Option<Session>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session = serde_json::from_str(&content)?;
        debug!("Persisted session loaded");
        Ok(Some(session))
    }

    #[instrument(skip(self, session), fields(path = %self.path.display(), user_id = %session.id))]
    fn save(&self, session: &Session) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec(session)?)?;
        debug!("Session persisted");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local storage, handy for tests and embedding.
#[derive(Clone, Debug, Default)]
pub struct InMemorySessionStorage {
    slot: Arc<Mutex<Option<Session>>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(session))),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.slot.lock().map(|s| s.clone()).unwrap_or(None)
    }
}

impl SessionStorage for InMemorySessionStorage {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        Ok(self.current())
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(session.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
        Ok(())
    }
}
