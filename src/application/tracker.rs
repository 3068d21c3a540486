use crate::application::record_store::RecordStore;
use crate::application::session_store::SessionStore;
use crate::application::summary::Summary;
use crate::data::http_gateway::HttpGateway;
use crate::domain::error::{AuthError, RecordError};
use crate::domain::gateway::{AuthGateway, RecordGateway, SessionStorage};
use crate::domain::models::{FinancialRecord, RecordDraft, RecordPatch};
use crate::domain::session::Session;
use tracing::{debug, instrument};

/// Client state for one user of the finance API.
///
/// Owns the session and record stores and keeps the record store following
/// the session: every login or registration refetches, logout goes idle.
pub struct FinanceTracker<A: AuthGateway, R: RecordGateway, S: SessionStorage> {
    session: SessionStore<A, S>,
    records: RecordStore<R>,
}

impl<A: AuthGateway, R: RecordGateway, S: SessionStorage> FinanceTracker<A, R, S> {
    /// Restores a persisted session, if any. Call [`start`](Self::start) to
    /// load its records.
    pub fn new(auth: A, records: R, storage: S) -> Self {
        Self {
            session: SessionStore::new(auth, storage),
            records: RecordStore::new(records),
        }
    }

    pub async fn start(&mut self) -> Result<(), RecordError> {
        let session = self.session.session().cloned();
        self.records.sync_owner(session.as_ref()).await
    }

    #[instrument(skip(self, password))]
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Session, AuthError> {
        let session = self.session.login(username, password).await?.clone();
        self.follow(&session).await;
        Ok(session)
    }

    #[instrument(skip(self, password))]
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let session = self
            .session
            .register(username, email, password)
            .await?
            .clone();
        self.follow(&session).await;
        Ok(session)
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.records.reset();
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.session()
    }

    pub fn last_auth_error(&self) -> Option<&str> {
        self.session.last_error()
    }

    pub fn records(&self) -> &[FinancialRecord] {
        self.records.records()
    }

    pub fn record_store(&self) -> &RecordStore<R> {
        &self.records
    }

    /// Adds a record for the logged-in user.
    pub async fn add_record(&mut self, draft: RecordDraft) -> Result<&FinancialRecord, RecordError> {
        self.records.add_record(draft).await
    }

    pub async fn update_record(&mut self, id: &str, patch: RecordPatch) -> Result<(), RecordError> {
        self.records.update_record(id, patch).await
    }

    pub async fn delete_record(&mut self, id: &str) -> Result<(), RecordError> {
        self.records.delete_record(id).await
    }

    pub fn summary(&self) -> Summary {
        self.records.summary()
    }

    async fn follow(&mut self, session: &Session) {
        // Fetching is fail-soft; the store has already logged and emptied itself.
        if let Err(e) = self.records.sync_owner(Some(session)).await {
            debug!(error = %e, "Record list unavailable for new session");
        }
    }
}

impl<S: SessionStorage> FinanceTracker<HttpGateway, HttpGateway, S> {
    pub fn over_http(gateway: HttpGateway, storage: S) -> Self {
        Self::new(gateway.clone(), gateway, storage)
    }
}
