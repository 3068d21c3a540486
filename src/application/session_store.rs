use crate::domain::error::{AuthError, GatewayError};
use crate::domain::gateway::{AuthGateway, SessionStorage};
use crate::domain::session::Session;
use crate::domain::user::{CreateUser, LoginRequest};
use tracing::{error, info, instrument, warn};

/// Holds the current user identity and keeps durable storage in step with it.
///
/// At most one session exists at a time. A persisted session is trusted as-is
/// on construction; it is never checked against the server.
pub struct SessionStore<A: AuthGateway, S: SessionStorage> {
    gateway: A,
    storage: S,
    current: Option<Session>,
    last_error: Option<String>,
}

impl<A: AuthGateway, S: SessionStorage> SessionStore<A, S> {
    pub fn new(gateway: A, storage: S) -> Self {
        let current = match storage.load() {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable persisted session");
                None
            }
        };
        if let Some(session) = &current {
            info!(user_id = %session.id, username = %session.username, "Restored persisted session");
        }
        Self {
            gateway,
            storage,
            current,
            last_error: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Message of the last failed login or registration.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[instrument(skip(self, password))]
    pub async fn login(&mut self, username: &str, password: &str) -> Result<&Session, AuthError> {
        self.last_error = None;
        let credentials = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let result = self.gateway.login(&credentials).await;
        self.complete(result, "Login failed")
    }

    /// Registration logs the new user in.
    #[instrument(skip(self, password))]
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<&Session, AuthError> {
        self.last_error = None;
        let request = CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let result = self.gateway.register(&request).await;
        self.complete(result, "Registration failed")
    }

    #[instrument(skip(self))]
    pub fn logout(&mut self) {
        if let Some(session) = self.current.take() {
            info!(user_id = %session.id, "Session ended");
        }
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "Failed to remove persisted session");
        }
    }

    fn complete(
        &mut self,
        result: Result<Session, GatewayError>,
        fallback: &str,
    ) -> Result<&Session, AuthError> {
        match result {
            Ok(session) => {
                if let Err(e) = self.storage.save(&session) {
                    error!(user_id = %session.id, error = %e, "Failed to persist session");
                }
                info!(user_id = %session.id, username = %session.username, "Session started");
                Ok(self.current.insert(session))
            }
            Err(e) => {
                let err = match e {
                    GatewayError::Status { message, .. } => AuthError::Authentication(
                        message.unwrap_or_else(|| fallback.to_string()),
                    ),
                    other => AuthError::Gateway(other),
                };
                warn!(error = %err, "Authentication failed");
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
