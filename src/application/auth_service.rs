use crate::domain::error::DomainError;
use crate::domain::repository::{UserConflict, UserRepository};
use crate::domain::session::Session;
use crate::domain::user::{CreateUser, LoginRequest, User};
use crate::infrastructure::security::{hash_password, verify_password};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};
use uuid::Uuid;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

fn conflict_error(conflict: UserConflict) -> DomainError {
    let message = match conflict {
        UserConflict::Username => "Username already exists",
        UserConflict::Email => "User with this email already exists",
    };
    DomainError::Validation(message.to_string())
}

pub struct AuthService<R: UserRepository> {
    user_repository: Arc<R>,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(user_repository: Arc<R>) -> Self {
        Self { user_repository }
    }

    #[instrument(skip(self, req), fields(username = %req.username, email = %req.email))]
    pub async fn register_user(&self, req: CreateUser) -> Result<Session> {
        trace!("Starting user registration");

        if req.username.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty()
        {
            return Err(DomainError::Validation(
                "Username, email and password are required".to_string(),
            )
            .into());
        }

        if self
            .user_repository
            .find_user_by_username(&req.username)
            .await?
            .is_some()
        {
            warn!(username = %req.username, "Username already taken");
            return Err(conflict_error(UserConflict::Username).into());
        }

        if self
            .user_repository
            .find_user_by_email(&req.email)
            .await?
            .is_some()
        {
            warn!(email = %req.email, "Email already registered");
            return Err(conflict_error(UserConflict::Email).into());
        }

        let password_hash = hash_password(&req.password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal(format!("Failed to hash password: {}", e))
        })?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: req.username,
            email: req.email,
            password_hash,
        };

        // A concurrent registration may have claimed the name while hashing.
        debug!(user_id = %user.id, "Saving user to repository");
        if let Some(conflict) = self.user_repository.insert_user(user.clone()).await? {
            warn!(?conflict, "Registration lost a race for the same identity");
            return Err(conflict_error(conflict).into());
        }

        info!(user_id = %user.id, username = %user.username, "User registered successfully");
        Ok(user.session())
    }

    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn login(&self, req: LoginRequest) -> Result<Session> {
        trace!("Starting login");

        let user = self
            .user_repository
            .find_user_by_username(&req.username)
            .await?
            .ok_or_else(|| {
                warn!(username = %req.username, "User not found during login");
                DomainError::Unauthorized(INVALID_CREDENTIALS.to_string())
            })?;

        let is_valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
            error!(error = %e, "Failed to verify password");
            DomainError::Internal(format!("Failed to verify password: {}", e))
        })?;

        if !is_valid {
            warn!(user_id = %user.id, "Invalid password during login");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()).into());
        }

        info!(user_id = %user.id, username = %user.username, "Login successful");
        Ok(user.session())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::user_repository::InMemoryUserRepository;

    fn service() -> AuthService<InMemoryUserRepository> {
        AuthService::new(Arc::new(InMemoryUserRepository::new()))
    }

    fn create(username: &str, email: &str) -> CreateUser {
        CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
        }
    }

    fn domain_error(err: &anyhow::Error) -> &DomainError {
        err.downcast_ref::<DomainError>().unwrap()
    }

    #[tokio::test]
    async fn test_register_then_login_returns_same_identity() {
        let service = service();
        let registered = service
            .register_user(create("alice", "alice@example.com"))
            .await
            .unwrap();

        let logged_in = service
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(registered, logged_in);
        assert_eq!(logged_in.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_username_and_email() {
        let service = service();
        service
            .register_user(create("alice", "alice@example.com"))
            .await
            .unwrap();

        let err = service
            .register_user(create("alice", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(domain_error(&err), DomainError::Validation(_)));

        let err = service
            .register_user(create("alice2", "alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(domain_error(&err), DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_register_requires_all_fields() {
        let err = service()
            .register_user(create("", "alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(domain_error(&err), DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_login_rejects_unknown_user_and_wrong_password() {
        let service = service();
        service
            .register_user(create("alice", "alice@example.com"))
            .await
            .unwrap();

        for (username, password) in [("bob", "password123"), ("alice", "wrong")] {
            let err = service
                .login(LoginRequest {
                    username: username.to_string(),
                    password: password.to_string(),
                })
                .await
                .unwrap_err();
            match domain_error(&err) {
                DomainError::Unauthorized(msg) => assert_eq!(msg, INVALID_CREDENTIALS),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_of_same_username_keep_one() {
        let service = Arc::new(service());

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    service
                        .register_user(create("alice", &format!("alice{i}@example.com")))
                        .await
                })
            })
            .collect();

        let mut registered = Vec::new();
        for handle in handles {
            if let Ok(session) = handle.await.unwrap() {
                registered.push(session);
            }
        }
        assert_eq!(registered.len(), 1);

        let login = service
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login, registered[0]);
    }
}
