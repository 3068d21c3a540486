use thiserror::Error;

/// Errors raised by the server-side services.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure talking to the remote API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Server responded with status {status}")]
    Status { status: u16, message: Option<String> },
    #[error("Could not decode response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// The `error` field the server put in a non-2xx body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            GatewayError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    /// Rejected by the server. Carries the message meant for inline display.
    #[error("{0}")]
    Authentication(String),
    #[error(transparent)]
    Gateway(GatewayError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("No user is logged in")]
    NoOwner,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("Malformed record list: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Session storage holds invalid data: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_only_for_status_errors() {
        let err = GatewayError::Status {
            status: 401,
            message: Some("Invalid username or password".to_string()),
        };
        assert_eq!(err.server_message(), Some("Invalid username or password"));

        let err = GatewayError::Transport("connection refused".to_string());
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn test_authentication_error_displays_bare_message() {
        let err = AuthError::Authentication("User already exists".to_string());
        assert_eq!(err.to_string(), "User already exists");
    }
}
