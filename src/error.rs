// Error types for the signdesk console.
// Covers transport failures, server-reported errors and local storage errors.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{detail} (HTTP {status})")]
    Api { status: StatusCode, detail: String },

    #[error("{0}")]
    Rejected(String),

    #[error("Server response had no data for {0}")]
    MissingData(String),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl ConsoleError {
    /// True when the server rejected the stored credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ConsoleError::Unauthorized(_) | ConsoleError::NotLoggedIn)
    }

    /// Message suitable for a user-facing notification.
    ///
    /// Server-provided details are shown verbatim; transport errors fall back
    /// to the underlying reqwest message.
    pub fn user_message(&self) -> String {
        match self {
            ConsoleError::Unauthorized(detail)
            | ConsoleError::NotFound(detail)
            | ConsoleError::Rejected(detail) => detail.clone(),
            ConsoleError::Api { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_detection() {
        assert!(ConsoleError::Unauthorized("expired".into()).is_unauthorized());
        assert!(ConsoleError::NotLoggedIn.is_unauthorized());
        assert!(!ConsoleError::NotFound("x".into()).is_unauthorized());
    }

    #[test]
    fn test_user_message_prefers_server_detail() {
        let err = ConsoleError::Api {
            status: StatusCode::BAD_REQUEST,
            detail: "Account is disabled".into(),
        };
        assert_eq!(err.user_message(), "Account is disabled");
        assert_eq!(err.to_string(), "Account is disabled (HTTP 400 Bad Request)");
    }
}
