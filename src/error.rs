//! Error types for the dashboard client
//!
//! Uses thiserror for ergonomic error definitions.
//! None of these ever escape `ApiClient::call`: transport and decode failures
//! are logged and turned into "no update this cycle".

use thiserror::Error;

/// Custom Result type using our Error
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Dashboard client errors
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session storage errors
    #[error("Session error: {0}")]
    Session(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Backend rejected the bearer token
    #[error("Unauthorized: session expired or revoked")]
    Unauthorized,

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Client-side input validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        DashboardError::Http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DashboardError::Validation("OTP too short".into());
        assert!(err.to_string().contains("OTP too short"));
        assert!(DashboardError::Unauthorized.to_string().contains("Unauthorized"));
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: DashboardError = json_err.into();
        assert!(matches!(err, DashboardError::Json(_)));
    }
}
