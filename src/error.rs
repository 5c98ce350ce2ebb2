//! Error types for Amity
//!
//! This module defines the error types used throughout the client,
//! using `thiserror` for ergonomic error handling.
//!
//! Internal plumbing returns [`Result`] (an `anyhow` alias) carrying an
//! [`AmityError`]. The session state machine converts those into
//! [`AuthFailure`] values at its public boundary so that callers always
//! receive a discriminated success/failure result with a readable message.

use thiserror::Error;

/// Message shown for transport failures; the underlying cause is only logged.
pub const NETWORK_FAILURE_MESSAGE: &str =
    "Network error. Please check your connection and try again.";

/// Main error type for Amity operations
#[derive(Error, Debug)]
pub enum AmityError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rejected before any network call (malformed email, bad code)
    #[error("{0}")]
    Validation(String),

    /// Operation invoked in a session step that lacks its inputs
    #[error("{0}")]
    InvalidState(String),

    /// The gateway answered with a non-success status
    #[error("{message}")]
    Gateway {
        /// HTTP status code returned by the gateway
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// The bearer credential was rejected (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Transport-level failure (connect, timeout, malformed response)
    #[error("Network error: {0}")]
    Network(String),

    /// Session snapshot storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Amity operations
///
/// Uses `anyhow::Error` so that context can be attached while the typed
/// [`AmityError`] stays recoverable through `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;

/// Category of a failed session operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Rejected client-side before any network call
    Validation,
    /// The operation is not available in the current session step
    InvalidState,
    /// The gateway rejected the request; the message is the server's
    Gateway,
    /// The request never produced a usable response
    Network,
}

/// Failure value returned by every session operation.
///
/// The `message` is meant to be shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AuthFailure {
    /// What went wrong
    pub kind: FailureKind,
    /// Human-readable reason
    pub message: String,
}

impl AuthFailure {
    /// Builds a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Validation,
            message: message.into(),
        }
    }

    /// Builds an invalid-state failure.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::InvalidState,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for AuthFailure {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<AmityError>() {
            Some(AmityError::Validation(msg)) => Self::validation(msg.clone()),
            Some(AmityError::InvalidState(msg)) => Self::invalid_state(msg.clone()),
            Some(AmityError::Gateway { message, .. }) | Some(AmityError::Unauthorized(message)) => {
                Self {
                    kind: FailureKind::Gateway,
                    message: message.clone(),
                }
            }
            _ => {
                tracing::debug!("Operation failed: {:#}", err);
                Self {
                    kind: FailureKind::Network,
                    message: NETWORK_FAILURE_MESSAGE.to_string(),
                }
            }
        }
    }
}

impl From<AmityError> for AuthFailure {
    fn from(err: AmityError) -> Self {
        anyhow::Error::from(err).into()
    }
}

/// Result of a public session operation.
pub type Outcome<T = ()> = std::result::Result<T, AuthFailure>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = AmityError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_gateway_error_display_is_verbatim() {
        let error = AmityError::Gateway {
            status: 400,
            message: "Invalid or expired code".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid or expired code");
    }

    #[test]
    fn test_validation_error_display_is_verbatim() {
        let error = AmityError::Validation("Invalid email format".to_string());
        assert_eq!(error.to_string(), "Invalid email format");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: AmityError = io_error.into();
        assert!(matches!(error, AmityError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: AmityError = json_error.into();
        assert!(matches!(error, AmityError::Serialization(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AmityError>();
    }

    #[test]
    fn test_failure_from_validation_error() {
        let err: anyhow::Error = AmityError::Validation("Code must be 6 digits".into()).into();
        let failure = AuthFailure::from(err);
        assert_eq!(failure.kind, FailureKind::Validation);
        assert_eq!(failure.message, "Code must be 6 digits");
    }

    #[test]
    fn test_failure_from_gateway_error_keeps_server_message() {
        let err: anyhow::Error = AmityError::Gateway {
            status: 422,
            message: "Code expired".into(),
        }
        .into();
        let failure = AuthFailure::from(err);
        assert_eq!(failure.kind, FailureKind::Gateway);
        assert_eq!(failure.message, "Code expired");
    }

    #[test]
    fn test_failure_from_network_error_is_generic() {
        let err: anyhow::Error = AmityError::Network("connection refused".into()).into();
        let failure = AuthFailure::from(err);
        assert_eq!(failure.kind, FailureKind::Network);
        assert_eq!(failure.message, NETWORK_FAILURE_MESSAGE);
    }

    #[test]
    fn test_failure_from_untyped_error_is_network() {
        let failure = AuthFailure::from(anyhow::anyhow!("boom"));
        assert_eq!(failure.kind, FailureKind::Network);
    }
}
