//! Unified error handling for scalr-core
//!
//! Every remote call returns [`ScalrError`]. The classifier helpers let
//! callers branch on the kind of failure without matching on variants.
//!
//! # Example
//!
//! ```rust
//! use scalr_core::ScalrError;
//!
//! fn handle_error(err: ScalrError) {
//!     if err.is_not_found() {
//!         println!("Resource not found");
//!     } else if err.is_validation() {
//!         println!("Rejected by the service: {err}");
//!     }
//! }
//!
//! let err = ScalrError::from_status(404, "workspace not found".to_string(), Vec::new());
//! assert!(err.is_not_found());
//! ```

use std::time::Duration;
use thiserror::Error;

/// Core error type for Scalr API calls
#[derive(Error, Debug)]
pub enum ScalrError {
    /// Client could not be constructed from the given configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport or network failure before a response was received
    #[error("Request failed: {message}")]
    Request { message: String },

    /// The requested resource does not exist (404)
    #[error("Resource not found: {message}")]
    NotFound { message: String },

    /// The service rejected the supplied fields (400/422)
    #[error("Validation failed: {message}")]
    Validation {
        status: u16,
        message: String,
        details: Vec<String>,
    },

    /// Missing or insufficient credentials (401/403)
    #[error("Unauthorized: {message}")]
    Unauthorized { status: u16, message: String },

    /// Any other non-success response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The call's context deadline passed before the response arrived
    #[error("Deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    /// The call's context was cancelled
    #[error("Request cancelled")]
    Cancelled,

    /// Identifier is empty or contains characters outside `[A-Za-z0-9._-]`
    #[error("Invalid {kind} ID: {id:?}")]
    InvalidId { kind: &'static str, id: String },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, ScalrError>;

impl ScalrError {
    /// Map a non-success HTTP status and its decoded error details to an error
    pub fn from_status(status: u16, message: String, details: Vec<String>) -> Self {
        match status {
            404 => ScalrError::NotFound { message },
            400 | 422 => ScalrError::Validation {
                status,
                message,
                details,
            },
            401 | 403 => ScalrError::Unauthorized { status, message },
            _ => ScalrError::Api { status, message },
        }
    }

    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScalrError::NotFound { .. })
    }

    /// Returns true if the service rejected the request's fields, or the id was malformed
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ScalrError::Validation { .. } | ScalrError::InvalidId { .. }
        )
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ScalrError::Unauthorized { .. })
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, ScalrError::Api { status, .. } if *status >= 500)
    }

    /// Returns true if the call ran out of time
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScalrError::DeadlineExceeded(_))
    }

    /// Returns true if the failure happened before any response was received
    #[must_use]
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            ScalrError::Request { .. } | ScalrError::DeadlineExceeded(_) | ScalrError::Cancelled
        )
    }

    /// HTTP status of the response that produced this error, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ScalrError::NotFound { .. } => Some(404),
            ScalrError::Validation { status, .. }
            | ScalrError::Unauthorized { status, .. }
            | ScalrError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ScalrError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ScalrError::Decode(err.to_string())
        } else {
            ScalrError::Request {
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ScalrError {
    fn from(err: serde_json::Error) -> Self {
        ScalrError::Decode(err.to_string())
    }
}
