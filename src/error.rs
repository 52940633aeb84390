//! Error types for the ServiceHub client.
//!
//! `BackendError` is the raw failure coming back from the hosted backend.
//! `ServiceError` is what the facade hands to presentation code: every raw
//! error is converted into one of its variants before it leaves the crate.

use crate::cache::QueryError;
use crate::domain::ValidationError;
use crate::notifications::{MSG_DELETE_FAILED, MSG_LOAD_FAILED, MSG_SAVE_FAILED};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when talking to the hosted backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Backend returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse JSON response
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Network timeout
    #[error("Request timeout")]
    Timeout,

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Missing or rejected session
    #[error("Authentication failed")]
    Unauthorized,

    /// Row-level policy denied the operation
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Generic backend error with context
    #[error("Backend error: {0}")]
    Other(String),
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is missing
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    /// Environment variable has invalid value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

/// The persistence operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistAction {
    Create,
    Update,
    Delete,
}

impl fmt::Display for PersistAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Errors surfaced by the catalog facade and the form workflow.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Rejected before any network call
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Blob storage write failed
    #[error("Image upload failed: {0}")]
    Upload(#[source] BackendError),

    /// Insert, update or delete failed
    #[error("Failed to {action} service: {source}")]
    Persistence {
        action: PersistAction,
        #[source]
        source: BackendError,
    },

    /// Read failed
    #[error("Failed to load services: {0}")]
    Fetch(QueryError),
}

impl ServiceError {
    /// Fixed, human-readable text for this failure.
    ///
    /// Raw backend errors never appear here; they are only logged.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Upload(_) => MSG_SAVE_FAILED.to_string(),
            Self::Persistence {
                action: PersistAction::Delete,
                ..
            } => MSG_DELETE_FAILED.to_string(),
            Self::Persistence { .. } => MSG_SAVE_FAILED.to_string(),
            Self::Fetch(_) => MSG_LOAD_FAILED.to_string(),
        }
    }

    /// Whether the failure was detected before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Convenience type alias for Results with BackendError
pub type BackendResult<T> = Result<T, BackendError>;

/// Convenience type alias for Results with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Convenience type alias for Results with ServiceError
pub type ServiceResult<T> = Result<T, ServiceError>;
