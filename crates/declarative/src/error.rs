//! Error types for reconciliation.
//!
//! Errors are categorized so callers can tell a bad configuration from a
//! missing remote object, an ordinary remote failure, and the one failure
//! that leaves an entity destroyed.

use crate::types::Operation;
use crate::validation::ValidationError;
use std::fmt;
use thiserror::Error;

/// Categories of reconciliation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Desired configuration violates a static constraint
    Validation,
    /// Remote object does not exist
    NotFound,
    /// Remote API rejected or failed the call
    Remote,
    /// Entity was deleted but could not be recreated
    Fatal,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Validation => "Invalid configuration",
            Self::NotFound => "Remote object not found",
            Self::Remote => "Remote API error",
            Self::Fatal => "Entity lost during replace",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Validation => "Correct the configuration and run again",
            Self::NotFound => "Check the identifier or remove it from state",
            Self::Remote => "Check the error details returned by the remote service",
            Self::Fatal => {
                "The old object was deleted; apply again to recreate it and alert an operator"
            }
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while reconciling a resource.
#[derive(Debug, Error)]
pub enum Error {
    /// Desired state failed validation; raised before any remote call
    #[error("invalid {resource_type} '{id}': {source}")]
    Validation {
        resource_type: &'static str,
        id: String,
        #[source]
        source: ValidationError,
    },

    /// Remote object does not exist
    #[error("{resource_type} '{id}' not found")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Remote call failed; message is the service's response, unmodified
    #[error("failed to {operation} {resource_type} '{id}'{}: {message}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Remote {
        operation: Operation,
        resource_type: &'static str,
        id: String,
        status: Option<u16>,
        message: String,
    },

    /// Delete succeeded but the follow-up create failed
    #[error("{resource_type} '{id}' was deleted but could not be recreated: {source}")]
    ReplaceFailure {
        resource_type: &'static str,
        id: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Validation { .. } => ErrorCategory::Validation,
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Remote { .. } => ErrorCategory::Remote,
            Error::ReplaceFailure { .. } => ErrorCategory::Fatal,
        }
    }

    /// Whether the entity may now be missing remotely.
    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Fatal
    }

    /// Whether this error means the remote object does not exist.
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }
}

/// Result type for reconciliation.
pub type Result<T> = std::result::Result<T, Error>;
