//! Error types for platform API operations.
//!
//! These are transport-level errors. They are categorized to drive the
//! client's retry logic and are converted into [`declarative::Error`]
//! (with operation and group name attached) at the provider boundary.

use declarative::Operation;
use std::fmt;

/// Result type alias for platform API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of platform API errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection failures, timeouts, 5xx and 429 responses (transient, retryable).
    Network,
    /// The requested object does not exist (404).
    NotFound,
    /// The service rejected the request (other 4xx).
    Client,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::NotFound => "Not found",
            Self::Client => "Request rejected by the platform",
            Self::Other => "Unexpected error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur talking to the platform API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message, the response body when there is one.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// Invalid response from API.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// Client misconfiguration (missing URL or token).
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl Error {
    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Http {
            message: message.into(),
            status,
        }
    }

    /// HTTP status code, if the error came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            _ => None,
        }
    }

    /// Get the error category for retry logic.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Http { status: None, .. } => ErrorCategory::Network,
            Error::Http {
                status: Some(404), ..
            } => ErrorCategory::NotFound,
            Error::Http {
                status: Some(429), ..
            } => ErrorCategory::Network,
            Error::Http {
                status: Some(code), ..
            } if *code >= 500 => ErrorCategory::Network,
            Error::Http { .. } => ErrorCategory::Client,
            Error::InvalidResponse(_) | Error::Config(_) => ErrorCategory::Other,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Attach the operation and group name, producing a reconciliation error.
    ///
    /// 404 becomes [`declarative::Error::NotFound`]; everything else keeps the
    /// service's message verbatim in [`declarative::Error::Remote`].
    pub fn into_remote(self, operation: Operation, name: &str) -> declarative::Error {
        if self.category() == ErrorCategory::NotFound {
            return declarative::Error::NotFound {
                resource_type: "group",
                id: name.to_string(),
            };
        }

        let status = self.status();
        let message = match self {
            Error::Http { message, .. } => message,
            other => other.to_string(),
        };
        declarative::Error::Remote {
            operation,
            resource_type: "group",
            id: name.to_string(),
            status,
            message,
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Http {
                message: format!("HTTP {}", code),
                status: Some(code),
            },
            other => Self::Http {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
