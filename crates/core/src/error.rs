//! Error types for KB Query.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! request validation, the remote retrieval provider, rendering and
//! serialization failures.

use std::fmt;

use thiserror::Error;

/// Category of a failure at the remote retrieval provider boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Connection refused, DNS failure, reset, ...
    Network,
    /// The provider rejected the credential (401/403).
    Authentication,
    /// The call did not complete within the configured deadline.
    Timeout,
    /// Any other non-success HTTP status.
    Status,
    /// The response body did not have the expected shape.
    MalformedResponse,
}

impl ProviderErrorKind {
    /// Stable machine-readable code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Authentication => "authentication",
            Self::Timeout => "timeout",
            Self::Status => "status",
            Self::MalformedResponse => "malformed_response",
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for KB Query.
///
/// All library functions return `Result<T, AppError>`.
/// We never panic; errors are represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The caller supplied an unusable question or override
    #[error("Validation error: {0}")]
    Validation(String),

    /// The remote retrieval provider failed
    #[error("Provider error ({kind}): {message}")]
    Provider {
        kind: ProviderErrorKind,
        message: String,
    },

    /// Template rendering errors
    #[error("Render error: {0}")]
    Render(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Build a provider error of the given kind.
    pub fn provider(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        AppError::Provider {
            kind,
            message: message.into(),
        }
    }

    /// Whether the failure was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }

    /// Provider failure category, if this is a provider error.
    pub fn provider_kind(&self) -> Option<ProviderErrorKind> {
        match self {
            AppError::Provider { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
