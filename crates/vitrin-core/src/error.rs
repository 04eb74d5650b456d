//! Error types for the Vitrin application.

use std::time::Duration;
use thiserror::Error;

/// A shared error type for the entire Vitrin application.
///
/// The conversational boundary maps these onto three behaviors: validation
/// gaps become clarifying questions, external failures become user-facing
/// apologies, and store failures are the only case that aborts a turn.
#[derive(Error, Debug, Clone)]
pub enum VitrinError {
    /// A tool precondition is unmet. Resolved locally as a clarifying
    /// question, never raised past the tool boundary.
    #[error("{0}")]
    Validation(String),

    /// An external collaborator call failed.
    #[error("{service} error: {message}")]
    External {
        service: &'static str,
        message: String,
    },

    /// An external collaborator rejected the call with a rate limit and a
    /// retry-after duration.
    #[error("{service} rate limited, retry after {retry_after:?}: {message}")]
    RateLimited {
        service: &'static str,
        retry_after: Duration,
        message: String,
    },

    /// The session store is unavailable. The only fatal case: the turn
    /// aborts and no state is persisted.
    #[error("session store unavailable: {0}")]
    Store(String),

    /// Entity not found with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VitrinError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an External error for the named collaborator
    pub fn external(service: &'static str, message: impl Into<String>) -> Self {
        Self::External {
            service,
            message: message.into(),
        }
    }

    /// Creates a RateLimited error for the named collaborator
    pub fn rate_limited(
        service: &'static str,
        retry_after: Duration,
        message: impl Into<String>,
    ) -> Self {
        Self::RateLimited {
            service,
            retry_after,
            message: message.into(),
        }
    }

    /// Creates a Store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a Store error
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Check if this is a RateLimited error
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Returns the retry-after duration for rate-limited errors.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    /// The upstream message, without the service prefix, for embedding into
    /// a user-facing apology.
    pub fn upstream_message(&self) -> String {
        match self {
            Self::External { message, .. } | Self::RateLimited { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for VitrinError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for VitrinError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for VitrinError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for VitrinError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for VitrinError {
    fn from(err: reqwest::Error) -> Self {
        Self::External {
            service: "http",
            message: err.to_string(),
        }
    }
}

impl From<vitrin_imaging::ImagingError> for VitrinError {
    fn from(err: vitrin_imaging::ImagingError) -> Self {
        Self::Internal(format!("imaging: {err}"))
    }
}

/// Conversion from anyhow::Error (transitional, should be removed eventually)
impl From<anyhow::Error> for VitrinError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, VitrinError>`.
pub type Result<T> = std::result::Result<T, VitrinError>;
