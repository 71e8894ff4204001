//! Error types for the tado client.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

use crate::auth::AuthError;
use crate::util::timeout::TimedOut;

/// Primary error type for all tado API operations.
#[derive(Error, Debug)]
pub enum TadoError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Authentication error connecting to tado: {0}")]
    Authentication(String),

    #[error("Forbidden error connecting to tado: {0}")]
    Forbidden(String),

    #[error("Bad request to tado: {0}")]
    BadRequest(String),

    #[error("Server error {status} connecting to tado: {message}")]
    Server { status: u16, message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<TimedOut> for TadoError {
    fn from(error: TimedOut) -> Self {
        Self::Timeout(error.0.as_millis() as u64)
    }
}

impl TadoError {
    /// Map an HTTP status and body to the matching variant.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => Self::BadRequest(message),
            401 => Self::Authentication(message),
            403 => Self::Forbidden(message),
            500..=599 => Self::Server { status, message },
            _ => Self::Api { status, message },
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Auth(auth) => match auth {
                AuthError::Network(_) => ErrorCategory::Network,
                AuthError::RequestTimeout(_) => ErrorCategory::Timeout,
                AuthError::Server { .. } | AuthError::AuthServer(_) => ErrorCategory::Server,
                AuthError::Io(_) | AuthError::Serialization(_) => ErrorCategory::Unknown,
                _ => ErrorCategory::Authorization,
            },
            Self::Authentication(_) | Self::Forbidden(_) => ErrorCategory::Authentication,
            Self::Server { .. } => ErrorCategory::Server,
            Self::BadRequest(_) | Self::Api { .. } => ErrorCategory::Api,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Configuration(_) | Self::InvalidArgument(_) => ErrorCategory::Configuration,
            Self::Io(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Timeout | ErrorCategory::Server
        ) && !matches!(self, Self::Auth(AuthError::AuthServer(_)))
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            Self::Forbidden(_) => return RecoverySuggestion::CheckPermissions,
            Self::Auth(AuthError::AuthServer(_)) => return RecoverySuggestion::ContactSupport,
            _ => {}
        }
        match self.category() {
            ErrorCategory::Authentication | ErrorCategory::Authorization => {
                RecoverySuggestion::Reauthorize
            }
            ErrorCategory::Network | ErrorCategory::Server => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Timeout => RecoverySuggestion::IncreaseTimeout,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            _ => RecoverySuggestion::ContactSupport,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TadoError>;
