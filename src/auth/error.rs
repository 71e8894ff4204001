use thiserror::Error;

use crate::util::timeout::TimedOut;

/// Errors raised by the device-authorization flow and token refresh.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The authorization server was unreachable, rejected the client, or
    /// answered with something that is not a usable response.
    #[error("Authorization server error: {0}")]
    AuthServer(String),
    #[error("Authorization denied by the user or the device code is invalid")]
    AuthorizationDenied,
    #[error("Device code expired before the user authorized")]
    AuthorizationExpired,
    #[error("Gave up waiting for authorization after {elapsed_secs}s")]
    AuthorizationTimeout { elapsed_secs: u64 },
    #[error("Refresh token rejected; start a new device flow")]
    ReauthorizationRequired,
    #[error("Device flow session was replaced by a newer one")]
    SessionSuperseded,
    #[error("Device activation cancelled")]
    Cancelled,
    #[error("Device flow has not been started")]
    NotStarted,
    #[error("Device is already activated")]
    AlreadyActivated,
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out after {0}ms")]
    RequestTimeout(u64),
    #[error("Authorization server returned status {status}")]
    Server { status: u16 },
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AuthError {
    /// Failures the polling loop retries at the current interval.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RequestTimeout(_) | Self::Server { .. }
        )
    }

    /// Failures that end a device-flow session for good.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::AuthorizationDenied
                | Self::AuthorizationExpired
                | Self::AuthorizationTimeout { .. }
                | Self::ReauthorizationRequired
                | Self::SessionSuperseded
                | Self::Cancelled
        )
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return Self::AuthServer(format!("undecodable response body: {error}"));
        }
        Self::Network(error.to_string())
    }
}

impl From<TimedOut> for AuthError {
    fn from(error: TimedOut) -> Self {
        Self::RequestTimeout(error.0.as_millis() as u64)
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for AuthError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
