use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::TokenCredential;

/// Progress of the device-flow login held by a coordinator.
///
/// Within one session the status only moves forward:
/// `NOT_STARTED -> PENDING -> COMPLETED`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivationStatus {
    NotStarted,
    Pending,
    Completed,
}

impl Default for ActivationStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// One in-progress device-flow login attempt.
///
/// `started_at` is taken from the coordinator's [`Clock`](super::Clock) and is
/// what the activation ceiling and the server expiry are measured against.
/// `expires_at` is the same deadline in wall-clock time, for display.
///
/// # Example
/// ```no_run
/// use std::time::{Duration, Instant};
/// use tado_client::auth::DeviceCodeSession;
/// use chrono::Utc;
///
/// let session = DeviceCodeSession {
///     device_code: "device-code".to_string(),
///     user_code: "7BQ5ZQ".to_string(),
///     verification_uri: "https://login.tado.com/oauth2/device".to_string(),
///     verification_uri_complete: None,
///     interval: Duration::from_secs(5),
///     expires_in: Duration::from_secs(300),
///     expires_at: Utc::now(),
///     started_at: Instant::now(),
/// };
/// assert!(session.verification_url().ends_with("?user_code=7BQ5ZQ"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCodeSession {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub verification_uri_complete: Option<String>,
    pub interval: Duration,
    pub expires_in: Duration,
    pub expires_at: DateTime<Utc>,
    pub started_at: Instant,
}

impl DeviceCodeSession {
    /// URL the user opens, with the user code pre-filled.
    pub fn verification_url(&self) -> String {
        if let Some(complete) = &self.verification_uri_complete {
            return complete.clone();
        }
        match Url::parse_with_params(&self.verification_uri, &[("user_code", &self.user_code)]) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}?user_code={}", self.verification_uri, self.user_code),
        }
    }

    /// Deadline announced by the authorization server, on the session clock.
    pub fn server_deadline(&self) -> Instant {
        self.started_at + self.expires_in
    }
}

/// Outcome of a single token-endpoint poll.
#[derive(Debug, Clone)]
pub enum DeviceCodePoll {
    Pending,
    SlowDown,
    Authorized { credential: TokenCredential },
    AccessDenied,
    Expired,
}
