use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bearer credential issued by the tado authorization server.
///
/// # Example
/// ```
/// use tado_client::auth::TokenCredential;
/// use chrono::{Duration, Utc};
///
/// let credential = TokenCredential {
///     access_token: "access".to_string(),
///     refresh_token: Some("refresh".to_string()),
///     expires_at: Utc::now() + Duration::minutes(10),
///     scope: Some("offline_access".to_string()),
///     token_type: Some("Bearer".to_string()),
/// };
/// assert!(!credential.is_expired(std::time::Duration::from_secs(30)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCredential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl TokenCredential {
    /// A credential that only carries a refresh token. Its access token is
    /// empty and already expired, so the first use exchanges it.
    pub fn from_refresh_token(refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: String::new(),
            refresh_token: Some(refresh_token.into()),
            expires_at: DateTime::<Utc>::from(std::time::UNIX_EPOCH),
            scope: None,
            token_type: None,
        }
    }

    /// Whether the access token is expired, or will be within `skew`.
    pub fn is_expired(&self, skew: Duration) -> bool {
        self.is_expired_at(Utc::now(), skew)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        let skew = chrono::Duration::from_std(skew).unwrap_or_else(|_| chrono::Duration::zero());
        now + skew >= self.expires_at
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn credential(expires_at: DateTime<Utc>) -> TokenCredential {
        TokenCredential {
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at,
            scope: None,
            token_type: None,
        }
    }

    #[test]
    fn credential_within_skew_counts_as_expired() {
        let now = Utc::now();
        let cred = credential(now + ChronoDuration::seconds(20));
        assert!(cred.is_expired_at(now, Duration::from_secs(30)));
        assert!(!cred.is_expired_at(now, Duration::from_secs(10)));
    }

    #[test]
    fn refresh_token_only_credential_is_expired() {
        let cred = TokenCredential::from_refresh_token("rt");
        assert!(cred.is_expired(Duration::ZERO));
        assert_eq!(cred.refresh_token.as_deref(), Some("rt"));
    }

    #[test]
    fn bearer_header_value() {
        let cred = credential(Utc::now());
        assert_eq!(cred.bearer(), "Bearer access");
    }
}
