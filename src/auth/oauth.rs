//! Wire exchanges with the tado authorization server.

use std::time::{Duration, Instant};

use chrono::{TimeDelta, Utc};
use reqwest::{Response, StatusCode};
use serde::Deserialize;

use super::device_code::{DeviceCodePoll, DeviceCodeSession};
use super::error::AuthError;
use super::token::TokenCredential;
use crate::config::TadoConfig;
use crate::util::timeout::with_timeout;

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Form-encoded OAuth2 calls against `login.tado.com`.
///
/// Stateless apart from the HTTP client and endpoint configuration; the
/// [`DeviceFlowCoordinator`](super::DeviceFlowCoordinator) owns all session
/// and credential state.
#[derive(Debug, Clone)]
pub struct TadoOAuth {
    client: reqwest::Client,
    client_id: String,
    scope: String,
    device_authorize_url: String,
    token_url: String,
    request_timeout: Duration,
    default_interval: Duration,
    activation_timeout: Duration,
}

impl TadoOAuth {
    pub fn new(client: reqwest::Client, config: &TadoConfig) -> Self {
        Self {
            client,
            client_id: config.client_id.clone(),
            scope: config.scope.clone(),
            device_authorize_url: config.device_authorize_url.clone(),
            token_url: config.token_url.clone(),
            request_timeout: config.request_timeout,
            default_interval: config.default_poll_interval,
            activation_timeout: config.activation_timeout,
        }
    }

    /// Ask for a device code. Every failure is reported as
    /// [`AuthError::AuthServer`]; nothing here is retried.
    pub async fn start_device_code(&self, started_at: Instant) -> Result<DeviceCodeSession, AuthError> {
        let request = async {
            let resp = self
                .client
                .post(&self.device_authorize_url)
                .header("Accept", "application/json")
                .form(&[
                    ("client_id", self.client_id.as_str()),
                    ("scope", self.scope.as_str()),
                ])
                .send()
                .await?;
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(AuthError::AuthServer(format!(
                    "device authorization failed with status {status}: {body}"
                )));
            }
            let payload: DeviceAuthorizeResponse = json_body(resp).await?;
            Ok(payload)
        };

        let payload = with_timeout(self.request_timeout, request)
            .await
            .map_err(|err| match err {
                AuthError::AuthServer(_) => err,
                other => AuthError::AuthServer(other.to_string()),
            })?;

        // Nothing past the activation ceiling matters to the poll loop.
        let interval = payload
            .interval
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(self.default_interval)
            .min(self.activation_timeout);
        let expires_in = Duration::from_secs(payload.expires_in).min(self.activation_timeout);
        let expires_at = Utc::now()
            + chrono::Duration::from_std(expires_in).unwrap_or_else(|_| chrono::Duration::zero());

        Ok(DeviceCodeSession {
            device_code: payload.device_code,
            user_code: payload.user_code,
            verification_uri: payload.verification_uri,
            verification_uri_complete: payload.verification_uri_complete,
            interval,
            expires_in,
            expires_at,
            started_at,
        })
    }

    /// Poll the token endpoint once for `session`, giving up after
    /// `budget` or the configured request timeout, whichever is shorter.
    pub async fn poll_device_code(
        &self,
        session: &DeviceCodeSession,
        budget: Duration,
    ) -> Result<DeviceCodePoll, AuthError> {
        let request = async {
            let resp = self
                .client
                .post(&self.token_url)
                .header("Accept", "application/json")
                .form(&[
                    ("client_id", self.client_id.as_str()),
                    ("device_code", session.device_code.as_str()),
                    ("grant_type", DEVICE_CODE_GRANT),
                ])
                .send()
                .await?;
            classify_poll_response(resp).await
        };
        with_timeout(self.request_timeout.min(budget), request).await
    }

    /// Exchange a refresh token. A rejected token maps to
    /// [`AuthError::ReauthorizationRequired`].
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenCredential, AuthError> {
        let request = async {
            let resp = self
                .client
                .post(&self.token_url)
                .header("Accept", "application/json")
                .form(&[
                    ("client_id", self.client_id.as_str()),
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token),
                ])
                .send()
                .await?;
            let status = resp.status();
            if status.is_success() {
                let payload: TokenResponse = json_body(resp).await?;
                return payload.into_credential(Some(refresh_token));
            }
            if status.is_server_error() {
                return Err(AuthError::Server {
                    status: status.as_u16(),
                });
            }
            if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
                let error = resp
                    .json::<ErrorResponse>()
                    .await
                    .ok()
                    .and_then(|body| body.error);
                tracing::debug!(status = %status, error = ?error, "Refresh token rejected");
                return Err(AuthError::ReauthorizationRequired);
            }
            Err(AuthError::AuthServer(format!(
                "token refresh failed with status {status}"
            )))
        };
        with_timeout(self.request_timeout, request).await
    }
}

async fn classify_poll_response(resp: Response) -> Result<DeviceCodePoll, AuthError> {
    let status = resp.status();
    if status.is_success() {
        let payload: TokenResponse = json_body(resp).await?;
        let credential = payload.into_credential(None)?;
        return Ok(DeviceCodePoll::Authorized { credential });
    }
    if status.is_server_error() {
        return Err(AuthError::Server {
            status: status.as_u16(),
        });
    }
    if status.is_client_error() {
        let body = resp.text().await.unwrap_or_default();
        let error = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|payload| payload.error);
        return match error.as_deref() {
            Some("authorization_pending") => Ok(DeviceCodePoll::Pending),
            Some("slow_down") => Ok(DeviceCodePoll::SlowDown),
            Some("access_denied") | Some("invalid_grant") => Ok(DeviceCodePoll::AccessDenied),
            Some("expired_token") => Ok(DeviceCodePoll::Expired),
            Some(other) => Err(AuthError::AuthServer(format!(
                "device token request failed with status {status}: {other}"
            ))),
            None => Err(AuthError::AuthServer(format!(
                "device token request failed with status {status}: {body}"
            ))),
        };
    }
    Err(AuthError::AuthServer(format!(
        "device token request failed with status {status}"
    )))
}

/// Decode a JSON body, rejecting anything not labelled as JSON.
async fn json_body<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, AuthError> {
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = resp.text().await?;
    if let Some(content_type) = content_type {
        if !content_type.contains("application/json") {
            return Err(AuthError::AuthServer(format!(
                "unexpected response content type {content_type}: {body}"
            )));
        }
    }
    serde_json::from_str(&body)
        .map_err(|err| AuthError::AuthServer(format!("malformed response body: {err}: {body}")))
}

#[derive(Debug, Deserialize)]
struct DeviceAuthorizeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    #[serde(default)]
    verification_uri_complete: Option<String>,
    expires_in: u64,
    #[serde(default)]
    interval: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

impl TokenResponse {
    /// `previous_refresh` is kept when the server does not rotate the token.
    fn into_credential(self, previous_refresh: Option<&str>) -> Result<TokenCredential, AuthError> {
        if self.access_token.is_empty() {
            return Err(AuthError::AuthServer(
                "token response carried an empty access_token".to_string(),
            ));
        }
        let expires_at = i64::try_from(self.expires_in)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| {
                AuthError::AuthServer(format!(
                    "token lifetime of {}s is out of range",
                    self.expires_in
                ))
            })?;
        let refresh_token = self
            .refresh_token
            .or_else(|| previous_refresh.map(str::to_string));
        Ok(TokenCredential {
            access_token: self.access_token,
            refresh_token,
            expires_at,
            scope: self.scope,
            token_type: self.token_type,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_keeps_previous_refresh_token_when_not_rotated() {
        let payload = TokenResponse {
            access_token: "at".to_string(),
            expires_in: 600,
            refresh_token: None,
            scope: None,
            token_type: Some("Bearer".to_string()),
        };
        let credential = payload.into_credential(Some("old-rt")).unwrap();
        assert_eq!(credential.refresh_token.as_deref(), Some("old-rt"));
        assert!(credential.expires_at > Utc::now());
    }

    #[test]
    fn token_response_prefers_rotated_refresh_token() {
        let payload = TokenResponse {
            access_token: "at".to_string(),
            expires_in: 600,
            refresh_token: Some("new-rt".to_string()),
            scope: None,
            token_type: None,
        };
        let credential = payload.into_credential(Some("old-rt")).unwrap();
        assert_eq!(credential.refresh_token.as_deref(), Some("new-rt"));
    }

    #[test]
    fn empty_access_token_is_invalid() {
        let payload = TokenResponse {
            access_token: String::new(),
            expires_in: 600,
            refresh_token: None,
            scope: None,
            token_type: None,
        };
        assert!(matches!(
            payload.into_credential(None),
            Err(AuthError::AuthServer(_))
        ));
    }

    #[test]
    fn out_of_range_lifetime_is_rejected() {
        for expires_in in [u64::MAX, 100_000_000_000_000_000] {
            let payload = TokenResponse {
                access_token: "at".to_string(),
                expires_in,
                refresh_token: None,
                scope: None,
                token_type: None,
            };
            assert!(
                matches!(payload.into_credential(None), Err(AuthError::AuthServer(_))),
                "expires_in {expires_in}"
            );
        }
    }
}
