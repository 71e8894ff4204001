#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tado_client::auth::{AuthError, Clock, DeviceFlowCoordinator, TokenCredential, TokenStore};
use tado_client::config::TadoConfig;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/oauth2/token";
pub const DEVICE_AUTHORIZE_PATH: &str = "/oauth2/device_authorize";

#[derive(Default)]
pub struct InMemoryTokenStore {
    tokens: Mutex<HashMap<String, TokenCredential>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, profile: &str, credential: TokenCredential) {
        self.tokens
            .lock()
            .expect("store lock poisoned")
            .insert(profile.to_string(), credential);
    }

    pub fn get(&self, profile: &str) -> Option<TokenCredential> {
        self.tokens
            .lock()
            .expect("store lock poisoned")
            .get(profile)
            .cloned()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self, profile: &str) -> Result<Option<TokenCredential>, AuthError> {
        Ok(self.get(profile))
    }

    fn save(&self, profile: &str, credential: &TokenCredential) -> Result<(), AuthError> {
        self.seed(profile, credential.clone());
        Ok(())
    }

    fn clear(&self, profile: &str) -> Result<(), AuthError> {
        self.tokens
            .lock()
            .expect("store lock poisoned")
            .remove(profile);
        Ok(())
    }
}

/// Virtual clock: `sleep` advances time immediately and records the span.
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        })
    }

    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().expect("clock lock poisoned")
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().expect("clock lock poisoned").clone()
    }

    pub fn advance(&self, duration: Duration) {
        *self.offset.lock().expect("clock lock poisoned") += duration;
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
        self.sleeps
            .lock()
            .expect("clock lock poisoned")
            .push(duration);
        tokio::task::yield_now().await;
    }
}

pub fn config(server: &MockServer) -> TadoConfig {
    TadoConfig::default().with_base_url(&server.uri())
}

pub fn coordinator(server: &MockServer, clock: Arc<ManualClock>) -> DeviceFlowCoordinator {
    DeviceFlowCoordinator::new(config(server)).with_clock(clock)
}

pub fn device_authorize_body(device_code: &str, interval: u64, expires_in: u64) -> Value {
    json!({
        "device_code": device_code,
        "user_code": "7BQ5ZQ",
        "verification_uri": "https://login.tado.com/oauth2/device",
        "expires_in": expires_in,
        "interval": interval
    })
}

pub async fn mount_device_authorize(server: &MockServer, interval: u64, expires_in: u64) {
    Mock::given(method("POST"))
        .and(path(DEVICE_AUTHORIZE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(device_authorize_body(
                "device-1",
                interval,
                expires_in,
            )),
        )
        .mount(server)
        .await;
}

pub fn token_body(access_token: &str, refresh_token: &str, expires_in: u64) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "bearer",
        "refresh_token": refresh_token,
        "expires_in": expires_in,
        "scope": "home.user",
        "userId": "user-1"
    })
}

pub fn oauth_error(status: u16, error: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "error": error,
        "error_description": format!("{error} description")
    }))
}

/// Token-endpoint mock for device-code polls, tried in `priority` order.
pub fn device_poll() -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("device_code=device-"))
}

pub fn refresh_grant() -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
}

pub async fn token_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == TOKEN_PATH)
        .count()
}

pub fn credential(access_token: &str, refresh_token: &str) -> TokenCredential {
    TokenCredential {
        access_token: access_token.to_string(),
        refresh_token: Some(refresh_token.to_string()),
        expires_at: Utc::now() + chrono::Duration::minutes(10),
        scope: Some("home.user".to_string()),
        token_type: Some("bearer".to_string()),
    }
}

pub fn expired_credential(access_token: &str, refresh_token: &str) -> TokenCredential {
    TokenCredential {
        expires_at: Utc::now() - chrono::Duration::minutes(1),
        ..credential(access_token, refresh_token)
    }
}
