//! Typed access to the tado v2 REST API.
//!
//! Every request borrows a fresh credential from the
//! [`DeviceFlowCoordinator`], so tokens are refreshed transparently.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::OnceCell;

use crate::auth::DeviceFlowCoordinator;
use crate::error::{Result, TadoError};
use crate::models::device::ChildLock;
use crate::models::home::PresenceLock;
use crate::models::{
    Capabilities, Device, HomeId, HomeState, MobileDevice, Overlay, PresenceMode, SerialNo,
    TemperatureOffset, User, Weather, Zone, ZoneId, ZoneOverlayRequest, ZoneState, ZoneStates,
};
use crate::util::retry::RetryPolicy;
use crate::util::timeout::with_timeout;

const JSON_UTF8: &str = "application/json;charset=UTF-8";

/// Client for one tado account.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use tado_client::auth::DeviceFlowCoordinator;
/// use tado_client::client::TadoClient;
/// use tado_client::config::TadoConfig;
///
/// # async fn example() -> tado_client::error::Result<()> {
/// let auth = Arc::new(DeviceFlowCoordinator::new(TadoConfig::default()).with_refresh_token("stored"));
/// let client = TadoClient::new(auth);
/// for zone in client.get_zones().await? {
///     println!("{} ({:?})", zone.name, zone.r#type);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TadoClient {
    auth: Arc<DeviceFlowCoordinator>,
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
    request_timeout: Duration,
    retry: RetryPolicy,
    me: OnceCell<User>,
}

impl TadoClient {
    pub fn new(auth: Arc<DeviceFlowCoordinator>) -> Self {
        let config = auth.config();
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            request_timeout: config.request_timeout,
            retry: RetryPolicy::default(),
            me: OnceCell::new(),
            auth,
        }
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Backoff applied to GET requests. Writes are never retried.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn auth(&self) -> &Arc<DeviceFlowCoordinator> {
        &self.auth
    }

    /// The logged-in account. Fetched once per client.
    pub async fn get_me(&self) -> Result<User> {
        self.me
            .get_or_try_init(|| self.get("me"))
            .await
            .cloned()
    }

    /// First home of the account.
    pub async fn home_id(&self) -> Result<HomeId> {
        let me = self.get_me().await?;
        me.homes
            .first()
            .map(|home| home.id)
            .ok_or_else(|| TadoError::Configuration("tado account has no homes".into()))
    }

    pub async fn get_zones(&self) -> Result<Vec<Zone>> {
        let home = self.home_id().await?;
        self.get(&format!("homes/{}/zones", home.0)).await
    }

    pub async fn get_zone_state(&self, zone: ZoneId) -> Result<ZoneState> {
        let home = self.home_id().await?;
        self.get(&format!("homes/{}/zones/{}/state", home.0, zone.0))
            .await
    }

    /// States of all zones in one request.
    pub async fn get_zone_states(&self) -> Result<ZoneStates> {
        let home = self.home_id().await?;
        self.get(&format!("homes/{}/zoneStates", home.0)).await
    }

    pub async fn get_capabilities(&self, zone: ZoneId) -> Result<Capabilities> {
        let home = self.home_id().await?;
        self.get(&format!("homes/{}/zones/{}/capabilities", home.0, zone.0))
            .await
    }

    pub async fn get_weather(&self) -> Result<Weather> {
        let home = self.home_id().await?;
        self.get(&format!("homes/{}/weather", home.0)).await
    }

    pub async fn get_home_state(&self) -> Result<HomeState> {
        let home = self.home_id().await?;
        self.get(&format!("homes/{}/state", home.0)).await
    }

    pub async fn get_devices(&self) -> Result<Vec<Device>> {
        let home = self.home_id().await?;
        self.get(&format!("homes/{}/devices", home.0)).await
    }

    pub async fn get_mobile_devices(&self) -> Result<Vec<MobileDevice>> {
        let home = self.home_id().await?;
        self.get(&format!("homes/{}/mobileDevices", home.0)).await
    }

    pub async fn get_device_temperature_offset(
        &self,
        serial: &SerialNo,
    ) -> Result<TemperatureOffset> {
        self.get(&format!("devices/{}/temperatureOffset", serial.0))
            .await
    }

    /// Apply a manual overlay to a zone and return the overlay as stored.
    pub async fn set_zone_overlay(
        &self,
        zone: ZoneId,
        request: &ZoneOverlayRequest,
    ) -> Result<Overlay> {
        let home = self.home_id().await?;
        let body = self
            .send(
                Method::PUT,
                &format!("homes/{}/zones/{}/overlay", home.0, zone.0),
                Some(request),
            )
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Remove the overlay so the zone follows its schedule again.
    pub async fn reset_zone_overlay(&self, zone: ZoneId) -> Result<()> {
        let home = self.home_id().await?;
        self.send(
            Method::DELETE,
            &format!("homes/{}/zones/{}/overlay", home.0, zone.0),
            None::<&()>,
        )
        .await?;
        Ok(())
    }

    pub async fn set_presence(&self, mode: PresenceMode) -> Result<()> {
        let home = self.home_id().await?;
        let path = format!("homes/{}/presenceLock", home.0);
        match mode.locked_presence() {
            Some(home_presence) => {
                self.send(Method::PUT, &path, Some(&PresenceLock { home_presence }))
                    .await?
            }
            None => self.send(Method::DELETE, &path, None::<&()>).await?,
        };
        Ok(())
    }

    pub async fn set_child_lock(&self, serial: &SerialNo, enabled: bool) -> Result<()> {
        self.send(
            Method::PUT,
            &format!("devices/{}/childLock", serial.0),
            Some(&ChildLock {
                child_lock_enabled: enabled,
            }),
        )
        .await?;
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self
            .retry
            .execute(self.auth.clock(), move || self.send(Method::GET, path, None::<&()>))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// One authenticated exchange; returns the response body on 2xx.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<String> {
        let credential = self.auth.refresh_if_expired().await?;
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(AUTHORIZATION, credential.bearer())
            .header(USER_AGENT, &self.user_agent);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, JSON_UTF8)
                .body(serde_json::to_vec(body)?);
        }

        tracing::debug!(%method, path, "tado request");
        let response = with_timeout(self.request_timeout, async {
            request.send().await.map_err(TadoError::from)
        })
        .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::debug!(%method, path, status = status.as_u16(), "tado request failed");
            return Err(TadoError::from_status(status.as_u16(), text));
        }
        Ok(text)
    }
}
