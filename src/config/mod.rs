//! Client configuration (layered: code > env > defaults).

use std::time::Duration;

use bon::Builder;

use crate::error::TadoError;

pub const DEFAULT_CLIENT_ID: &str = "1bb50063-6b0c-4d11-bd99-387f4a91cc46";
pub const DEFAULT_AUTH_BASE_URL: &str = "https://login.tado.com/oauth2";
pub const DEFAULT_API_BASE_URL: &str = "https://my.tado.com/api/v2";
pub const DEFAULT_SCOPE: &str = "offline_access";

/// Settings shared by the device-flow coordinator and the REST client.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use tado_client::config::TadoConfig;
///
/// let config = TadoConfig::builder()
///     .request_timeout(Duration::from_secs(5))
///     .build();
/// assert_eq!(config.activation_timeout, Duration::from_secs(300));
/// ```
#[derive(Debug, Clone, Builder)]
pub struct TadoConfig {
    #[builder(into, default = DEFAULT_CLIENT_ID.to_string())]
    pub client_id: String,
    #[builder(into, default = format!("{DEFAULT_AUTH_BASE_URL}/device_authorize"))]
    pub device_authorize_url: String,
    #[builder(into, default = format!("{DEFAULT_AUTH_BASE_URL}/token"))]
    pub token_url: String,
    #[builder(into, default = DEFAULT_API_BASE_URL.to_string())]
    pub api_base_url: String,
    #[builder(into, default = DEFAULT_SCOPE.to_string())]
    pub scope: String,
    #[builder(into, default = format!("tado-client/{}", env!("CARGO_PKG_VERSION")))]
    pub user_agent: String,
    /// Upper bound for any single HTTP exchange.
    #[builder(default = Duration::from_secs(10))]
    pub request_timeout: Duration,
    /// Hard ceiling on how long `await_activation` keeps polling.
    #[builder(default = Duration::from_secs(300))]
    pub activation_timeout: Duration,
    /// Poll spacing used when the server does not suggest one.
    #[builder(default = Duration::from_secs(5))]
    pub default_poll_interval: Duration,
    #[builder(default = Duration::from_secs(5))]
    pub slow_down_increment: Duration,
    /// Access tokens this close to expiry are refreshed early.
    #[builder(default = Duration::from_secs(30))]
    pub refresh_skew: Duration,
    #[builder(into, default = "default".to_string())]
    pub profile: String,
}

impl Default for TadoConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TadoConfig {
    /// Defaults overridden by `TADO_*` environment variables (and `.env`).
    pub fn from_env() -> Result<Self, TadoError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, TadoError> {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(client_id) = var("TADO_CLIENT_ID") {
            config.client_id = client_id;
        }
        if let Some(base) = var("TADO_AUTH_BASE_URL") {
            let base = base.trim_end_matches('/');
            config.device_authorize_url = format!("{base}/device_authorize");
            config.token_url = format!("{base}/token");
        }
        if let Some(api) = var("TADO_API_BASE_URL") {
            config.api_base_url = api.trim_end_matches('/').to_string();
        }
        if let Some(secs) = var("TADO_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = parse_secs("TADO_REQUEST_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = var("TADO_ACTIVATION_TIMEOUT_SECS") {
            config.activation_timeout = parse_secs("TADO_ACTIVATION_TIMEOUT_SECS", &secs)?;
        }
        if let Some(profile) = var("TADO_PROFILE") {
            config.profile = profile;
        }
        Ok(config)
    }

    /// Point every endpoint at one origin. Handy for mock servers.
    pub fn with_base_url(mut self, origin: &str) -> Self {
        let origin = origin.trim_end_matches('/');
        self.device_authorize_url = format!("{origin}/oauth2/device_authorize");
        self.token_url = format!("{origin}/oauth2/token");
        self.api_base_url = format!("{origin}/api/v2");
        self
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration, TadoError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| TadoError::Configuration(format!("{key} must be a whole number of seconds")))
}
