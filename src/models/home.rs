use serde::{Deserialize, Serialize};

use super::{HomeId, HomePresence, MobileDeviceId};

/// Account returned by `GET /me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub locale: Option<String>,
    #[serde(default)]
    pub homes: Vec<HomeSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeSummary {
    pub id: HomeId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeState {
    pub presence: HomePresence,
    #[serde(default)]
    pub presence_locked: bool,
    pub show_home_presence_switch_button: Option<bool>,
    pub show_switch_to_auto_geofencing_button: Option<bool>,
}

impl HomeState {
    /// Whether switching the home back to automatic geofencing is possible.
    pub fn auto_geofencing_supported(&self) -> bool {
        self.show_switch_to_auto_geofencing_button.unwrap_or(false) || !self.presence_locked
    }
}

/// Target for [`TadoClient::set_presence`](crate::client::TadoClient::set_presence).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PresenceMode {
    Home,
    Away,
    /// Drop the presence lock and let geofencing decide.
    Auto,
}

impl PresenceMode {
    /// Presence to lock the home to, `None` for automatic geofencing.
    pub fn locked_presence(self) -> Option<HomePresence> {
        match self {
            Self::Home => Some(HomePresence::Home),
            Self::Away => Some(HomePresence::Away),
            Self::Auto => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PresenceLock {
    pub home_presence: HomePresence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileDevice {
    pub id: MobileDeviceId,
    pub name: String,
    pub settings: Option<MobileDeviceSettings>,
    pub location: Option<MobileLocation>,
    pub device_metadata: Option<MobileDeviceMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileDeviceSettings {
    #[serde(default)]
    pub geo_tracking_enabled: bool,
    pub special_offers_enabled: Option<bool>,
    pub on_demand_log_retrieval_enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileLocation {
    #[serde(default)]
    pub stale: bool,
    #[serde(default)]
    pub at_home: bool,
    pub relative_distance_from_home_fence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileDeviceMetadata {
    pub platform: Option<String>,
    pub os_version: Option<String>,
    pub model: Option<String>,
    pub locale: Option<String>,
}
