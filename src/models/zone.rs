use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Device, PercentageDataPoint, Power, Temperature, TemperatureDataPoint, ZoneId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneType {
    Heating,
    AirConditioning,
    HotWater,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    #[serde(rename = "type")]
    pub r#type: ZoneType,
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub device_types: Vec<String>,
    #[serde(default)]
    pub devices: Vec<Device>,
    pub report_available: Option<bool>,
    pub supports_dazzle: Option<bool>,
    pub dazzle_enabled: Option<bool>,
    pub open_window_detection: Option<OpenWindowDetection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenWindowDetection {
    pub supported: bool,
    pub enabled: Option<bool>,
    pub timeout_in_seconds: Option<u64>,
}

/// Live state of a single zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneState {
    pub tado_mode: Option<String>,
    pub geolocation_override: Option<bool>,
    pub geolocation_override_disable_time: Option<DateTime<Utc>>,
    pub setting: OverlaySetting,
    pub overlay_type: Option<String>,
    pub overlay: Option<Overlay>,
    pub open_window: Option<serde_json::Value>,
    pub next_schedule_change: Option<ScheduleChange>,
    pub link: Option<Link>,
    #[serde(default)]
    pub activity_data_points: ActivityDataPoints,
    #[serde(default)]
    pub sensor_data_points: SensorDataPoints,
}

impl ZoneState {
    /// A manual overlay is active on this zone.
    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn inside_temperature(&self) -> Option<f64> {
        self.sensor_data_points
            .inside_temperature
            .as_ref()
            .and_then(|point| point.celsius)
    }

    pub fn humidity(&self) -> Option<f64> {
        self.sensor_data_points
            .humidity
            .as_ref()
            .and_then(|point| point.percentage)
    }
}

/// Response of `GET homes/{id}/zoneStates`, keyed by zone id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ZoneStates {
    #[serde(default)]
    pub zone_states: HashMap<String, ZoneState>,
}

impl ZoneStates {
    pub fn get(&self, zone: ZoneId) -> Option<&ZoneState> {
        self.zone_states.get(&zone.0.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SensorDataPoints {
    pub inside_temperature: Option<TemperatureDataPoint>,
    pub humidity: Option<PercentageDataPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDataPoints {
    pub heating_power: Option<PercentageDataPoint>,
    pub ac_power: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleChange {
    pub start: Option<DateTime<Utc>>,
    pub setting: Option<OverlaySetting>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub state: String,
}

/// Manual overlay currently applied to a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    #[serde(rename = "type")]
    pub r#type: Option<String>,
    pub setting: OverlaySetting,
    pub termination: Option<OverlayTermination>,
}

/// Heating, hot water or air conditioning setting.
///
/// Used both when reading zone state and as the `setting` part of an overlay
/// request; absent fields are omitted on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySetting {
    #[serde(rename = "type")]
    pub r#type: ZoneType,
    pub power: Power,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Temperature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan_speed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_swing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_swing: Option<String>,
}

impl OverlaySetting {
    /// Setting with the given zone type and power and nothing else.
    pub fn new(r#type: ZoneType, power: Power) -> Self {
        Self {
            r#type,
            power,
            temperature: None,
            mode: None,
            fan_speed: None,
            fan_level: None,
            swing: None,
            vertical_swing: None,
            horizontal_swing: None,
        }
    }

    pub fn heating(celsius: f64) -> Self {
        Self {
            temperature: Some(Temperature {
                celsius: Some(celsius),
                fahrenheit: None,
            }),
            ..Self::new(ZoneType::Heating, Power::On)
        }
    }

    pub fn off(r#type: ZoneType) -> Self {
        Self::new(r#type, Power::Off)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminationMode {
    Manual,
    NextTimeBlock,
    Timer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayTermination {
    /// Effective termination as reported by the server, e.g. `TADO_MODE`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_skill_based_app: Option<TerminationMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_in_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_time_in_seconds: Option<u64>,
}

impl OverlayTermination {
    fn request(mode: TerminationMode, duration_in_seconds: Option<u64>) -> Self {
        Self {
            r#type: None,
            type_skill_based_app: Some(mode),
            duration_in_seconds,
            expiry: None,
            remaining_time_in_seconds: None,
        }
    }

    /// Stay until the user changes it.
    pub fn manual() -> Self {
        Self::request(TerminationMode::Manual, None)
    }

    /// Stay until the next schedule block starts.
    pub fn next_time_block() -> Self {
        Self::request(TerminationMode::NextTimeBlock, None)
    }

    pub fn timer(seconds: u64) -> Self {
        Self::request(TerminationMode::Timer, Some(seconds))
    }
}

/// Body of `PUT homes/{id}/zones/{zone}/overlay`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneOverlayRequest {
    pub setting: OverlaySetting,
    pub termination: OverlayTermination,
}

impl ZoneOverlayRequest {
    pub fn new(setting: OverlaySetting, termination: OverlayTermination) -> Self {
        Self {
            setting,
            termination,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
    pub step: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRanges {
    pub celsius: Option<TemperatureRange>,
    pub fahrenheit: Option<TemperatureRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    #[serde(rename = "type")]
    pub r#type: ZoneType,
    pub temperatures: Option<TemperatureRanges>,
    pub can_set_temperature: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn heating_overlay_request_has_wire_shape() {
        let request =
            ZoneOverlayRequest::new(OverlaySetting::heating(21.5), OverlayTermination::timer(900));

        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body,
            json!({
                "setting": {
                    "type": "HEATING",
                    "power": "ON",
                    "temperature": { "celsius": 21.5 }
                },
                "termination": {
                    "typeSkillBasedApp": "TIMER",
                    "durationInSeconds": 900
                }
            })
        );
    }

    #[test]
    fn off_overlay_omits_temperature() {
        let request = ZoneOverlayRequest::new(
            OverlaySetting::off(ZoneType::HotWater),
            OverlayTermination::manual(),
        );

        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["setting"], json!({ "type": "HOT_WATER", "power": "OFF" }));
        assert_eq!(body["termination"], json!({ "typeSkillBasedApp": "MANUAL" }));
    }

    #[test]
    fn zone_state_decodes_sensor_readings() {
        let state: ZoneState = serde_json::from_value(json!({
            "tadoMode": "HOME",
            "geolocationOverride": false,
            "setting": {
                "type": "HEATING",
                "power": "ON",
                "temperature": { "celsius": 20.0, "fahrenheit": 68.0 }
            },
            "overlayType": null,
            "overlay": null,
            "link": { "state": "ONLINE" },
            "activityDataPoints": {
                "heatingPower": { "type": "PERCENTAGE", "percentage": 35.0, "timestamp": "2024-01-10T10:00:00.000Z" }
            },
            "sensorDataPoints": {
                "insideTemperature": { "celsius": 19.4, "fahrenheit": 66.9, "timestamp": "2024-01-10T10:00:00.000Z", "type": "TEMPERATURE" },
                "humidity": { "type": "PERCENTAGE", "percentage": 48.2, "timestamp": "2024-01-10T10:00:00.000Z" }
            },
            "someNewField": { "ignored": true }
        }))
        .unwrap();

        assert!(!state.has_overlay());
        assert_eq!(state.inside_temperature(), Some(19.4));
        assert_eq!(state.humidity(), Some(48.2));
        assert_eq!(state.link.unwrap().state, "ONLINE");
    }

    #[test]
    fn zone_states_are_looked_up_by_zone_id() {
        let states: ZoneStates = serde_json::from_value(json!({
            "zoneStates": {
                "1": { "setting": { "type": "HEATING", "power": "OFF" } },
                "4": { "setting": { "type": "HOT_WATER", "power": "ON" } }
            }
        }))
        .unwrap();

        assert_eq!(states.get(ZoneId(4)).unwrap().setting.r#type, ZoneType::HotWater);
        assert!(states.get(ZoneId(2)).is_none());
    }
}
