use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SerialNo;

/// Capability that marks devices with a temperature offset.
pub const INSIDE_TEMPERATURE_MEASUREMENT: &str = "INSIDE_TEMPERATURE_MEASUREMENT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_type: String,
    pub serial_no: SerialNo,
    pub short_serial_no: Option<String>,
    pub current_fw_version: Option<String>,
    pub connection_state: Option<DeviceConnectionState>,
    #[serde(default)]
    pub characteristics: DeviceCharacteristics,
    pub in_pairing_mode: Option<bool>,
    pub mounting_state: Option<DeviceMountingState>,
    pub battery_state: Option<String>,
    pub orientation: Option<String>,
    pub child_lock_enabled: Option<bool>,
}

impl Device {
    pub fn measures_inside_temperature(&self) -> bool {
        self.characteristics
            .capabilities
            .iter()
            .any(|cap| cap == INSIDE_TEMPERATURE_MEASUREMENT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConnectionState {
    pub value: bool,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeviceCharacteristics {
    #[serde(default)]
    pub capabilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceMountingState {
    pub value: String,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChildLock {
    pub child_lock_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureOffset {
    pub celsius: f64,
    pub fahrenheit: f64,
}
