use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PercentageDataPoint, TemperatureDataPoint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    pub outside_temperature: Option<TemperatureDataPoint>,
    pub solar_intensity: Option<PercentageDataPoint>,
    pub weather_state: Option<WeatherStateDataPoint>,
}

/// Conditions such as `SUN`, `CLOUDY_PARTLY` or `RAIN`; kept as the raw
/// vendor string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherStateDataPoint {
    #[serde(rename = "type")]
    pub r#type: Option<String>,
    pub value: String,
    pub timestamp: Option<DateTime<Utc>>,
}
