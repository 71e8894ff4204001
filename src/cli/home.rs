//! Read-only home commands.

use std::sync::Arc;

use crate::auth::ActivationStatus;
use crate::client::TadoClient;
use crate::config::TadoConfig;

fn client(config: TadoConfig) -> Result<TadoClient, Box<dyn std::error::Error>> {
    let auth = super::auth::coordinator(config)?;
    if auth.activation_status() != ActivationStatus::Completed {
        return Err("not logged in, run `tado auth login` first".into());
    }
    Ok(TadoClient::new(Arc::new(auth)))
}

/// Handle `tado zones`.
pub async fn handle_zones(config: TadoConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = client(config)?;
    let zones = client.get_zones().await?;
    let states = client.get_zone_states().await?;

    for zone in zones {
        let state = states.get(zone.id);
        let temperature = state
            .and_then(|s| s.inside_temperature())
            .map(|t| format!("{t:.1}°C"))
            .unwrap_or_else(|| "-".to_string());
        let humidity = state
            .and_then(|s| s.humidity())
            .map(|h| format!("{h:.0}%"))
            .unwrap_or_else(|| "-".to_string());
        let overlay = if state.is_some_and(|s| s.has_overlay()) {
            " (manual)"
        } else {
            ""
        };
        println!(
            "  {:>3}  {:<20} {:>7} {:>5}{overlay}",
            zone.id.0, zone.name, temperature, humidity
        );
    }
    Ok(())
}

/// Handle `tado weather`.
pub async fn handle_weather(config: TadoConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = client(config)?;
    let weather = client.get_weather().await?;

    if let Some(celsius) = weather.outside_temperature.and_then(|t| t.celsius) {
        println!("🌡  Outside: {celsius:.1}°C");
    }
    if let Some(percentage) = weather.solar_intensity.and_then(|s| s.percentage) {
        println!("☀️  Solar intensity: {percentage:.0}%");
    }
    if let Some(state) = weather.weather_state {
        println!("🌤  Conditions: {}", state.value);
    }
    Ok(())
}
