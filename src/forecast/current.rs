//! Current-conditions view.

use std::fmt::Display;

use chrono::TimeZone;

use super::local_time_label;
use crate::data::{CurrentConditions, CurrentDerived, CurrentSnapshot, Sample};
use crate::metrics::{
    aqi_label, aqi_tier, comfort_index, compass_direction, dew_point, moon_phase, visibility_km,
    visibility_label,
};

/// Computes the comfort and astronomical indices for a snapshot.
pub fn current_derived(snapshot: &CurrentSnapshot, aqi_index: i64) -> CurrentDerived {
    let sample = &snapshot.sample;
    CurrentDerived {
        comfort_label: comfort_index(
            sample.temp_c,
            snapshot.relative_humidity,
            sample.wind_speed_ms,
        )
        .map(|index| index.label()),
        dew_point_c: dew_point(snapshot.dew_point_c),
        moon_phase_name: moon_phase(sample.timestamp()).name().to_string(),
        aqi_label: aqi_label(aqi_index).to_string(),
        aqi_tier: aqi_tier(aqi_index),
        compass_direction: compass_direction(sample.wind_deg).to_string(),
    }
}

/// Formats a one-hour precipitation volume, e.g. `0.3 mm`.
pub fn volume_label(volume_mm: Option<f64>) -> Option<String> {
    volume_mm.map(|mm| format!("{:.1} mm", mm))
}

/// Chance of precipitation from a forecast slot's `pop`, as a percentage.
pub fn precip_chance_pct(slot: Option<&Sample>) -> Option<u8> {
    slot.and_then(|s| s.pop)
        .map(|pop| (pop * 100.0).round().clamp(0.0, 100.0) as u8)
}

/// Builds the current-conditions view.
///
/// # Arguments
/// * `snapshot` - Normalized current-weather snapshot
/// * `first_slot` - First forecast sample, source of the precipitation chance
/// * `aqi_index` - Provider AQI index (0 when unknown)
/// * `tz` - Time zone for sunrise/sunset labels
pub fn current_conditions<Tz>(
    snapshot: &CurrentSnapshot,
    first_slot: Option<&Sample>,
    aqi_index: i64,
    tz: &Tz,
) -> CurrentConditions
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let sample = &snapshot.sample;
    CurrentConditions {
        place_label: snapshot.place_label(),
        latitude: snapshot.latitude,
        longitude: snapshot.longitude,
        time: sample.time,
        temp_c: sample.temp_c,
        feels_like_c: sample.feels_like_c,
        temp_min_c: sample.temp_min_c,
        temp_max_c: sample.temp_max_c,
        weather_main: sample.weather_main,
        description: sample.description.clone(),
        humidity_pct: sample.humidity_pct,
        pressure_hpa: sample.pressure_hpa,
        sea_level_hpa: sample.sea_level_hpa,
        ground_level_hpa: sample.ground_level_hpa,
        wind_speed_ms: sample.wind_speed_ms,
        wind_deg: sample.wind_deg,
        wind_gust_ms: sample.wind_gust_ms.map(|gust| gust.round() as i64),
        uv_index: sample.uv_index,
        visibility_km: visibility_km(snapshot.visibility_m),
        visibility_label: visibility_label(snapshot.visibility_m),
        rain_1h_label: volume_label(snapshot.rain_1h_mm),
        snow_1h_label: volume_label(snapshot.snow_1h_mm),
        precip_chance_pct: precip_chance_pct(first_slot),
        sunrise_label: snapshot.sunrise.map(|t| local_time_label(t, tz)),
        sunset_label: snapshot.sunset.map(|t| local_time_label(t, tz)),
        derived: current_derived(snapshot, aqi_index),
    }
}
