//! Derived comfort and astronomical indices
//!
//! Pure, stateless functions shared by the current-conditions view and the
//! per-sample/per-day outputs. Each function is total over its input domain.

use serde::{Deserialize, Serialize};

/// Heat index applies at or above this temperature (Celsius).
pub const HEAT_INDEX_MIN_TEMP_C: f64 = 26.7;
/// Heat index applies at or above this relative humidity (%).
pub const HEAT_INDEX_MIN_HUMIDITY: f64 = 40.0;
/// Wind chill applies at or below this temperature (Celsius).
pub const WIND_CHILL_MAX_TEMP_C: f64 = 10.0;
/// Wind chill applies at or above this wind speed.
pub const WIND_CHILL_MIN_WIND: f64 = 4.8;

/// Known new moon used as the phase origin: 2025-01-13T00:00:00Z.
pub const REFERENCE_NEW_MOON_EPOCH: i64 = 1_736_726_400;
/// Mean synodic month in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.53;

/// Label shown when a value is not available.
pub const UNAVAILABLE_LABEL: &str = "—";
/// Label shown when visibility is not reported.
pub const VISIBILITY_UNAVAILABLE_LABEL: &str = "N/A";

const COMPASS_POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
const AQI_LABELS: [&str; 5] = ["Good", "Fair", "Moderate", "Poor", "Very Poor"];

/// Apparent-temperature correction that applies to a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComfortIndex {
    HeatIndex(i64),
    WindChill(i64),
}

impl ComfortIndex {
    pub fn label(&self) -> String {
        match self {
            ComfortIndex::HeatIndex(value) => format!("Heat Index: {}°", value),
            ComfortIndex::WindChill(value) => format!("Wind Chill: {}°", value),
        }
    }
}

/// Calculates the heat index in Celsius.
///
/// Uses the NOAA (Rothfusz) regression with Celsius coefficients. Returns
/// `None` outside the trigger domain `temp >= 26.7°C` and `humidity >= 40%`.
///
/// # Arguments
///
/// * 'temp' - temperature in Celsius
/// * 'humidity' - relative humidity in percentage
pub fn heat_index(temp: f64, humidity: f64) -> Option<i64> {
    if temp < HEAT_INDEX_MIN_TEMP_C || humidity < HEAT_INDEX_MIN_HUMIDITY {
        return None;
    }

    let t = temp;
    let h = humidity;
    let value = -8.784_694_755_56
        + 1.611_394_11 * t
        + 2.338_548_838_89 * h
        - 0.146_116_05 * t * h
        - 0.012_308_094 * t * t
        - 0.016_424_827_777_8 * h * h
        + 0.002_211_732 * t * t * h
        + 0.000_725_46 * t * h * h
        - 0.000_003_582 * t * t * h * h;

    Some(value.round() as i64)
}

/// Calculates the wind chill in Celsius.
///
/// Returns `None` outside the trigger domain `temp <= 10°C` and
/// `wind_speed >= 4.8`.
///
/// # Arguments
///
/// * 'temp' - temperature in Celsius
/// * 'wind_speed' - wind speed as reported by the provider
pub fn wind_chill(temp: f64, wind_speed: f64) -> Option<i64> {
    if temp > WIND_CHILL_MAX_TEMP_C || wind_speed < WIND_CHILL_MIN_WIND {
        return None;
    }

    let w = wind_speed.powf(0.16);
    let value = 13.12 + 0.6215 * temp - 11.37 * w + 0.3965 * temp * w;
    Some(value.round() as i64)
}

/// Picks the comfort correction for a reading, if any.
///
/// The heat-index and wind-chill domains are disjoint (26.7 > 10), so at
/// most one applies.
pub fn comfort_index(temp: f64, humidity: f64, wind_speed: f64) -> Option<ComfortIndex> {
    heat_index(temp, humidity)
        .map(ComfortIndex::HeatIndex)
        .or_else(|| wind_chill(temp, wind_speed).map(ComfortIndex::WindChill))
}

/// Rounded dew point, or `None` when the provider did not report one.
pub fn dew_point(raw: Option<f64>) -> Option<i64> {
    raw.map(|value| value.round() as i64)
}

/// Formats an optional dew point for display.
pub fn dew_point_label(dew_point: Option<i64>) -> String {
    match dew_point {
        Some(value) => format!("{}°", value),
        None => UNAVAILABLE_LABEL.to_string(),
    }
}

/// Eight-step approximation of the lunar phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoonPhase {
    New,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    Full,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    /// All phases in cycle order, starting at `New`.
    pub fn all() -> &'static [MoonPhase; 8] {
        &[
            MoonPhase::New,
            MoonPhase::WaxingCrescent,
            MoonPhase::FirstQuarter,
            MoonPhase::WaxingGibbous,
            MoonPhase::Full,
            MoonPhase::WaningGibbous,
            MoonPhase::LastQuarter,
            MoonPhase::WaningCrescent,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            MoonPhase::New => "New",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::Full => "Full",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::LastQuarter => "Last Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
        }
    }
}

/// Moon phase at the given epoch timestamp (seconds).
///
/// Timestamps before the reference new moon are folded into the cycle by the
/// Euclidean remainder, so the result is defined for every instant.
pub fn moon_phase(timestamp: i64) -> MoonPhase {
    let days = (timestamp - REFERENCE_NEW_MOON_EPOCH) as f64 / 86_400.0;
    let fraction = days.rem_euclid(SYNODIC_MONTH_DAYS) / SYNODIC_MONTH_DAYS;
    let index = (fraction * 8.0).round() as usize % 8;
    MoonPhase::all()[index]
}

/// Air-quality tier in 1-5, or 0 when the index is unknown or out of range.
pub fn aqi_tier(index: i64) -> u8 {
    match index {
        1..=5 => index as u8,
        _ => 0,
    }
}

/// Qualitative air-quality label; unknown indices yield `UNAVAILABLE_LABEL`.
pub fn aqi_label(index: i64) -> &'static str {
    match aqi_tier(index) {
        0 => UNAVAILABLE_LABEL,
        tier => AQI_LABELS[usize::from(tier) - 1],
    }
}

/// Maps a bearing in degrees to one of 8 compass points.
///
/// Periodic with period 360°: negative and oversized bearings wrap.
pub fn compass_direction(deg: f64) -> &'static str {
    let sector = (deg.rem_euclid(360.0) / 45.0).round() as usize % 8;
    COMPASS_POINTS[sector]
}

/// Meters to kilometers rounded to one decimal place.
pub fn visibility_km(meters: Option<f64>) -> Option<f64> {
    meters.map(|m| (m / 100.0).round() / 10.0)
}

pub fn visibility_label(meters: Option<f64>) -> String {
    match visibility_km(meters) {
        Some(km) => format!("{:.1} km", km),
        None => VISIBILITY_UNAVAILABLE_LABEL.to_string(),
    }
}

/// Coarse UV level: above 7 is `High`, above 5 is `Mod`, otherwise `Low`.
pub fn uv_level(uv_index: f64) -> &'static str {
    if uv_index > 7.0 {
        "High"
    } else if uv_index > 5.0 {
        "Mod"
    } else {
        "Low"
    }
}
