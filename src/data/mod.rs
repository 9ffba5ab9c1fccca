//! Core data models for wxview
//!
//! This module contains the canonical `Sample` extracted from provider records
//! and the view-model records handed to the presentation layer. Every record is
//! an immutable value built fresh for each pipeline run.

pub mod normalize;
pub mod payload;

pub use normalize::{normalize_current, normalize_sample, normalize_series, CurrentSnapshot};
pub use payload::{AirQualityPayload, CurrentPayload, ForecastPayload, RawSample};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse weather condition reported by the provider.
///
/// Provider strings outside the known set map to `Other` instead of falling
/// through to an arbitrary default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherMain {
    Clear,
    Clouds,
    Rain,
    Snow,
    Thunderstorm,
    Other,
}

impl WeatherMain {
    /// Maps a provider condition string (e.g. `"Clouds"`) to a variant.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    pub fn from_provider(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "clear" => WeatherMain::Clear,
            "clouds" => WeatherMain::Clouds,
            "rain" => WeatherMain::Rain,
            "snow" => WeatherMain::Snow,
            "thunderstorm" => WeatherMain::Thunderstorm,
            _ => WeatherMain::Other,
        }
    }

    /// Returns a human-readable label for the condition.
    pub fn label(&self) -> &'static str {
        match self {
            WeatherMain::Clear => "Clear",
            WeatherMain::Clouds => "Clouds",
            WeatherMain::Rain => "Rain",
            WeatherMain::Snow => "Snow",
            WeatherMain::Thunderstorm => "Thunderstorm",
            WeatherMain::Other => "Other",
        }
    }
}

/// A raw provider record is missing a field the pipeline cannot do without.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required field `{field}`")]
pub struct MalformedSampleError {
    /// Dotted path of the missing field in the provider record
    pub field: &'static str,
}

impl MalformedSampleError {
    pub fn missing(field: &'static str) -> Self {
        Self { field }
    }
}

/// One canonical meteorological sample.
///
/// Optional fields stay `None` when the provider did not report them, so
/// "not reported" is never confused with "reported as zero".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Observation or forecast instant (UTC)
    pub time: DateTime<Utc>,
    /// Temperature in Celsius
    pub temp_c: f64,
    /// Feels-like temperature in Celsius
    pub feels_like_c: f64,
    /// Minimum temperature for the slot in Celsius
    pub temp_min_c: f64,
    /// Maximum temperature for the slot in Celsius
    pub temp_max_c: f64,
    /// Relative humidity percentage (0-100)
    pub humidity_pct: u8,
    /// Station pressure in hPa
    pub pressure_hpa: f64,
    /// Sea-level pressure in hPa, if reported
    pub sea_level_hpa: Option<f64>,
    /// Ground-level pressure in hPa, if reported
    pub ground_level_hpa: Option<f64>,
    /// Coarse condition
    pub weather_main: WeatherMain,
    /// Free-text condition description
    pub description: String,
    /// Rain volume over the last 3 hours in mm
    pub precip_rain_3h: Option<f64>,
    /// Snow volume over the last 3 hours in mm
    pub precip_snow_3h: Option<f64>,
    /// Probability of precipitation (0.0-1.0), forecast samples only
    pub pop: Option<f64>,
    /// Wind speed in m/s
    pub wind_speed_ms: f64,
    /// Wind bearing in degrees clockwise from north, normalized to [0, 360)
    pub wind_deg: f64,
    /// Wind gust in m/s
    pub wind_gust_ms: Option<f64>,
    /// UV index
    pub uv_index: Option<f64>,
}

impl Sample {
    /// Epoch seconds of the sample instant.
    pub fn timestamp(&self) -> i64 {
        self.time.timestamp()
    }
}

/// One row of the hourly projection.
///
/// Numeric fields are passed through unrounded; rounding happens at the
/// presentation boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    /// Forecast instant (UTC)
    pub time: DateTime<Utc>,
    /// Local wall-clock label, `HH:MM`
    pub time_label: String,
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub weather_main: WeatherMain,
    pub description: String,
    /// Precipitation intensity as a percentage (0-100)
    pub precip_pct: u8,
    pub humidity_pct: u8,
    pub wind_speed_ms: f64,
    pub wind_deg: f64,
    pub uv_index: Option<f64>,
}

/// One calendar day of the daily aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Local calendar date of the bucket
    pub date: NaiveDate,
    /// Short weekday label, e.g. `Tue`
    pub calendar_date_label: String,
    /// Long weekday label, e.g. `Tuesday`
    pub weekday_label: String,
    /// Highest `temp_max_c` across the day
    pub high_c: f64,
    /// Lowest `temp_min_c` across the day
    pub low_c: f64,
    pub weather_main: WeatherMain,
    pub description: String,
    /// Precipitation over the day as a percentage (0-100)
    pub precip_pct: u8,
    pub humidity_pct: u8,
    pub wind_speed_ms: f64,
    pub wind_deg: f64,
    pub uv_index: Option<f64>,
    /// `High`, `Mod` or `Low` when a UV index is known
    pub uv_level: Option<String>,
    /// City sunrise, local `HH:MM`
    pub sunrise_label: Option<String>,
    /// City sunset, local `HH:MM`
    pub sunset_label: Option<String>,
    /// Number of samples that fell into this day
    pub sample_count: usize,
}

/// Comfort and astronomical indices derived from the current snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentDerived {
    /// `Heat Index: N°`, `Wind Chill: N°`, or absent
    pub comfort_label: Option<String>,
    /// Rounded dew point in Celsius; absent when the provider omitted it
    pub dew_point_c: Option<i64>,
    pub moon_phase_name: String,
    pub aqi_label: String,
    /// Air-quality tier 1-5, or 0 when unknown
    pub aqi_tier: u8,
    pub compass_direction: String,
}

/// Current-conditions view combining snapshot values and derived indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// `City, CC`
    pub place_label: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub time: DateTime<Utc>,
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub weather_main: WeatherMain,
    pub description: String,
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub sea_level_hpa: Option<f64>,
    pub ground_level_hpa: Option<f64>,
    pub wind_speed_ms: f64,
    pub wind_deg: f64,
    /// Rounded gust speed
    pub wind_gust_ms: Option<i64>,
    pub uv_index: Option<f64>,
    /// Visibility in kilometers with one decimal
    pub visibility_km: Option<f64>,
    /// `12.3 km` or `N/A`
    pub visibility_label: String,
    /// `1.2 mm` over the last hour
    pub rain_1h_label: Option<String>,
    pub snow_1h_label: Option<String>,
    /// Chance of precipitation from the first forecast slot
    pub precip_chance_pct: Option<u8>,
    pub sunrise_label: Option<String>,
    pub sunset_label: Option<String>,
    pub derived: CurrentDerived,
}
