//! Forecast reduction pipeline
//!
//! Turns raw provider payloads into the three view models consumed by the
//! presentation layer: the hourly projection, the daily aggregation and the
//! current-conditions view. The pipeline is a pure function of its inputs.

pub mod current;
pub mod daily;
pub mod grouping;
pub mod hourly;

pub use current::current_conditions;
pub use daily::{aggregate_days, CityTimes};
pub use grouping::{group_by_day, DayBucket};
pub use hourly::project_hourly;

use std::fmt::Display;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::data::{
    normalize_current, normalize_series, AirQualityPayload, CurrentConditions, CurrentPayload,
    DailyForecast, ForecastPayload, HourlyForecast, MalformedSampleError,
};

/// Errors that can occur while building the views
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A forecast record lacks a required field; the whole batch is rejected
    #[error("Malformed forecast sample at index {index}: {source}")]
    MalformedSample {
        index: usize,
        #[source]
        source: MalformedSampleError,
    },

    /// The current-weather snapshot lacks a required field
    #[error("Malformed current snapshot: {0}")]
    MalformedCurrent(#[source] MalformedSampleError),

    /// Failed to parse JSON payload
    #[error("Failed to parse JSON payload: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How the daily precipitation sum is averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrecipDivisor {
    /// Divide by the 8 three-hour slots of a full day
    #[default]
    FullDay,
    /// Divide by the number of slots actually in the bucket
    BucketSlots,
}

impl PrecipDivisor {
    /// Parses `full-day` / `bucket-slots` (underscores accepted too).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<PrecipDivisor> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "full-day" | "full" => Some(PrecipDivisor::FullDay),
            "bucket-slots" | "bucket" => Some(PrecipDivisor::BucketSlots),
            _ => None,
        }
    }
}

/// Knobs for the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForecastOptions {
    /// Number of leading samples in the hourly projection
    pub hourly_count: usize,
    /// Number of upcoming days in the daily aggregation
    pub daily_days: usize,
    pub precip_divisor: PrecipDivisor,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            hourly_count: hourly::DEFAULT_HOURLY_COUNT,
            daily_days: grouping::DEFAULT_DAILY_DAYS,
            precip_divisor: PrecipDivisor::default(),
        }
    }
}

/// All view models produced from one set of payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherViews {
    pub hourly: Vec<HourlyForecast>,
    pub daily: Vec<DailyForecast>,
    pub current: Option<CurrentConditions>,
}

/// Runs the full pipeline.
///
/// # Arguments
/// * `forecast` - Forecast series payload
/// * `current` - Current-weather snapshot, if fetched
/// * `air` - Air-pollution payload, if fetched
/// * `options` - Projection sizes and precipitation policy
/// * `tz` - Time zone that defines local hours and calendar days
/// * `today` - Local date of the caller; days up to and including it are skipped
///
/// # Returns
/// * `Ok(WeatherViews)` - The derived views
/// * `Err(ForecastError)` - If any sample is malformed
pub fn build_views<Tz>(
    forecast: &ForecastPayload,
    current: Option<&CurrentPayload>,
    air: Option<&AirQualityPayload>,
    options: &ForecastOptions,
    tz: &Tz,
    today: NaiveDate,
) -> Result<WeatherViews, ForecastError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let samples = normalize_series(&forecast.list)?;

    let hourly = project_hourly(&samples, options.hourly_count, tz);

    let buckets = group_by_day(&samples, tz, today, options.daily_days);
    let city = CityTimes::from_payload(forecast.city.as_ref(), tz);
    let daily = aggregate_days(&buckets, &city, options.precip_divisor, tz);

    let aqi_index = air.map(AirQualityPayload::aqi_index).unwrap_or(0);
    let current = current
        .map(|payload| {
            normalize_current(payload)
                .map(|snapshot| current_conditions(&snapshot, samples.first(), aqi_index, tz))
                .map_err(ForecastError::MalformedCurrent)
        })
        .transpose()?;

    info!(
        samples = samples.len(),
        hourly = hourly.len(),
        daily = daily.len(),
        has_current = current.is_some(),
        "built weather views"
    );

    Ok(WeatherViews {
        hourly,
        daily,
        current,
    })
}

/// Formats an instant as local wall-clock `HH:MM`.
pub fn local_time_label<Tz>(time: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.with_timezone(tz).format("%H:%M").to_string()
}

/// Converts a volume in mm to a percentage, clamped to [0, 100].
pub(crate) fn volume_to_pct(volume: f64) -> u8 {
    (volume * 100.0).round().clamp(0.0, 100.0) as u8
}
