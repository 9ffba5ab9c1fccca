//! Hourly projection of the leading forecast samples.

use std::fmt::Display;

use chrono::TimeZone;

use super::{local_time_label, volume_to_pct};
use crate::data::{HourlyForecast, Sample};

/// Default number of rows in the hourly projection.
pub const DEFAULT_HOURLY_COUNT: usize = 4;

/// Precipitation percentage for one sample.
///
/// Rain takes precedence when both volumes are reported; a sample with
/// neither reports 0.
pub fn precip_pct(sample: &Sample) -> u8 {
    match (sample.precip_rain_3h, sample.precip_snow_3h) {
        (Some(rain), _) => volume_to_pct(rain),
        (None, Some(snow)) => volume_to_pct(snow),
        (None, None) => 0,
    }
}

/// Maps the first `count` samples, in arrival order, to hourly rows.
pub fn project_hourly<Tz>(samples: &[Sample], count: usize, tz: &Tz) -> Vec<HourlyForecast>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    samples
        .iter()
        .take(count)
        .map(|sample| HourlyForecast {
            time: sample.time,
            time_label: local_time_label(sample.time, tz),
            temp_c: sample.temp_c,
            feels_like_c: sample.feels_like_c,
            weather_main: sample.weather_main,
            description: sample.description.clone(),
            precip_pct: precip_pct(sample),
            humidity_pct: sample.humidity_pct,
            wind_speed_ms: sample.wind_speed_ms,
            wind_deg: sample.wind_deg,
            uv_index: sample.uv_index,
        })
        .collect()
}
