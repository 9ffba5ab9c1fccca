//! Daily aggregation of day buckets.
//!
//! Each bucket folds into one `DailyForecast`: high/low across the day, a
//! precipitation percentage, and the condition/humidity/wind/UV of a single
//! representative sample taken as close to local noon as possible.

use std::fmt::Display;
use std::ops::RangeInclusive;

use chrono::{DateTime, TimeZone, Timelike};

use super::grouping::DayBucket;
use super::{local_time_label, volume_to_pct, PrecipDivisor};
use crate::data::payload::RawCity;
use crate::data::{DailyForecast, Sample};
use crate::metrics::uv_level;

/// Three-hour slots in a full day.
pub const FULL_DAY_SLOTS: usize = 8;

/// Local hours eligible to represent a day.
pub const NOON_WINDOW: RangeInclusive<u32> = 10..=14;

const NOON_HOUR: i64 = 12;

/// City-level sunrise/sunset labels shared by every day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityTimes {
    pub sunrise_label: Option<String>,
    pub sunset_label: Option<String>,
}

impl CityTimes {
    pub fn from_payload<Tz>(city: Option<&RawCity>, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let label = |ts: Option<i64>| {
            ts.and_then(|ts| DateTime::from_timestamp(ts, 0))
                .map(|time| local_time_label(time, tz))
        };
        Self {
            sunrise_label: label(city.and_then(|c| c.sunrise)),
            sunset_label: label(city.and_then(|c| c.sunset)),
        }
    }
}

/// Picks the sample closest to local noon within [`NOON_WINDOW`].
///
/// Ties go to the earlier sample in the bucket. Falls back to the first
/// sample when none lies in the window.
pub fn representative_sample<'a, Tz: TimeZone>(
    samples: &[&'a Sample],
    tz: &Tz,
) -> Option<&'a Sample> {
    samples
        .iter()
        .copied()
        .filter_map(|sample| {
            let hour = sample.time.with_timezone(tz).hour();
            NOON_WINDOW
                .contains(&hour)
                .then(|| (sample, (i64::from(hour) - NOON_HOUR).abs()))
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(sample, _)| sample)
        .or_else(|| samples.first().copied())
}

/// Daily precipitation percentage.
///
/// Sums rain and snow volumes across the bucket and averages over the slot
/// count chosen by `divisor`.
pub fn daily_precip_pct(samples: &[&Sample], divisor: PrecipDivisor) -> u8 {
    let slots = match divisor {
        PrecipDivisor::FullDay => FULL_DAY_SLOTS,
        PrecipDivisor::BucketSlots => samples.len(),
    };
    if slots == 0 {
        return 0;
    }

    let total: f64 = samples
        .iter()
        .map(|s| s.precip_rain_3h.unwrap_or(0.0) + s.precip_snow_3h.unwrap_or(0.0))
        .sum();
    volume_to_pct(total / slots as f64)
}

/// Reduces one bucket. Returns `None` only for an empty bucket.
///
/// Condition, humidity and wind come from the representative sample. An empty
/// representative description falls back to the first sample's. UV comes from
/// the representative sample, else the first sample in the bucket that reports
/// one, rather than strictly the first sample.
pub fn aggregate_day<Tz: TimeZone>(
    bucket: &DayBucket<'_>,
    city: &CityTimes,
    divisor: PrecipDivisor,
    tz: &Tz,
) -> Option<DailyForecast> {
    let first = *bucket.samples.first()?;
    let representative = representative_sample(&bucket.samples, tz).unwrap_or(first);

    let high_c = bucket
        .samples
        .iter()
        .map(|s| s.temp_max_c)
        .fold(f64::NEG_INFINITY, f64::max);
    let low_c = bucket
        .samples
        .iter()
        .map(|s| s.temp_min_c)
        .fold(f64::INFINITY, f64::min);

    let uv_index = representative
        .uv_index
        .or_else(|| bucket.samples.iter().find_map(|s| s.uv_index));

    Some(DailyForecast {
        date: bucket.date,
        calendar_date_label: bucket.date.format("%a").to_string(),
        weekday_label: bucket.date.format("%A").to_string(),
        high_c,
        low_c,
        weather_main: representative.weather_main,
        description: if representative.description.is_empty() {
            first.description.clone()
        } else {
            representative.description.clone()
        },
        precip_pct: daily_precip_pct(&bucket.samples, divisor),
        humidity_pct: representative.humidity_pct,
        wind_speed_ms: representative.wind_speed_ms,
        wind_deg: representative.wind_deg,
        uv_index,
        uv_level: uv_index.map(|uv| uv_level(uv).to_string()),
        sunrise_label: city.sunrise_label.clone(),
        sunset_label: city.sunset_label.clone(),
        sample_count: bucket.samples.len(),
    })
}

/// Reduces every bucket, keeping bucket order.
pub fn aggregate_days<Tz: TimeZone>(
    buckets: &[DayBucket<'_>],
    city: &CityTimes,
    divisor: PrecipDivisor,
    tz: &Tz,
) -> Vec<DailyForecast> {
    buckets
        .iter()
        .filter_map(|bucket| aggregate_day(bucket, city, divisor, tz))
        .collect()
}
