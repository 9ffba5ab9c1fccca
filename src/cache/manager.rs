//! Single-entry view cache
//!
//! Provides a `ViewCache` that keeps the most recent pipeline result together
//! with the inputs that produced it, and hands it back on an equal input.

use std::fmt::Display;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tracing::debug;

use crate::data::{AirQualityPayload, CurrentPayload, ForecastPayload};
use crate::forecast::{build_views, ForecastError, ForecastOptions, WeatherViews};

/// Inputs that fully determine a `WeatherViews` for a fixed time zone
#[derive(Debug, Clone, PartialEq)]
struct CacheKey {
    forecast: ForecastPayload,
    current: Option<CurrentPayload>,
    air: Option<AirQualityPayload>,
    options: ForecastOptions,
    today: NaiveDate,
}

impl CacheKey {
    fn matches(
        &self,
        forecast: &ForecastPayload,
        current: Option<&CurrentPayload>,
        air: Option<&AirQualityPayload>,
        options: &ForecastOptions,
        today: NaiveDate,
    ) -> bool {
        self.today == today
            && self.options == *options
            && self.current.as_ref() == current
            && self.air.as_ref() == air
            && self.forecast == *forecast
    }
}

/// Stored entry
#[derive(Debug)]
struct CacheEntry {
    key: CacheKey,
    views: WeatherViews,
    cached_at: DateTime<Utc>,
}

/// Result of a cache lookup, including metadata about where it came from
#[derive(Debug)]
pub struct CachedViews<'a> {
    /// The computed views
    pub views: &'a WeatherViews,
    /// When the views were computed
    pub cached_at: DateTime<Utc>,
    /// Whether the views were reused rather than recomputed
    pub is_hit: bool,
}

/// Memoizes the last computed views.
///
/// Use one cache per time zone: the zone is not part of the key.
#[derive(Debug, Default)]
pub struct ViewCache {
    entry: Option<CacheEntry>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached views for equal inputs, or builds and stores them.
    ///
    /// # Returns
    /// * `Ok(CachedViews)` with `is_hit = true` when the inputs matched the last run
    /// * `Err(ForecastError)` if building fails; the previous entry is discarded
    pub fn get_or_build<Tz>(
        &mut self,
        forecast: &ForecastPayload,
        current: Option<&CurrentPayload>,
        air: Option<&AirQualityPayload>,
        options: &ForecastOptions,
        tz: &Tz,
        today: NaiveDate,
    ) -> Result<CachedViews<'_>, ForecastError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let (entry, is_hit) = match self.entry.take() {
            Some(entry) if entry.key.matches(forecast, current, air, options, today) => {
                debug!("view cache hit");
                (entry, true)
            }
            _ => {
                let views = build_views(forecast, current, air, options, tz, today)?;
                let entry = CacheEntry {
                    key: CacheKey {
                        forecast: forecast.clone(),
                        current: current.cloned(),
                        air: air.cloned(),
                        options: options.clone(),
                        today,
                    },
                    views,
                    cached_at: Utc::now(),
                };
                (entry, false)
            }
        };

        let entry = self.entry.insert(entry);
        Ok(CachedViews {
            views: &entry.views,
            cached_at: entry.cached_at,
            is_hit,
        })
    }

    /// Drops the stored entry.
    pub fn clear(&mut self) {
        self.entry = None;
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}
