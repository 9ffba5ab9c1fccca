//! Temporal grouping of samples into local calendar days.

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone};
use tracing::{debug, warn};

use crate::data::Sample;

/// Default number of upcoming days in the daily aggregation.
pub const DEFAULT_DAILY_DAYS: usize = 3;

/// Samples sharing one local calendar date, in chronological order.
///
/// Never empty when produced by [`group_by_day`].
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket<'a> {
    pub date: NaiveDate,
    pub samples: Vec<&'a Sample>,
}

/// Local calendar date of a sample.
pub fn local_date<Tz: TimeZone>(sample: &Sample, tz: &Tz) -> NaiveDate {
    sample.time.with_timezone(tz).date_naive()
}

/// Buckets every sample by local calendar date.
///
/// Samples are stable-sorted by time first, so out-of-order input yields the
/// same buckets as ordered input and equal timestamps keep arrival order.
pub fn bucket_by_local_date<'a, Tz: TimeZone>(
    samples: &'a [Sample],
    tz: &Tz,
) -> BTreeMap<NaiveDate, Vec<&'a Sample>> {
    let mut ordered: Vec<&Sample> = samples.iter().collect();
    if !ordered.windows(2).all(|pair| pair[0].time <= pair[1].time) {
        warn!("forecast samples arrived out of order, sorting by time");
        ordered.sort_by_key(|sample| sample.time);
    }

    let mut buckets: BTreeMap<NaiveDate, Vec<&Sample>> = BTreeMap::new();
    for sample in ordered {
        buckets.entry(local_date(sample, tz)).or_default().push(sample);
    }
    buckets
}

/// Groups samples into the next `max_days` local days strictly after `today`.
///
/// The partial current day (and anything earlier) is dropped.
pub fn group_by_day<'a, Tz: TimeZone>(
    samples: &'a [Sample],
    tz: &Tz,
    today: NaiveDate,
    max_days: usize,
) -> Vec<DayBucket<'a>> {
    let buckets: Vec<DayBucket<'a>> = bucket_by_local_date(samples, tz)
        .into_iter()
        .filter(|(date, _)| *date > today)
        .take(max_days)
        .map(|(date, samples)| DayBucket { date, samples })
        .collect();

    debug!(days = buckets.len(), %today, "grouped samples into days");
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::WeatherMain;
    use chrono::{DateTime, FixedOffset, Utc};

    /// 2025-10-19T00:00:00Z
    const DAY0: i64 = 1_760_832_000;
    const SLOT: i64 = 3 * 3600;

    fn sample_at(ts: i64) -> Sample {
        Sample {
            time: DateTime::from_timestamp(ts, 0).unwrap(),
            temp_c: 10.0,
            feels_like_c: 9.0,
            temp_min_c: 9.5,
            temp_max_c: 10.5,
            humidity_pct: 70,
            pressure_hpa: 1015.0,
            sea_level_hpa: None,
            ground_level_hpa: None,
            weather_main: WeatherMain::Clear,
            description: "clear sky".to_string(),
            precip_rain_3h: None,
            precip_snow_3h: None,
            pop: None,
            wind_speed_ms: 2.0,
            wind_deg: 90.0,
            wind_gust_ms: None,
            uv_index: None,
        }
    }

    /// Five days of 3-hour slots starting at DAY0 + 15:00.
    fn five_day_series() -> Vec<Sample> {
        (0..40).map(|i| sample_at(DAY0 + 15 * 3600 + i * SLOT)).collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_buckets_by_utc_date() {
        let samples = five_day_series();
        let buckets = bucket_by_local_date(&samples, &Utc);

        assert_eq!(buckets.len(), 6);
        assert_eq!(buckets[&date(2025, 10, 19)].len(), 3);
        assert_eq!(buckets[&date(2025, 10, 20)].len(), 8);
        assert_eq!(buckets.values().map(Vec::len).sum::<usize>(), 40);
        assert!(buckets.values().all(|b| !b.is_empty()));
    }

    #[test]
    fn test_bucket_key_follows_local_offset() {
        // 02:00 UTC on the 20th is still the 19th in UTC-7
        let samples = vec![sample_at(DAY0 + 26 * 3600)];
        let pdt = FixedOffset::west_opt(7 * 3600).unwrap();

        assert_eq!(local_date(&samples[0], &Utc), date(2025, 10, 20));
        assert_eq!(local_date(&samples[0], &pdt), date(2025, 10, 19));
    }

    #[test]
    fn test_group_skips_today_and_limits_days() {
        let samples = five_day_series();
        let days = group_by_day(&samples, &Utc, date(2025, 10, 19), 3);

        let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
        assert_eq!(
            dates,
            vec![date(2025, 10, 20), date(2025, 10, 21), date(2025, 10, 22)]
        );
        assert!(days.iter().all(|d| d.samples.len() == 8));
    }

    #[test]
    fn test_group_preserves_order_within_bucket() {
        let samples = five_day_series();
        let days = group_by_day(&samples, &Utc, date(2025, 10, 19), 1);

        let times: Vec<i64> = days[0].samples.iter().map(|s| s.timestamp()).collect();
        let mut sorted = times.clone();
        sorted.sort();
        assert_eq!(times, sorted);
        assert_eq!(times[0], DAY0 + 86_400);
    }

    #[test]
    fn test_group_sorts_out_of_order_input() {
        let mut samples = five_day_series();
        samples.reverse();
        let ordered = five_day_series();

        let shuffled = group_by_day(&samples, &Utc, date(2025, 10, 19), 3);
        let expected = group_by_day(&ordered, &Utc, date(2025, 10, 19), 3);
        assert_eq!(shuffled, expected);
    }

    #[test]
    fn test_equal_timestamps_keep_arrival_order() {
        let mut first = sample_at(DAY0 + 86_400 + 12 * 3600);
        first.description = "first".to_string();
        let mut second = first.clone();
        second.description = "second".to_string();
        let earlier = sample_at(DAY0 + 86_400 + 9 * 3600);
        let samples = vec![first, second, earlier];

        let days = group_by_day(&samples, &Utc, date(2025, 10, 19), 3);
        let descriptions: Vec<&str> = days[0]
            .samples
            .iter()
            .map(|s| s.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["clear sky", "first", "second"]);
    }

    #[test]
    fn test_group_with_only_today_is_empty() {
        let samples: Vec<Sample> = (0..3).map(|i| sample_at(DAY0 + 15 * 3600 + i * SLOT)).collect();
        assert!(group_by_day(&samples, &Utc, date(2025, 10, 19), 3).is_empty());
    }

    #[test]
    fn test_group_with_past_today_returns_all_days() {
        let samples = five_day_series();
        let days = group_by_day(&samples, &Utc, date(2025, 10, 1), 10);
        assert_eq!(days.len(), 6);
    }
}
