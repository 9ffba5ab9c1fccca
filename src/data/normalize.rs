//! Sample normalization
//!
//! Validates raw provider records and extracts canonical `Sample`s. A record
//! lacking a required field is rejected; optional fields stay `None`.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::payload::{CurrentPayload, RawPrecip, RawSample};
use super::{MalformedSampleError, Sample, WeatherMain};
use crate::forecast::ForecastError;

/// Current-weather snapshot: the canonical sample plus location metadata and
/// the fields only the current endpoint reports.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentSnapshot {
    pub sample: Sample,
    pub city: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Relative humidity as reported, before the sample rounds it
    pub relative_humidity: f64,
    /// Visibility in meters
    pub visibility_m: Option<f64>,
    pub dew_point_c: Option<f64>,
    /// Rain over the last hour in mm
    pub rain_1h_mm: Option<f64>,
    /// Snow over the last hour in mm
    pub snow_1h_mm: Option<f64>,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
}

impl CurrentSnapshot {
    /// `City, CC`, falling back to whichever part is known.
    pub fn place_label(&self) -> String {
        match (self.city.as_deref(), self.country.as_deref()) {
            (Some(city), Some(country)) => format!("{}, {}", city, country),
            (Some(city), None) => city.to_string(),
            (None, Some(country)) => country.to_string(),
            (None, None) => "Unknown location".to_string(),
        }
    }
}

/// Extracts a `Sample` from one raw provider record.
///
/// # Returns
/// * `Ok(Sample)` - All required fields were present
/// * `Err(MalformedSampleError)` - Names the first missing required field
pub fn normalize_sample(raw: &RawSample) -> Result<Sample, MalformedSampleError> {
    let dt = raw.dt.ok_or(MalformedSampleError::missing("dt"))?;
    let time = DateTime::from_timestamp(dt, 0).ok_or(MalformedSampleError::missing("dt"))?;

    let main = raw
        .main
        .as_ref()
        .ok_or(MalformedSampleError::missing("main"))?;
    let temp_c = main.temp.ok_or(MalformedSampleError::missing("main.temp"))?;
    let feels_like_c = main
        .feels_like
        .ok_or(MalformedSampleError::missing("main.feels_like"))?;
    let temp_min_c = main
        .temp_min
        .ok_or(MalformedSampleError::missing("main.temp_min"))?;
    let temp_max_c = main
        .temp_max
        .ok_or(MalformedSampleError::missing("main.temp_max"))?;
    let humidity = main
        .humidity
        .ok_or(MalformedSampleError::missing("main.humidity"))?;
    let pressure_hpa = main
        .pressure
        .ok_or(MalformedSampleError::missing("main.pressure"))?;

    let condition = raw
        .weather
        .first()
        .ok_or(MalformedSampleError::missing("weather[0]"))?;
    let weather_main = condition
        .main
        .as_deref()
        .map(WeatherMain::from_provider)
        .ok_or(MalformedSampleError::missing("weather[0].main"))?;

    let wind = raw
        .wind
        .as_ref()
        .ok_or(MalformedSampleError::missing("wind"))?;
    let wind_speed_ms = wind
        .speed
        .ok_or(MalformedSampleError::missing("wind.speed"))?;
    let wind_deg = wind.deg.ok_or(MalformedSampleError::missing("wind.deg"))?;

    // a slot's minimum never exceeds its maximum
    let (temp_min_c, temp_max_c) = if temp_min_c > temp_max_c {
        (temp_max_c, temp_min_c)
    } else {
        (temp_min_c, temp_max_c)
    };

    Ok(Sample {
        time,
        temp_c,
        feels_like_c,
        temp_min_c,
        temp_max_c,
        humidity_pct: humidity.round().clamp(0.0, 100.0) as u8,
        pressure_hpa,
        sea_level_hpa: main.sea_level,
        ground_level_hpa: main.grnd_level,
        weather_main,
        description: condition.description.clone().unwrap_or_default(),
        precip_rain_3h: three_hour_volume(raw.rain.as_ref()),
        precip_snow_3h: three_hour_volume(raw.snow.as_ref()),
        pop: raw.pop,
        wind_speed_ms,
        wind_deg: wind_deg.rem_euclid(360.0),
        wind_gust_ms: wind.gust,
        uv_index: raw.uvi,
    })
}

/// Normalizes a whole forecast series, keeping arrival order.
///
/// One malformed record rejects the batch; records are never silently dropped.
pub fn normalize_series(raws: &[RawSample]) -> Result<Vec<Sample>, ForecastError> {
    let samples = raws
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            normalize_sample(raw).map_err(|source| ForecastError::MalformedSample { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = samples.len(), "normalized forecast samples");
    Ok(samples)
}

/// Normalizes the current-weather snapshot.
pub fn normalize_current(raw: &CurrentPayload) -> Result<CurrentSnapshot, MalformedSampleError> {
    let sample = normalize_sample(&raw.sample)?;
    let sys = raw.sys.as_ref();
    let coord = raw.coord.as_ref();
    let relative_humidity = raw
        .sample
        .main
        .as_ref()
        .and_then(|m| m.humidity)
        .unwrap_or_else(|| f64::from(sample.humidity_pct));

    Ok(CurrentSnapshot {
        sample,
        relative_humidity,
        city: raw.name.clone().filter(|name| !name.is_empty()),
        country: sys
            .and_then(|s| s.country.clone())
            .filter(|country| !country.is_empty()),
        latitude: coord.and_then(|c| c.lat),
        longitude: coord.and_then(|c| c.lon),
        visibility_m: raw.visibility,
        dew_point_c: raw.dew_point,
        rain_1h_mm: one_hour_volume(raw.sample.rain.as_ref()),
        snow_1h_mm: one_hour_volume(raw.sample.snow.as_ref()),
        sunrise: sys
            .and_then(|s| s.sunrise)
            .and_then(|ts| DateTime::from_timestamp(ts, 0)),
        sunset: sys
            .and_then(|s| s.sunset)
            .and_then(|ts| DateTime::from_timestamp(ts, 0)),
    })
}

fn three_hour_volume(precip: Option<&RawPrecip>) -> Option<f64> {
    precip.and_then(|p| p.three_hours)
}

fn one_hour_volume(precip: Option<&RawPrecip>) -> Option<f64> {
    precip.and_then(|p| p.one_hour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::payload::{RawCondition, RawMain, RawWind};

    fn raw_sample() -> RawSample {
        RawSample {
            dt: Some(1760886000),
            main: Some(RawMain {
                temp: Some(14.2),
                feels_like: Some(13.5),
                temp_min: Some(13.9),
                temp_max: Some(14.6),
                humidity: Some(72.0),
                pressure: Some(1012.0),
                sea_level: None,
                grnd_level: None,
            }),
            wind: Some(RawWind {
                speed: Some(4.1),
                deg: Some(230.0),
                gust: None,
            }),
            weather: vec![RawCondition {
                main: Some("Rain".to_string()),
                description: Some("light rain".to_string()),
            }],
            pop: Some(0.64),
            rain: Some(RawPrecip {
                one_hour: None,
                three_hours: Some(0.42),
            }),
            snow: None,
            uvi: None,
        }
    }

    #[test]
    fn test_normalize_complete_sample() {
        let sample = normalize_sample(&raw_sample()).expect("Sample should normalize");

        assert_eq!(sample.timestamp(), 1760886000);
        assert!((sample.temp_c - 14.2).abs() < 0.01);
        assert!((sample.temp_max_c - 14.6).abs() < 0.01);
        assert_eq!(sample.humidity_pct, 72);
        assert_eq!(sample.weather_main, WeatherMain::Rain);
        assert_eq!(sample.description, "light rain");
        assert_eq!(sample.precip_rain_3h, Some(0.42));
        assert_eq!(sample.pop, Some(0.64));
    }

    #[test]
    fn test_optional_fields_stay_absent() {
        let sample = normalize_sample(&raw_sample()).expect("Sample should normalize");

        assert!(sample.wind_gust_ms.is_none());
        assert!(sample.uv_index.is_none());
        assert!(sample.sea_level_hpa.is_none());
        assert!(sample.ground_level_hpa.is_none());
        assert!(sample.precip_snow_3h.is_none());
    }

    #[test]
    fn test_reported_zero_is_kept_as_zero() {
        let mut raw = raw_sample();
        raw.uvi = Some(0.0);
        raw.snow = Some(RawPrecip {
            one_hour: None,
            three_hours: Some(0.0),
        });

        let sample = normalize_sample(&raw).expect("Sample should normalize");
        assert_eq!(sample.uv_index, Some(0.0));
        assert_eq!(sample.precip_snow_3h, Some(0.0));
    }

    #[test]
    fn test_missing_timestamp_is_malformed() {
        let mut raw = raw_sample();
        raw.dt = None;
        assert_eq!(
            normalize_sample(&raw),
            Err(MalformedSampleError::missing("dt"))
        );
    }

    #[test]
    fn test_missing_temp_is_malformed() {
        let mut raw = raw_sample();
        if let Some(main) = raw.main.as_mut() {
            main.temp = None;
        }
        assert_eq!(
            normalize_sample(&raw),
            Err(MalformedSampleError::missing("main.temp"))
        );
    }

    #[test]
    fn test_missing_weather_main_is_malformed() {
        let mut raw = raw_sample();
        raw.weather.clear();
        assert_eq!(
            normalize_sample(&raw),
            Err(MalformedSampleError::missing("weather[0]"))
        );

        let mut raw = raw_sample();
        raw.weather[0].main = None;
        assert_eq!(
            normalize_sample(&raw),
            Err(MalformedSampleError::missing("weather[0].main"))
        );
    }

    #[test]
    fn test_missing_description_defaults_to_empty() {
        let mut raw = raw_sample();
        raw.weather[0].description = None;
        let sample = normalize_sample(&raw).expect("Sample should normalize");
        assert_eq!(sample.description, "");
    }

    #[test]
    fn test_wind_bearing_is_normalized() {
        let mut raw = raw_sample();
        if let Some(wind) = raw.wind.as_mut() {
            wind.deg = Some(370.0);
        }
        let sample = normalize_sample(&raw).expect("Sample should normalize");
        assert!((sample.wind_deg - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_humidity_is_clamped() {
        let mut raw = raw_sample();
        if let Some(main) = raw.main.as_mut() {
            main.humidity = Some(104.0);
        }
        let sample = normalize_sample(&raw).expect("Sample should normalize");
        assert_eq!(sample.humidity_pct, 100);
    }

    #[test]
    fn test_inverted_min_max_is_reordered() {
        let mut raw = raw_sample();
        if let Some(main) = raw.main.as_mut() {
            main.temp_min = Some(16.0);
            main.temp_max = Some(12.0);
        }
        let sample = normalize_sample(&raw).expect("Sample should normalize");
        assert!((sample.temp_min_c - 12.0).abs() < 0.01);
        assert!((sample.temp_max_c - 16.0).abs() < 0.01);
    }

    #[test]
    fn test_series_rejects_batch_with_index() {
        let mut bad = raw_sample();
        bad.main = None;
        let raws = vec![raw_sample(), bad, raw_sample()];

        match normalize_series(&raws) {
            Err(ForecastError::MalformedSample { index, source }) => {
                assert_eq!(index, 1);
                assert_eq!(source.field, "main");
            }
            other => panic!("Expected MalformedSample error, got {:?}", other),
        }
    }

    #[test]
    fn test_series_keeps_arrival_order() {
        let mut later = raw_sample();
        later.dt = Some(1760896800);
        let raws = vec![later, raw_sample()];

        let samples = normalize_series(&raws).expect("Series should normalize");
        assert_eq!(samples[0].timestamp(), 1760896800);
        assert_eq!(samples[1].timestamp(), 1760886000);
    }

    #[test]
    fn test_normalize_current_snapshot() {
        let json = r#"{
            "coord": {"lon": -123.12, "lat": 49.28},
            "weather": [{"main": "Snow", "description": "light snow"}],
            "main": {"temp": -1.0, "feels_like": -4.0, "temp_min": -2.0, "temp_max": 0.5,
                     "pressure": 1020, "humidity": 90},
            "wind": {"speed": 3.0, "deg": 10, "gust": 6.4},
            "snow": {"1h": 0.25},
            "dt": 1760900000,
            "sys": {"country": "CA", "sunrise": 1760884440, "sunset": 1760922600},
            "name": "Vancouver"
        }"#;
        let payload = CurrentPayload::from_json(json).expect("Failed to parse");
        let snapshot = normalize_current(&payload).expect("Snapshot should normalize");

        assert_eq!(snapshot.place_label(), "Vancouver, CA");
        assert_eq!(snapshot.snow_1h_mm, Some(0.25));
        assert!(snapshot.rain_1h_mm.is_none());
        assert!(snapshot.dew_point_c.is_none());
        assert_eq!(snapshot.sample.wind_gust_ms, Some(6.4));
        assert_eq!(snapshot.sunrise.map(|t| t.timestamp()), Some(1760884440));
    }

    #[test]
    fn test_place_label_fallbacks() {
        let mut snapshot = normalize_current(&CurrentPayload {
            sample: raw_sample(),
            ..Default::default()
        })
        .expect("Snapshot should normalize");
        assert_eq!(snapshot.place_label(), "Unknown location");

        snapshot.city = Some("Oslo".to_string());
        assert_eq!(snapshot.place_label(), "Oslo");
    }
}
