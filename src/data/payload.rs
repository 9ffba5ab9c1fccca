//! Raw weather provider payloads
//!
//! These structs mirror the JSON shape of the provider's current-weather,
//! forecast and air-pollution responses. Every leaf is optional so that a
//! missing field surfaces as a `MalformedSampleError` from the normalizer
//! instead of an opaque decode failure for the whole document.

use serde::Deserialize;

/// One record of the provider's `list` (or the body of the current snapshot).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSample {
    /// Epoch seconds, UTC
    pub dt: Option<i64>,
    pub main: Option<RawMain>,
    pub wind: Option<RawWind>,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
    /// Probability of precipitation, 0.0-1.0
    pub pop: Option<f64>,
    pub rain: Option<RawPrecip>,
    pub snow: Option<RawPrecip>,
    pub uvi: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawMain {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub sea_level: Option<f64>,
    pub grnd_level: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawWind {
    pub speed: Option<f64>,
    pub deg: Option<f64>,
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawCondition {
    pub main: Option<String>,
    pub description: Option<String>,
}

/// Precipitation volume block, keyed by accumulation window.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawPrecip {
    #[serde(rename = "1h")]
    pub one_hour: Option<f64>,
    #[serde(rename = "3h")]
    pub three_hours: Option<f64>,
}

/// Current-weather response: a sample plus location and snapshot-only fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CurrentPayload {
    #[serde(flatten)]
    pub sample: RawSample,
    pub name: Option<String>,
    pub sys: Option<RawSys>,
    pub coord: Option<RawCoord>,
    /// Visibility in meters
    pub visibility: Option<f64>,
    pub dew_point: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSys {
    pub country: Option<String>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawCoord {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Forecast response: fixed-cadence samples plus city metadata.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ForecastPayload {
    #[serde(default)]
    pub list: Vec<RawSample>,
    pub city: Option<RawCity>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawCity {
    pub name: Option<String>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

/// Air-pollution response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AirQualityPayload {
    #[serde(default)]
    pub list: Vec<AirQualityEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AirQualityEntry {
    pub main: Option<AirQualityMain>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AirQualityMain {
    pub aqi: Option<i64>,
}

impl AirQualityPayload {
    /// AQI index of the first entry, or 0 when the payload carries none.
    pub fn aqi_index(&self) -> i64 {
        self.list
            .first()
            .and_then(|entry| entry.main.as_ref())
            .and_then(|main| main.aqi)
            .unwrap_or(0)
    }
}

impl ForecastPayload {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl CurrentPayload {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl AirQualityPayload {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORECAST_RESPONSE: &str = r#"{
        "cod": "200",
        "cnt": 2,
        "list": [
            {
                "dt": 1760886000,
                "main": {
                    "temp": 14.2, "feels_like": 13.5, "temp_min": 13.9, "temp_max": 14.2,
                    "pressure": 1012, "sea_level": 1012, "grnd_level": 1008, "humidity": 72
                },
                "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
                "wind": {"speed": 4.1, "deg": 230, "gust": 7.9},
                "pop": 0.64,
                "rain": {"3h": 0.42}
            },
            {
                "dt": 1760896800,
                "main": {
                    "temp": 12.8, "feels_like": 12.0, "temp_min": 12.8, "temp_max": 12.8,
                    "pressure": 1013, "humidity": 80
                },
                "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04n"}],
                "wind": {"speed": 3.2, "deg": 250},
                "pop": 0.1
            }
        ],
        "city": {"id": 6173331, "name": "Vancouver", "sunrise": 1760884440, "sunset": 1760922600}
    }"#;

    #[test]
    fn test_parse_forecast_response() {
        let forecast = ForecastPayload::from_json(FORECAST_RESPONSE).expect("Failed to parse");

        assert_eq!(forecast.list.len(), 2);
        let first = &forecast.list[0];
        assert_eq!(first.dt, Some(1760886000));
        let main = first.main.as_ref().unwrap();
        assert!((main.temp.unwrap() - 14.2).abs() < 0.01);
        assert_eq!(main.grnd_level, Some(1008.0));
        assert_eq!(first.weather[0].main.as_deref(), Some("Rain"));
        assert_eq!(first.rain.as_ref().unwrap().three_hours, Some(0.42));
        assert_eq!(first.rain.as_ref().unwrap().one_hour, None);

        let second = &forecast.list[1];
        assert!(second.rain.is_none());
        assert!(second.wind.as_ref().unwrap().gust.is_none());

        let city = forecast.city.unwrap();
        assert_eq!(city.sunrise, Some(1760884440));
        assert_eq!(city.name.as_deref(), Some("Vancouver"));
    }

    #[test]
    fn test_parse_current_response_flattens_sample() {
        let json = r#"{
            "coord": {"lon": -123.12, "lat": 49.28},
            "weather": [{"main": "Clear", "description": "clear sky"}],
            "main": {"temp": 18.0, "feels_like": 17.4, "temp_min": 16.0, "temp_max": 19.5,
                     "pressure": 1018, "humidity": 55},
            "visibility": 10000,
            "wind": {"speed": 2.5, "deg": 300},
            "snow": {"1h": 0.3},
            "dt": 1760900000,
            "sys": {"country": "CA", "sunrise": 1760884440, "sunset": 1760922600},
            "name": "Vancouver"
        }"#;

        let current = CurrentPayload::from_json(json).expect("Failed to parse");
        assert_eq!(current.sample.dt, Some(1760900000));
        assert_eq!(current.name.as_deref(), Some("Vancouver"));
        assert_eq!(current.visibility, Some(10000.0));
        assert_eq!(current.sample.snow.unwrap().one_hour, Some(0.3));
        assert!(current.dew_point.is_none());
        assert_eq!(current.coord.unwrap().lat, Some(49.28));
    }

    #[test]
    fn test_air_quality_index_of_first_entry() {
        let json = r#"{"coord": {"lon": 0, "lat": 0}, "list": [{"main": {"aqi": 3}, "components": {}}]}"#;
        let air = AirQualityPayload::from_json(json).expect("Failed to parse");
        assert_eq!(air.aqi_index(), 3);
    }

    #[test]
    fn test_air_quality_index_defaults_to_zero() {
        let air = AirQualityPayload::from_json(r#"{"list": []}"#).expect("Failed to parse");
        assert_eq!(air.aqi_index(), 0);

        let air = AirQualityPayload::from_json(r#"{"list": [{}]}"#).expect("Failed to parse");
        assert_eq!(air.aqi_index(), 0);
    }

    #[test]
    fn test_parse_malformed_json() {
        let result = ForecastPayload::from_json("{ invalid json }");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_list_parses_as_empty() {
        let forecast = ForecastPayload::from_json(r#"{"city": null}"#).expect("Failed to parse");
        assert!(forecast.list.is_empty());
        assert!(forecast.city.is_none());
    }
}
