//! Configuration file support
//!
//! Settings are read from an optional TOML file. Every section and field has a
//! default, so an empty file (or no file at all) yields `Config::default()`.
//!
//! ```toml
//! [forecast]
//! hourly_count = 4
//! daily_days = 3
//! precip_divisor = "full_day"
//!
//! [outfit]
//! enabled = true
//! units = "metric"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::forecast::{ForecastOptions, PrecipDivisor};
use crate::outfit::{self, Units};

/// Default environment variable holding the outfit API key
pub const DEFAULT_API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Default outfit request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the file failed
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for this schema
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid config value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub forecast: ForecastSection,
    pub outfit: OutfitSection,
}

/// `[forecast]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSection {
    /// Rows in the hourly projection
    pub hourly_count: usize,
    /// Upcoming days in the daily aggregation
    pub daily_days: usize,
    /// Daily precipitation averaging policy
    pub precip_divisor: PrecipDivisor,
}

impl Default for ForecastSection {
    fn default() -> Self {
        let options = ForecastOptions::default();
        Self {
            hourly_count: options.hourly_count,
            daily_days: options.daily_days,
            precip_divisor: options.precip_divisor,
        }
    }
}

impl ForecastSection {
    pub fn options(&self) -> ForecastOptions {
        ForecastOptions {
            hourly_count: self.hourly_count,
            daily_days: self.daily_days,
            precip_divisor: self.precip_divisor,
        }
    }
}

/// `[outfit]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutfitSection {
    /// Request outfit ideas after building the views
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    /// Sampling temperature, 0.0 to 2.0
    pub temperature: f64,
    pub max_tokens: u32,
    /// Environment variable holding the bearer token
    pub api_key_env: String,
    /// Unit system the payloads were requested in
    pub units: Units,
    pub timeout_secs: u64,
}

impl Default for OutfitSection {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: outfit::DEFAULT_ENDPOINT.to_string(),
            model: outfit::DEFAULT_MODEL.to_string(),
            temperature: outfit::DEFAULT_TEMPERATURE,
            max_tokens: outfit::DEFAULT_MAX_TOKENS,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            units: Units::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to a TOML file
    ///
    /// # Returns
    /// * `Ok(Config)` - Parsed and validated configuration
    /// * `Err(ConfigError)` - If the file cannot be read, parsed or validated
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Check value ranges the type system cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let outfit = &self.outfit;
        if !(0.0..=2.0).contains(&outfit.temperature) {
            return Err(ConfigError::Invalid {
                field: "outfit.temperature",
                message: format!("{} is outside 0.0..=2.0", outfit.temperature),
            });
        }
        if outfit.max_tokens == 0 {
            return Err(ConfigError::Invalid {
                field: "outfit.max_tokens",
                message: "must be greater than 0".to_string(),
            });
        }
        if outfit.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "outfit.timeout_secs",
                message: "must be greater than 0".to_string(),
            });
        }
        if outfit.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "outfit.endpoint",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
