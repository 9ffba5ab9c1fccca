//! Command-line interface parsing for wxview
//!
//! This module handles parsing of CLI arguments using clap, merges them over
//! the optional TOML config file, and loads the payload files a run needs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{Config, ConfigError, OutfitSection};
use crate::data::{normalize_current, AirQualityPayload, CurrentPayload, ForecastPayload};
use crate::forecast::{ForecastError, ForecastOptions, PrecipDivisor, WeatherViews};
use crate::outfit::{OutfitClient, OutfitState, Units};

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The precipitation divisor name is not recognized
    #[error("Invalid precipitation divisor: '{0}'. Valid values: full-day, bucket-slots")]
    InvalidPrecipDivisor(String),

    /// The unit system name is not recognized
    #[error("Invalid units: '{0}'. Valid values: metric, imperial")]
    InvalidUnits(String),

    /// The config file could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A payload file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A payload file is not valid provider JSON
    #[error("Invalid payload in {}: {source}", .path.display())]
    InvalidPayload {
        path: PathBuf,
        #[source]
        source: ForecastError,
    },
}

/// wxview - Reduce weather payloads into forecast views
#[derive(Parser, Debug)]
#[command(name = "wxview")]
#[command(about = "Turn weather provider payloads into hourly, daily and current-conditions views")]
#[command(version)]
pub struct Cli {
    /// 3-hourly forecast payload (JSON file)
    #[arg(long, value_name = "FILE")]
    pub forecast: PathBuf,

    /// Current-weather payload (JSON file)
    #[arg(long, value_name = "FILE")]
    pub current: Option<PathBuf>,

    /// Air-pollution payload (JSON file)
    #[arg(long, value_name = "FILE")]
    pub air: Option<PathBuf>,

    /// Number of hourly rows
    #[arg(long, value_name = "N")]
    pub hours: Option<usize>,

    /// Number of upcoming days
    #[arg(long, value_name = "N")]
    pub days: Option<usize>,

    /// How daily precipitation is averaged
    ///
    /// Valid values: full-day, bucket-slots
    #[arg(long, value_name = "DIVISOR")]
    pub precip_divisor: Option<String>,

    /// Unit system the payloads were requested in (metric, imperial)
    #[arg(long, value_name = "UNITS")]
    pub units: Option<String>,

    /// TOML config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also request outfit ideas (needs --current and an API key)
    #[arg(long)]
    pub outfit: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses a precipitation divisor argument.
///
/// # Returns
/// * `Ok(PrecipDivisor)` if the string names a known policy
/// * `Err(CliError::InvalidPrecipDivisor)` otherwise
pub fn parse_precip_divisor_arg(s: &str) -> Result<PrecipDivisor, CliError> {
    PrecipDivisor::from_str(s).ok_or_else(|| CliError::InvalidPrecipDivisor(s.to_string()))
}

/// Parses a unit system argument.
pub fn parse_units_arg(s: &str) -> Result<Units, CliError> {
    Units::from_str(s).ok_or_else(|| CliError::InvalidUnits(s.to_string()))
}

/// Settings for one run, after merging CLI flags over the config file
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub forecast_path: PathBuf,
    pub current_path: Option<PathBuf>,
    pub air_path: Option<PathBuf>,
    pub options: ForecastOptions,
    /// Present when outfit ideas should be requested
    pub outfit: Option<OutfitSection>,
}

/// Payloads read from disk
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub forecast: ForecastPayload,
    pub current: Option<CurrentPayload>,
    pub air: Option<AirQualityPayload>,
}

/// JSON document printed by the binary
#[derive(Debug, Serialize)]
pub struct Report {
    #[serde(flatten)]
    pub views: WeatherViews,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outfit: Option<OutfitState>,
}

impl RunConfig {
    /// Creates a RunConfig from parsed CLI arguments, loading `--config` if given.
    ///
    /// # Returns
    /// * `Ok(RunConfig)` with flags applied over file values
    /// * `Err(CliError)` if the config file or a flag value is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let config = match &cli.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        Self::from_cli_with(cli, config)
    }

    /// Same as [`RunConfig::from_cli`] with an already loaded config.
    pub fn from_cli_with(cli: &Cli, config: Config) -> Result<Self, CliError> {
        let mut options = config.forecast.options();
        if let Some(hours) = cli.hours {
            options.hourly_count = hours;
        }
        if let Some(days) = cli.days {
            options.daily_days = days;
        }
        if let Some(divisor) = &cli.precip_divisor {
            options.precip_divisor = parse_precip_divisor_arg(divisor)?;
        }

        let mut outfit = config.outfit;
        if let Some(units) = &cli.units {
            outfit.units = parse_units_arg(units)?;
        }
        let outfit = (cli.outfit || outfit.enabled).then_some(outfit);

        Ok(RunConfig {
            forecast_path: cli.forecast.clone(),
            current_path: cli.current.clone(),
            air_path: cli.air.clone(),
            options,
            outfit,
        })
    }

    /// Reads and decodes every payload file named by the run.
    pub fn load_inputs(&self) -> Result<Inputs, CliError> {
        let forecast = read_payload(&self.forecast_path, ForecastPayload::from_json)?;
        let current = self
            .current_path
            .as_deref()
            .map(|path| read_payload(path, CurrentPayload::from_json))
            .transpose()?;
        let air = self
            .air_path
            .as_deref()
            .map(|path| read_payload(path, AirQualityPayload::from_json))
            .transpose()?;

        debug!(
            samples = forecast.list.len(),
            has_current = current.is_some(),
            has_air = air.is_some(),
            "loaded payloads"
        );
        Ok(Inputs {
            forecast,
            current,
            air,
        })
    }
}

fn read_payload<T>(
    path: &Path,
    decode: fn(&str) -> Result<T, serde_json::Error>,
) -> Result<T, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&text).map_err(|e| CliError::InvalidPayload {
        path: path.to_path_buf(),
        source: ForecastError::from(e),
    })
}

/// Requests outfit ideas for the current snapshot.
///
/// Never fails: a missing snapshot, a missing key or a failed request all
/// yield `OutfitState::Unavailable`.
pub async fn outfit_state(settings: &OutfitSection, current: Option<&CurrentPayload>) -> OutfitState {
    let Some(snapshot) = current.and_then(|payload| normalize_current(payload).ok()) else {
        warn!("outfit ideas need a current-weather payload");
        return OutfitState::unavailable();
    };

    let timeout = Duration::from_secs(settings.timeout_secs);
    let client = match OutfitClient::from_env(&settings.api_key_env, timeout) {
        Ok(client) => client
            .with_endpoint(settings.endpoint.clone())
            .with_model(settings.model.clone())
            .with_temperature(settings.temperature)
            .with_max_tokens(settings.max_tokens),
        Err(e) => {
            warn!(error = %e, "outfit client unavailable");
            return OutfitState::unavailable();
        }
    };

    client.recommend(&snapshot, settings.units).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_parse_precip_divisor_arg() {
        assert_eq!(
            parse_precip_divisor_arg("full-day").unwrap(),
            PrecipDivisor::FullDay
        );
        assert_eq!(
            parse_precip_divisor_arg("bucket-slots").unwrap(),
            PrecipDivisor::BucketSlots
        );
    }

    #[test]
    fn test_parse_precip_divisor_arg_invalid() {
        let err = parse_precip_divisor_arg("hourly").unwrap_err();
        assert!(err.to_string().contains("Invalid precipitation divisor"));
        assert!(err.to_string().contains("hourly"));
    }

    #[test]
    fn test_parse_units_arg() {
        assert_eq!(parse_units_arg("imperial").unwrap(), Units::Imperial);
        assert!(parse_units_arg("furlongs").is_err());
    }

    #[test]
    fn test_cli_parse_minimal() {
        let cli = Cli::parse_from(["wxview", "--forecast", "f.json"]);
        assert_eq!(cli.forecast, PathBuf::from("f.json"));
        assert!(cli.current.is_none());
        assert!(!cli.outfit);
    }

    #[test]
    fn test_cli_requires_forecast() {
        assert!(Cli::try_parse_from(["wxview"]).is_err());
    }

    #[test]
    fn test_run_config_defaults() {
        let cli = Cli::parse_from(["wxview", "--forecast", "f.json"]);
        let run = RunConfig::from_cli(&cli).unwrap();

        assert_eq!(run.options, ForecastOptions::default());
        assert!(run.outfit.is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        config.forecast.hourly_count = 8;
        config.forecast.daily_days = 5;

        let cli = Cli::parse_from([
            "wxview",
            "--forecast",
            "f.json",
            "--days",
            "2",
            "--precip-divisor",
            "bucket-slots",
        ]);
        let run = RunConfig::from_cli_with(&cli, config).unwrap();

        assert_eq!(run.options.hourly_count, 8);
        assert_eq!(run.options.daily_days, 2);
        assert_eq!(run.options.precip_divisor, PrecipDivisor::BucketSlots);
    }

    #[test]
    fn test_outfit_flag_enables_outfit() {
        let cli = Cli::parse_from(["wxview", "--forecast", "f.json", "--outfit", "--units", "imperial"]);
        let run = RunConfig::from_cli_with(&cli, Config::default()).unwrap();

        let outfit = run.outfit.expect("Outfit should be enabled");
        assert_eq!(outfit.units, Units::Imperial);
    }

    #[test]
    fn test_invalid_divisor_flag() {
        let cli = Cli::parse_from(["wxview", "--forecast", "f.json", "--precip-divisor", "x"]);
        assert!(matches!(
            RunConfig::from_cli(&cli),
            Err(CliError::InvalidPrecipDivisor(_))
        ));
    }

    #[test]
    fn test_config_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wxview.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[forecast]\nhourly_count = 6\n[outfit]\nenabled = true").unwrap();

        let cli = Cli::parse_from([
            "wxview",
            "--forecast",
            "f.json",
            "--config",
            path.to_str().unwrap(),
        ]);
        let run = RunConfig::from_cli(&cli).unwrap();
        assert_eq!(run.options.hourly_count, 6);
        assert!(run.outfit.is_some());
    }

    #[test]
    fn test_load_inputs_reports_path() {
        let dir = TempDir::new().unwrap();
        let forecast = dir.path().join("forecast.json");
        std::fs::write(&forecast, r#"{"list": []}"#).unwrap();
        let broken = dir.path().join("air.json");
        std::fs::write(&broken, "{not json").unwrap();

        let run = RunConfig {
            forecast_path: forecast,
            current_path: None,
            air_path: Some(broken),
            options: ForecastOptions::default(),
            outfit: None,
        };
        let err = run.load_inputs().unwrap_err();
        assert!(matches!(err, CliError::InvalidPayload { .. }));
        assert!(err.to_string().contains("air.json"));
    }

    #[test]
    fn test_load_inputs_missing_file() {
        let run = RunConfig {
            forecast_path: PathBuf::from("/nonexistent/forecast.json"),
            current_path: None,
            air_path: None,
            options: ForecastOptions::default(),
            outfit: None,
        };
        assert!(matches!(
            run.load_inputs(),
            Err(CliError::ReadInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_outfit_state_without_current_is_unavailable() {
        let state = outfit_state(&OutfitSection::default(), None).await;
        assert_eq!(state, OutfitState::unavailable());
    }
}
