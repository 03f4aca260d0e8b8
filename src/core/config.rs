//! Configuration management

use crate::core::{Error, Result, Season};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub tariff: TariffSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            tariff: TariffSettings::default(),
        }
    }
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        let app_config_dir = config_dir.join("tariff-monitor");

        if !app_config_dir.exists() {
            fs::create_dir_all(&app_config_dir)?;
        }

        Ok(app_config_dir.join("config.toml"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Evaluation tick period in seconds
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: u64,
    /// Address the query API listens on
    #[serde(default = "default_api_listen")]
    pub api_listen: String,
    /// Delay between device registry bootstrap retries in seconds
    #[serde(default = "default_registry_retry_seconds")]
    pub registry_retry_seconds: u64,
}

fn default_tick_seconds() -> u64 { 60 }
fn default_api_listen() -> String { "127.0.0.1:8990".to_string() }
fn default_registry_retry_seconds() -> u64 { 30 }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            tick_seconds: default_tick_seconds(),
            api_listen: default_api_listen(),
            registry_retry_seconds: default_registry_retry_seconds(),
        }
    }
}

/// Tariff settings: rates, currency, and the ordered season list.
///
/// The first structurally matching season wins; overlapping or malformed
/// ranges are accepted as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffSettings {
    /// Day rate per kWh
    #[serde(default = "default_day_rate")]
    pub day_rate: f64,
    /// Night rate per kWh
    #[serde(default = "default_night_rate")]
    pub night_rate: f64,
    /// Currency code (EUR, USD, GBP, etc.)
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Ordered season definitions
    #[serde(default = "default_seasons")]
    pub seasons: Vec<Season>,
}

fn default_day_rate() -> f64 { 0.12 }
fn default_night_rate() -> f64 { 0.06 }
fn default_currency() -> String { "EUR".to_string() }

fn default_seasons() -> Vec<Season> {
    vec![
        Season {
            name: "Winter".to_string(),
            start_month: 11,
            start_day: 1,
            end_month: 3,
            end_day: 31,
            day_start: "06:00".to_string(),
            day_end: "22:00".to_string(),
        },
        Season {
            name: "Summer".to_string(),
            start_month: 4,
            start_day: 1,
            end_month: 10,
            end_day: 31,
            day_start: "07:00".to_string(),
            day_end: "23:00".to_string(),
        },
    ]
}

impl Default for TariffSettings {
    fn default() -> Self {
        Self {
            day_rate: default_day_rate(),
            night_rate: default_night_rate(),
            currency: default_currency(),
            seasons: default_seasons(),
        }
    }
}
