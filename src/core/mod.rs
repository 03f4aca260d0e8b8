//! Core module - Configuration, errors, and common types

mod config;
mod error;
mod types;

pub use config::{Config, GeneralConfig, TariffSettings};
pub use error::{Error, Result};
pub use types::{DeviceSnapshot, EngineSnapshot, HistorySample, Season, Tariff, TariffState};
