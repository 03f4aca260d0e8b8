//! Common types used across the application

use serde::{Deserialize, Serialize};
use std::fmt;

/// The active price period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tariff {
    Day,
    Night,
}

impl Tariff {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tariff::Day => "day",
            Tariff::Night => "night",
        }
    }
}

impl fmt::Display for Tariff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calendar date range with its own day/night time boundaries.
///
/// Field names follow the settings JSON shape. Date ranges may wrap across
/// the year boundary (`start_month > end_month`). No validation is applied:
/// out-of-range days of month are matched by plain numeric comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub name: String,
    /// Range start, 1-12
    pub start_month: u32,
    /// Range start day of month, 1-31
    pub start_day: u32,
    /// Range end, 1-12
    pub end_month: u32,
    /// Range end day of month, 1-31
    pub end_day: u32,
    /// Day tariff window start (HH:MM)
    #[serde(default = "default_day_start")]
    pub day_start: String,
    /// Day tariff window end (HH:MM)
    #[serde(default = "default_day_end")]
    pub day_end: String,
}

fn default_day_start() -> String {
    "06:00".to_string()
}

fn default_day_end() -> String {
    "22:00".to_string()
}

/// Resolved tariff state, recomputed every tick from the season schedule,
/// the configured rates, and the wall clock. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffState {
    /// Name of the matched season, if any season is configured
    pub season: Option<String>,
    /// Active price period
    pub tariff: Tariff,
    /// Applicable rate in currency/kWh
    pub rate: f64,
}

/// A single tracked device as seen at one tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub id: String,
    pub name: String,
    /// Instantaneous power draw in watts
    pub power: f64,
}

/// One periodic sample recorded for charting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySample {
    /// Unix timestamp of the tick
    pub timestamp: i64,
    /// Total tracked power in watts
    pub power: f64,
    /// Instantaneous cost per hour at that power and rate
    pub cost_per_hour: f64,
    /// Accumulated cost for the calendar day so far
    pub cost_today: f64,
}

/// Everything the engine computed on its most recent evaluation.
///
/// This is the record published to the output sink each tick and served
/// by the `/state` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Unix timestamp of the evaluation
    pub timestamp: i64,
    /// Matched season name, if any
    pub season: Option<String>,
    /// Active price period
    pub tariff: Tariff,
    /// Applicable rate in currency/kWh
    pub rate: f64,
    /// Minutes until the next tariff change
    pub minutes_until_change: u32,
    /// Day-tariff hours left before midnight
    pub peak_hours_remaining: f64,
    /// Night-tariff hours left before midnight
    pub offpeak_hours_remaining: f64,
    /// Time-weighted mean rate over a full day
    pub daily_average_rate: f64,
    /// Number of tariff transitions observed today
    pub tariff_changes_today: u32,
    /// Sum of tracked device power in watts
    pub total_power: f64,
    /// Instantaneous cost per hour
    pub cost_per_hour: f64,
    /// Accumulated cost since local midnight
    pub cost_today: f64,
    /// Projected cost for the current month
    pub month_estimate: f64,
    /// Tracked devices with nonzero power, highest draw first
    pub devices: Vec<DeviceSnapshot>,
}
