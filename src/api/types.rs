//! Wire types for the query surface.

use crate::core::{Season, TariffSettings};
use serde::{Deserialize, Serialize};

/// Current tariff settings as served by `GET /settings`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub currency: String,
    pub day_rate: f64,
    pub night_rate: f64,
    pub seasons: Vec<Season>,
}

impl From<&TariffSettings> for SettingsView {
    fn from(settings: &TariffSettings) -> Self {
        Self {
            currency: settings.currency.clone(),
            day_rate: settings.day_rate,
            night_rate: settings.night_rate,
            seasons: settings.seasons.clone(),
        }
    }
}

/// Partial settings update accepted by `PUT /settings`.
///
/// Only present fields are applied; absent fields keep their value.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub currency: Option<String>,
    pub day_rate: Option<f64>,
    pub night_rate: Option<f64>,
    pub seasons: Option<Vec<Season>>,
}

impl SettingsUpdate {
    /// Apply the present fields onto existing settings
    pub fn apply_to(&self, settings: &mut TariffSettings) {
        if let Some(currency) = &self.currency {
            settings.currency = currency.clone();
        }
        if let Some(day_rate) = self.day_rate {
            settings.day_rate = day_rate;
        }
        if let Some(night_rate) = self.night_rate {
            settings.night_rate = night_rate;
        }
        if let Some(seasons) = &self.seasons {
            settings.seasons = seasons.clone();
        }
    }
}
