//! Alert evaluation
//!
//! Re-checks the notification conditions on every tick. The cost and
//! device checks are level-triggered: they fire whenever the value is
//! nonzero, and the external flow/condition layer owns any threshold
//! comparison. The tariff-change check is edge-triggered and also keeps
//! the per-day transition counter.

use crate::core::{DeviceSnapshot, Tariff};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Events emitted to the external trigger/notification dispatcher
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertEvent {
    /// Current cost-per-hour figure with the power behind it
    CostPerHour { cost_per_hour: f64, total_power: f64 },
    /// Accumulated cost since local midnight
    DailyCost { cost_today: f64 },
    /// One per tracked device with nonzero draw
    HighPowerDevice {
        device_name: String,
        power: f64,
        cost_per_hour: f64,
    },
    /// Tariff transition, fired once per edge
    TariffChanged {
        previous_tariff: Tariff,
        new_tariff: Tariff,
        rate: f64,
    },
}

/// Values computed earlier in the same tick, fed to one evaluation pass
pub struct TickValues<'a> {
    pub tariff: Tariff,
    pub rate: f64,
    pub total_power: f64,
    pub cost_per_hour: f64,
    pub cost_today: f64,
    pub devices: &'a [DeviceSnapshot],
}

/// Alert condition state machine
pub struct AlertEvaluator {
    /// Tariff observed on the previous evaluation
    previous_tariff: Option<Tariff>,
    /// Tariff transitions seen today
    changes_today: u32,
    /// Calendar day the counter belongs to
    counter_date: Option<NaiveDate>,
}

impl AlertEvaluator {
    pub fn new() -> Self {
        Self {
            previous_tariff: None,
            changes_today: 0,
            counter_date: None,
        }
    }

    /// Tariff transitions observed today
    pub fn changes_today(&self) -> u32 {
        self.changes_today
    }

    /// Run all checks against the values of the current tick.
    ///
    /// Returns the events to emit, in a fixed order: cost-per-hour, daily
    /// cost, one high-power event per device, then the tariff edge.
    pub fn evaluate(&mut self, now: NaiveDateTime, values: &TickValues<'_>) -> Vec<AlertEvent> {
        if self.counter_date != Some(now.date()) {
            self.changes_today = 0;
            self.counter_date = Some(now.date());
        }

        let mut events = Vec::new();

        if values.cost_per_hour > 0.0 {
            events.push(AlertEvent::CostPerHour {
                cost_per_hour: values.cost_per_hour,
                total_power: values.total_power,
            });
        }

        if values.cost_today > 0.0 {
            events.push(AlertEvent::DailyCost {
                cost_today: values.cost_today,
            });
        }

        for device in values.devices {
            events.push(AlertEvent::HighPowerDevice {
                device_name: device.name.clone(),
                power: device.power,
                cost_per_hour: (device.power / 1000.0) * values.rate,
            });
        }

        if let Some(previous) = self.previous_tariff {
            if previous != values.tariff {
                self.changes_today += 1;
                events.push(AlertEvent::TariffChanged {
                    previous_tariff: previous,
                    new_tariff: values.tariff,
                    rate: values.rate,
                });
            }
        }
        self.previous_tariff = Some(values.tariff);

        events
    }
}

impl Default for AlertEvaluator {
    fn default() -> Self {
        Self::new()
    }
}
