//! Cost accumulator
//!
//! Integrates aggregated instantaneous power draw over elapsed wall-clock
//! time into a running daily cost, an instantaneous cost-per-hour figure,
//! and a monthly projection. The daily figure resets exactly once when the
//! local calendar day advances.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Accumulated cost state owned by one engine instance
pub struct CostMeter {
    /// Cost accrued since local midnight
    cost_today: f64,
    /// Timestamp of the previous tick
    last_update: NaiveDateTime,
    /// Calendar day the accumulator currently belongs to
    reset_date: NaiveDate,
}

/// Figures computed by one accumulator tick
#[derive(Debug, Clone, Copy)]
pub struct CostReading {
    /// Cost accrued since local midnight
    pub cost_today: f64,
    /// Instantaneous cost per hour at the current power and rate
    pub cost_per_hour: f64,
    /// Projected cost for the current month
    pub month_estimate: f64,
}

impl CostMeter {
    /// Create a fresh accumulator anchored at the given timestamp
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            cost_today: 0.0,
            last_update: now,
            reset_date: now.date(),
        }
    }

    /// Advance the accumulator to `now`.
    ///
    /// The cost increment is `(watts/1000) * elapsed_hours * rate`, with the
    /// rate resolved at `now` applied to the whole elapsed interval. When
    /// the calendar day has advanced, the daily figure is zeroed before the
    /// increment is added, so only pre-midnight accrual is discarded.
    pub fn tick(&mut self, now: NaiveDateTime, total_watts: f64, rate: f64) -> CostReading {
        let dt_hours = (now - self.last_update).num_milliseconds() as f64 / 3_600_000.0;
        let kilowatts = total_watts / 1000.0;
        let increment = kilowatts * dt_hours * rate;

        if now.date() != self.reset_date {
            self.cost_today = 0.0;
            self.reset_date = now.date();
        }

        self.cost_today += increment;
        self.last_update = now;

        CostReading {
            cost_today: self.cost_today,
            cost_per_hour: kilowatts * rate,
            month_estimate: self.month_estimate(now),
        }
    }

    /// Cost accrued since local midnight
    pub fn cost_today(&self) -> f64 {
        self.cost_today
    }

    /// Project the monthly cost from today's accrual so far.
    ///
    /// Extrapolates today's cost over 24 hours and multiplies by the length
    /// of the current month. The projection is unstable right after the
    /// daily reset, when the elapsed-hours denominator is small.
    fn month_estimate(&self, now: NaiveDateTime) -> f64 {
        let hours_elapsed = f64::from(now.hour()) + f64::from(now.minute()) / 60.0;
        let daily_projection = if hours_elapsed > 0.0 {
            (self.cost_today / hours_elapsed) * 24.0
        } else {
            0.0
        };

        daily_projection * f64::from(days_in_month(now.date()))
    }
}

/// Number of days in the month the date falls in
fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = (date.year(), date.month());
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    first_of_next
        .and_then(|d| d.pred_opt())
        .map_or(30, |d| d.day())
}
