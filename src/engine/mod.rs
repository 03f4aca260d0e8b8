//! Tariff monitoring engine
//!
//! One owned instance ties the pieces together: the season/tariff
//! schedule, the cost accumulator, the alert evaluator, and the history
//! buffer. A periodic tick drives the full evaluation cycle; settings
//! changes trigger an out-of-cadence tariff refresh. All capability and
//! event writes are fire-and-forget: failures are logged and never abort
//! the rest of the tick.

use crate::alerts::{AlertEvaluator, AlertEvent, TickValues};
use crate::core::{DeviceSnapshot, EngineSnapshot, HistorySample, Result, TariffSettings, TariffState};
use crate::history::HistoryBuffer;
use crate::meter::CostMeter;
use crate::tariff::{minute_of_day, TariffSchedule};
use chrono::{Datelike, NaiveDateTime};

/// Named capability outputs written each tick
pub trait OutputSink: Send + Sync {
    fn set_number(&self, name: &str, value: f64) -> Result<()>;
    fn set_text(&self, name: &str, value: &str) -> Result<()>;
}

/// Destination for alert events, consumed by an external dispatcher
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &AlertEvent) -> Result<()>;
}

/// Output sink that writes capability values to the log
pub struct LogOutputSink;

impl OutputSink for LogOutputSink {
    fn set_number(&self, name: &str, value: f64) -> Result<()> {
        log::debug!("output {} = {:.4}", name, value);
        Ok(())
    }

    fn set_text(&self, name: &str, value: &str) -> Result<()> {
        log::debug!("output {} = {}", name, value);
        Ok(())
    }
}

/// Event sink that logs emitted events as JSON
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: &AlertEvent) -> Result<()> {
        match serde_json::to_string(event) {
            Ok(json) => log::info!("event {}", json),
            Err(e) => log::warn!("Failed to serialize event: {}", e),
        }
        Ok(())
    }
}

struct TariffFigures {
    state: TariffState,
    minutes_until_change: u32,
    peak_hours_remaining: f64,
    offpeak_hours_remaining: f64,
    daily_average_rate: f64,
}

/// The tariff and cost accounting engine.
///
/// Collaborators interact only through the public operations here; there
/// is no ambient global state.
pub struct TariffMonitor {
    schedule: TariffSchedule,
    meter: CostMeter,
    alerts: AlertEvaluator,
    history: HistoryBuffer,
    outputs: Box<dyn OutputSink>,
    events: Box<dyn EventSink>,
    snapshot: EngineSnapshot,
}

impl TariffMonitor {
    /// Build an engine anchored at `now` with the given collaborators
    pub fn new(
        settings: &TariffSettings,
        now: NaiveDateTime,
        outputs: Box<dyn OutputSink>,
        events: Box<dyn EventSink>,
    ) -> Self {
        let schedule = TariffSchedule::new(settings);
        let mut engine = Self {
            meter: CostMeter::new(now),
            alerts: AlertEvaluator::new(),
            history: HistoryBuffer::new(),
            snapshot: empty_snapshot(now),
            schedule,
            outputs,
            events,
        };
        engine.refresh_tariff(now);
        engine
    }

    /// Run one full evaluation cycle.
    ///
    /// Resolves the tariff state, integrates power since the previous tick
    /// into the cost figures, evaluates the alert conditions, records a
    /// history sample, and publishes all outputs and events.
    pub fn tick(&mut self, now: NaiveDateTime, devices: Vec<DeviceSnapshot>) {
        let figures = self.resolve_figures(now);
        let total_power: f64 = devices.iter().map(|d| d.power).filter(|p| *p > 0.0).sum();

        let reading = self.meter.tick(now, total_power, figures.state.rate);

        let events = self.alerts.evaluate(
            now,
            &TickValues {
                tariff: figures.state.tariff,
                rate: figures.state.rate,
                total_power,
                cost_per_hour: reading.cost_per_hour,
                cost_today: reading.cost_today,
                devices: &devices,
            },
        );

        self.history.append(HistorySample {
            timestamp: now.and_utc().timestamp(),
            power: total_power,
            cost_per_hour: reading.cost_per_hour,
            cost_today: reading.cost_today,
        });

        self.snapshot = EngineSnapshot {
            timestamp: now.and_utc().timestamp(),
            season: figures.state.season,
            tariff: figures.state.tariff,
            rate: figures.state.rate,
            minutes_until_change: figures.minutes_until_change,
            peak_hours_remaining: figures.peak_hours_remaining,
            offpeak_hours_remaining: figures.offpeak_hours_remaining,
            daily_average_rate: figures.daily_average_rate,
            tariff_changes_today: self.alerts.changes_today(),
            total_power,
            cost_per_hour: reading.cost_per_hour,
            cost_today: reading.cost_today,
            month_estimate: reading.month_estimate,
            devices,
        };

        self.publish_tariff_outputs();
        self.publish_cost_outputs();

        for event in &events {
            if let Err(e) = self.events.emit(event) {
                log::warn!("Failed to emit event: {}", e);
            }
        }
    }

    /// Out-of-cadence tariff refresh, run when settings change.
    ///
    /// Recomputes and republishes the tariff state without touching the
    /// cost accumulator; the tariff-change edge is detected on the next
    /// regular tick.
    pub fn refresh_tariff(&mut self, now: NaiveDateTime) {
        let figures = self.resolve_figures(now);

        self.snapshot.timestamp = now.and_utc().timestamp();
        self.snapshot.season = figures.state.season;
        self.snapshot.tariff = figures.state.tariff;
        self.snapshot.rate = figures.state.rate;
        self.snapshot.minutes_until_change = figures.minutes_until_change;
        self.snapshot.peak_hours_remaining = figures.peak_hours_remaining;
        self.snapshot.offpeak_hours_remaining = figures.offpeak_hours_remaining;
        self.snapshot.daily_average_rate = figures.daily_average_rate;

        self.publish_tariff_outputs();
    }

    /// Replace the tariff settings and refresh the published state
    pub fn apply_settings(&mut self, settings: &TariffSettings, now: NaiveDateTime) {
        self.schedule.update_settings(settings);
        self.refresh_tariff(now);
    }

    /// Settings currently backing the schedule
    pub fn settings(&self) -> &TariffSettings {
        self.schedule.settings()
    }

    /// The most recently computed engine state
    pub fn snapshot(&self) -> &EngineSnapshot {
        &self.snapshot
    }

    /// Recorded history samples, oldest first
    pub fn history(&self) -> Vec<HistorySample> {
        self.history.snapshot()
    }

    fn resolve_figures(&self, now: NaiveDateTime) -> TariffFigures {
        let state = self.schedule.state_at(now);
        let minute = minute_of_day(now);

        match self.schedule.resolve_season(now.month(), now.day()) {
            Some(season) => TariffFigures {
                minutes_until_change: self.schedule.minutes_until_change(season, minute),
                peak_hours_remaining: self.schedule.peak_hours_remaining(season, minute),
                offpeak_hours_remaining: self.schedule.offpeak_hours_remaining(season, minute),
                daily_average_rate: self.schedule.daily_average_rate(season),
                state,
            },
            // No seasons configured: no window to measure against
            None => TariffFigures {
                minutes_until_change: 0,
                peak_hours_remaining: 0.0,
                offpeak_hours_remaining: 0.0,
                daily_average_rate: self.schedule.settings().day_rate,
                state,
            },
        }
    }

    fn publish_tariff_outputs(&self) {
        let s = &self.snapshot;
        self.write_text("tariff", s.tariff.as_str());
        self.write_text("season", s.season.as_deref().unwrap_or(""));
        self.write_number("tariff_rate", s.rate);
        self.write_number("tariff_change_minutes", f64::from(s.minutes_until_change));
        self.write_number("peak_hours_remaining", s.peak_hours_remaining);
        self.write_number("offpeak_hours_remaining", s.offpeak_hours_remaining);
        self.write_number("daily_average_rate", s.daily_average_rate);
        self.write_number("tariff_changes_today", f64::from(s.tariff_changes_today));
    }

    fn publish_cost_outputs(&self) {
        let s = &self.snapshot;
        self.write_number("power_total", s.total_power);
        self.write_number("cost_per_hour", s.cost_per_hour);
        self.write_number("cost_today", s.cost_today);
        self.write_number("cost_month_estimate", s.month_estimate);
    }

    fn write_number(&self, name: &str, value: f64) {
        if let Err(e) = self.outputs.set_number(name, value) {
            log::warn!("Failed to write output {}: {}", name, e);
        }
    }

    fn write_text(&self, name: &str, value: &str) {
        if let Err(e) = self.outputs.set_text(name, value) {
            log::warn!("Failed to write output {}: {}", name, e);
        }
    }
}

fn empty_snapshot(now: NaiveDateTime) -> EngineSnapshot {
    EngineSnapshot {
        timestamp: now.and_utc().timestamp(),
        season: None,
        tariff: crate::core::Tariff::Day,
        rate: 0.0,
        minutes_until_change: 0,
        peak_hours_remaining: 0.0,
        offpeak_hours_remaining: 0.0,
        daily_average_rate: 0.0,
        tariff_changes_today: 0,
        total_power: 0.0,
        cost_per_hour: 0.0,
        cost_today: 0.0,
        month_estimate: 0.0,
        devices: Vec::new(),
    }
}
