//! End-to-end engine scenarios driving the public library API.

use chrono::{NaiveDate, NaiveDateTime};
use std::sync::{Arc, Mutex};

use tariff_monitor_lib::alerts::AlertEvent;
use tariff_monitor_lib::core::{DeviceSnapshot, Result, Tariff, TariffSettings};
use tariff_monitor_lib::engine::{EventSink, OutputSink, TariffMonitor};

#[derive(Clone, Default)]
struct RecordingSinks {
    outputs: Arc<Mutex<Vec<(String, String)>>>,
    events: Arc<Mutex<Vec<AlertEvent>>>,
}

impl OutputSink for RecordingSinks {
    fn set_number(&self, name: &str, value: f64) -> Result<()> {
        self.outputs
            .lock()
            .unwrap()
            .push((name.to_string(), format!("{}", value)));
        Ok(())
    }

    fn set_text(&self, name: &str, value: &str) -> Result<()> {
        self.outputs
            .lock()
            .unwrap()
            .push((name.to_string(), value.to_string()));
        Ok(())
    }
}

impl EventSink for RecordingSinks {
    fn emit(&self, event: &AlertEvent) -> Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(hh, mm, 0)
        .unwrap()
}

fn heater(power: f64) -> DeviceSnapshot {
    DeviceSnapshot {
        id: "heater".to_string(),
        name: "Heater".to_string(),
        power,
    }
}

fn make_engine(anchor: NaiveDateTime) -> (TariffMonitor, RecordingSinks) {
    let sinks = RecordingSinks::default();
    let engine = TariffMonitor::new(
        &TariffSettings::default(),
        anchor,
        Box::new(sinks.clone()),
        Box::new(sinks.clone()),
    );
    (engine, sinks)
}

#[test]
fn winter_morning_scenario() {
    // Seasons: Winter Nov 1 - Mar 31 06:00-22:00, Summer Apr 1 - Oct 31
    // 07:00-23:00; rates 0.12 / 0.06. At Jan 15 08:00 the engine must sit
    // in the winter day tariff, 840 minutes from the next change.
    let (mut engine, _) = make_engine(at(2024, 1, 15, 7, 0));

    engine.tick(at(2024, 1, 15, 8, 0), vec![heater(2000.0)]);

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.season.as_deref(), Some("Winter"));
    assert_eq!(snapshot.tariff, Tariff::Day);
    assert_eq!(snapshot.rate, 0.12);
    assert_eq!(snapshot.minutes_until_change, 840);

    // 2000 W held for exactly one hour at 0.12/kWh
    assert!((snapshot.cost_today - 0.24).abs() < 1e-9);
}

#[test]
fn tariff_transition_emits_single_edge() {
    let (mut engine, sinks) = make_engine(at(2024, 1, 15, 21, 58));

    engine.tick(at(2024, 1, 15, 21, 59), vec![heater(500.0)]);
    engine.tick(at(2024, 1, 15, 22, 0), vec![heater(500.0)]);
    engine.tick(at(2024, 1, 15, 22, 1), vec![heater(500.0)]);

    let events = sinks.events.lock().unwrap();
    let edges: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, AlertEvent::TariffChanged { .. }))
        .collect();
    assert_eq!(edges.len(), 1);
    assert_eq!(
        *edges[0],
        AlertEvent::TariffChanged {
            previous_tariff: Tariff::Day,
            new_tariff: Tariff::Night,
            rate: 0.06,
        }
    );
    assert_eq!(engine.snapshot().tariff_changes_today, 1);
}

#[test]
fn midnight_rollover_resets_daily_figures() {
    let (mut engine, _) = make_engine(at(2024, 1, 15, 23, 0));

    engine.tick(at(2024, 1, 15, 23, 58), vec![heater(2000.0)]);
    let before = engine.snapshot().cost_today;
    assert!(before > 0.0);

    // Two minutes later the day has advanced: only the first post-midnight
    // increment survives the reset.
    engine.tick(at(2024, 1, 16, 0, 0), vec![heater(2000.0)]);
    let after = engine.snapshot().cost_today;
    let expected = 2.0 * (2.0 / 60.0) * 0.06;
    assert!((after - expected).abs() < 1e-9);
    assert!(after < before);
}

#[test]
fn cost_events_fire_every_tick_with_consumption() {
    let (mut engine, sinks) = make_engine(at(2024, 1, 15, 8, 0));

    for minute in 1..=5 {
        engine.tick(at(2024, 1, 15, 8, minute), vec![heater(1000.0)]);
    }

    let events = sinks.events.lock().unwrap();
    let cost_events = events
        .iter()
        .filter(|e| matches!(e, AlertEvent::CostPerHour { .. }))
        .count();
    assert_eq!(cost_events, 5);
}

#[test]
fn history_records_every_tick_oldest_first() {
    let (mut engine, _) = make_engine(at(2024, 1, 15, 0, 0));

    for minute in 0..90 {
        engine.tick(
            at(2024, 1, 15, 1 + minute / 60, minute % 60),
            vec![heater(300.0)],
        );
    }

    let history = engine.history();
    assert_eq!(history.len(), 90);
    assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn settings_update_applies_to_subsequent_ticks() {
    let (mut engine, _) = make_engine(at(2024, 1, 15, 8, 0));
    engine.tick(at(2024, 1, 15, 8, 1), vec![heater(1000.0)]);
    assert_eq!(engine.snapshot().rate, 0.12);

    let updated = TariffSettings {
        day_rate: 0.40,
        ..TariffSettings::default()
    };
    engine.apply_settings(&updated, at(2024, 1, 15, 8, 1));
    assert_eq!(engine.snapshot().rate, 0.40);

    // One hour at 1 kW now accrues at the new day rate
    let before = engine.snapshot().cost_today;
    engine.tick(at(2024, 1, 15, 9, 1), vec![heater(1000.0)]);
    let accrued = engine.snapshot().cost_today - before;
    assert!((accrued - 0.40).abs() < 1e-9);
}

#[test]
fn summer_schedule_uses_its_own_day_window() {
    let (mut engine, _) = make_engine(at(2024, 7, 4, 6, 0));

    // 06:30 is night in summer (day starts 07:00) but day in winter
    engine.tick(at(2024, 7, 4, 6, 30), vec![]);

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.season.as_deref(), Some("Summer"));
    assert_eq!(snapshot.tariff, Tariff::Night);
    assert_eq!(snapshot.rate, 0.06);
    assert_eq!(snapshot.minutes_until_change, 30);
}
