//! Tariff Monitor - Demo CLI
//!
//! Drives the engine against the simulated device registry for half a
//! minute and prints the tariff state and accumulating cost figures.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use chrono::Local;

// Import from our library
use tariff_monitor_lib::core::TariffSettings;
use tariff_monitor_lib::devices::{DeviceInfo, DeviceRegistry, PowerCache, SimulatedRegistry};
use tariff_monitor_lib::engine::{LogEventSink, LogOutputSink, TariffMonitor};

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("==============================================");
    println!("   Tariff Monitor - Demo CLI");
    println!("==============================================\n");

    // 1. Tariff settings
    println!("[1/3] Loading tariff settings...");
    let settings = TariffSettings::default();
    println!("      Day rate:   {:.2} {}/kWh", settings.day_rate, settings.currency);
    println!("      Night rate: {:.2} {}/kWh", settings.night_rate, settings.currency);
    println!("      Seasons:    {}\n", settings.seasons.len());

    // 2. Simulated devices wired into the power cache
    println!("[2/3] Connecting simulated devices...");
    let cache = PowerCache::new();
    let registry = SimulatedRegistry::new(vec![
        DeviceInfo {
            id: "sim-heatpump".to_string(),
            name: "Heat pump".to_string(),
        },
        DeviceInfo {
            id: "sim-fridge".to_string(),
            name: "Fridge".to_string(),
        },
    ]);
    for device in registry.power_devices() {
        let cache = cache.clone();
        let id = device.id.clone();
        let name = device.name.clone();
        registry.subscribe_power(&device.id, Box::new(move |watts| cache.update(&id, &name, watts)));
        println!("      {} ({})", device.name, device.id);
    }
    println!();

    // 3. Run the engine
    println!("[3/3] Running engine...\n");

    let mut engine = TariffMonitor::new(
        &settings,
        Local::now().naive_local(),
        Box::new(LogOutputSink),
        Box::new(LogEventSink),
    );

    println!("----------------------------------------------------");
    println!("  Time   |  Power  | Tariff |  Cost/h  |  Today");
    println!("  (sec)  |  (W)    |        |  ({})   |  ({})", settings.currency, settings.currency);
    println!("----------------------------------------------------");

    for i in 0..30 {
        // Scripted readings: the heat pump ramps, the fridge cycles
        registry.push_power("sim-heatpump", 800.0 + f64::from(i) * 40.0);
        registry.push_power("sim-fridge", if i % 4 < 2 { 120.0 } else { 0.0 });

        engine.tick(Local::now().naive_local(), cache.snapshot());
        let snapshot = engine.snapshot();

        print!(
            "\r  {:>4}   | {:>6.1} | {:>6} | {:>7.5} | {:>7.5}",
            i + 1,
            snapshot.total_power,
            snapshot.tariff,
            snapshot.cost_per_hour,
            snapshot.cost_today
        );
        io::stdout().flush().unwrap();

        thread::sleep(Duration::from_secs(1));
    }

    println!("\n----------------------------------------------------\n");

    // Summary
    let snapshot = engine.snapshot().clone();
    println!("=== Summary ===\n");
    println!("  Season:              {}", snapshot.season.as_deref().unwrap_or("-"));
    println!("  Active tariff:       {}", snapshot.tariff);
    println!("  Rate:                {:.2} {}/kWh", snapshot.rate, settings.currency);
    println!("  Next change in:      {} min", snapshot.minutes_until_change);
    println!("  Peak hours left:     {:.1} h", snapshot.peak_hours_remaining);
    println!("  Off-peak hours left: {:.1} h", snapshot.offpeak_hours_remaining);
    println!("  Daily average rate:  {:.4} {}/kWh", snapshot.daily_average_rate, settings.currency);
    println!("  Cost today:          {:.5} {}", snapshot.cost_today, settings.currency);
    println!("  Month estimate:      {:.2} {}", snapshot.month_estimate, settings.currency);
    println!("  History samples:     {}", engine.history().len());

    println!("\n==============================================");
    println!("   Demo complete");
    println!("==============================================\n");
}
