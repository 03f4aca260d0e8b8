//! Tariff Monitor - Main entry point
//!
//! A headless service that tracks the active day/night electricity tariff
//! across seasonal schedules and accumulates energy cost from live power
//! readings in real-time.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::{watch, Mutex};

use tariff_monitor_lib::api::{self, ApiState};
use tariff_monitor_lib::core::Config;
use tariff_monitor_lib::devices::{self, DeviceInfo, DeviceRegistry, PowerCache, SimulatedRegistry};
use tariff_monitor_lib::engine::{LogEventSink, LogOutputSink, TariffMonitor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Tariff Monitor v{}", env!("CARGO_PKG_VERSION"));

    // Load or create configuration
    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });

    let listen_addr: SocketAddr = config.general.api_listen.parse()?;
    let tick_period = Duration::from_secs(config.general.tick_seconds.max(1));
    let registry_retry = Duration::from_secs(config.general.registry_retry_seconds.max(1));

    // Device layer: simulated registry feeding the shared power cache.
    // Swap the registry implementation to integrate a real platform.
    let cache = PowerCache::new();
    let registry = Arc::new(SimulatedRegistry::new(vec![
        DeviceInfo {
            id: "sim-heatpump".to_string(),
            name: "Heat pump".to_string(),
        },
        DeviceInfo {
            id: "sim-fridge".to_string(),
            name: "Fridge".to_string(),
        },
        DeviceInfo {
            id: "sim-ev".to_string(),
            name: "EV charger".to_string(),
        },
    ]));
    tokio::spawn(devices::run_simulation(registry.clone(), tick_period));
    tokio::spawn(devices::bootstrap(
        registry.clone() as Arc<dyn DeviceRegistry>,
        cache.clone(),
        registry_retry,
    ));

    // Build the engine
    let now = Local::now().naive_local();
    let engine = Arc::new(Mutex::new(TariffMonitor::new(
        &config.tariff,
        now,
        Box::new(LogOutputSink),
        Box::new(LogEventSink),
    )));
    let config = Arc::new(Mutex::new(config));

    // Settings-change notification: PUT /settings wakes the tick loop
    let (refresh_tx, refresh_rx) = watch::channel(());

    tokio::spawn(monitoring_loop(
        engine.clone(),
        config.clone(),
        cache,
        tick_period,
        refresh_rx,
    ));

    let state = Arc::new(ApiState {
        config,
        engine,
        refresh: refresh_tx,
    });
    api::serve(state, listen_addr).await?;

    Ok(())
}

/// Background task that periodically evaluates the engine and reacts to
/// out-of-band settings changes.
async fn monitoring_loop(
    engine: Arc<Mutex<TariffMonitor>>,
    config: Arc<Mutex<Config>>,
    cache: PowerCache,
    tick_period: Duration,
    mut refresh_rx: watch::Receiver<()>,
) {
    log::info!(
        "Starting monitoring loop with {}s tick period",
        tick_period.as_secs()
    );
    let mut interval = tokio::time::interval(tick_period);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = Local::now().naive_local();
                let snapshot = cache.snapshot();
                let mut engine = engine.lock().await;
                engine.tick(now, snapshot);
            }
            changed = refresh_rx.changed() => {
                if changed.is_err() {
                    // Sender dropped, the service is shutting down
                    break;
                }
                let now = Local::now().naive_local();
                let settings = { config.lock().await.tariff.clone() };
                let mut engine = engine.lock().await;
                engine.apply_settings(&settings, now);
                log::info!("Settings changed, tariff state refreshed");
            }
        }
    }
}
