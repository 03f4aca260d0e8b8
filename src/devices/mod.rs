//! Device registry collaborator boundary
//!
//! The engine never talks to the smart-home platform directly. A
//! `DeviceRegistry` implementation lists devices exposing the power
//! capability and delivers power updates through callbacks; the callbacks
//! write into a thread-safe cache, and the tick loop pulls an immutable
//! snapshot from that cache each cycle. A simulated registry serves as the
//! built-in source when no platform integration is wired up.

use crate::core::DeviceSnapshot;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Identity of a device exposing the power capability
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub id: String,
    pub name: String,
}

/// Callback invoked by the registry when a device reports a new power value
pub type PowerCallback = Box<dyn Fn(f64) + Send + Sync>;

/// External smart-home device registry
pub trait DeviceRegistry: Send + Sync {
    /// Devices currently exposing the power capability
    fn power_devices(&self) -> Vec<DeviceInfo>;

    /// Subscribe to power updates for one device
    fn subscribe_power(&self, device_id: &str, callback: PowerCallback);
}

struct DeviceReading {
    name: String,
    power: f64,
}

/// Thread-safe cache of the latest power value per device.
///
/// Written by registry callbacks, read as a snapshot by the tick loop.
#[derive(Clone)]
pub struct PowerCache {
    inner: Arc<Mutex<HashMap<String, DeviceReading>>>,
}

impl PowerCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record the latest power value for a device
    pub fn update(&self, id: &str, name: &str, power: f64) {
        let mut inner = self.inner.lock().unwrap();
        inner.insert(
            id.to_string(),
            DeviceReading {
                name: name.to_string(),
                power,
            },
        );
    }

    /// Consistent snapshot of devices with positive draw, highest first.
    ///
    /// Zero and negative readings are excluded, not clamped.
    pub fn snapshot(&self) -> Vec<DeviceSnapshot> {
        let inner = self.inner.lock().unwrap();
        let mut devices: Vec<DeviceSnapshot> = inner
            .iter()
            .filter(|(_, reading)| reading.power > 0.0)
            .map(|(id, reading)| DeviceSnapshot {
                id: id.clone(),
                name: reading.name.clone(),
                power: reading.power,
            })
            .collect();

        devices.sort_by(|a, b| {
            b.power
                .partial_cmp(&a.power)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        devices
    }
}

impl Default for PowerCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Wire the registry's power devices into the cache.
///
/// The registry may not be ready at startup; while it reports zero devices
/// this retries indefinitely at the given interval, treating the situation
/// as an empty device set rather than an error.
pub async fn bootstrap(registry: Arc<dyn DeviceRegistry>, cache: PowerCache, retry: Duration) {
    loop {
        let devices = registry.power_devices();
        if devices.is_empty() {
            log::info!(
                "No power-capable devices available yet, retrying in {}s",
                retry.as_secs()
            );
            tokio::time::sleep(retry).await;
            continue;
        }

        log::info!("Tracking {} power-capable devices", devices.len());
        for device in devices {
            let cache = cache.clone();
            let id = device.id.clone();
            let name = device.name.clone();
            registry.subscribe_power(
                &device.id,
                Box::new(move |watts| cache.update(&id, &name, watts)),
            );
        }
        return;
    }
}

/// In-process registry used by the demo binary and as the fallback source
/// when no platform integration is configured.
pub struct SimulatedRegistry {
    devices: Vec<DeviceInfo>,
    subscribers: Mutex<HashMap<String, Vec<PowerCallback>>>,
}

impl SimulatedRegistry {
    pub fn new(devices: Vec<DeviceInfo>) -> Self {
        Self {
            devices,
            subscribers: Mutex::new(HashMap::new()),
        }
    }

    /// Deliver a power reading to all subscribers of a device
    pub fn push_power(&self, device_id: &str, watts: f64) {
        let subscribers = self.subscribers.lock().unwrap();
        if let Some(callbacks) = subscribers.get(device_id) {
            for callback in callbacks {
                callback(watts);
            }
        }
    }
}

impl DeviceRegistry for SimulatedRegistry {
    fn power_devices(&self) -> Vec<DeviceInfo> {
        self.devices.clone()
    }

    fn subscribe_power(&self, device_id: &str, callback: PowerCallback) {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers
            .entry(device_id.to_string())
            .or_default()
            .push(callback);
    }
}

/// Drive the simulated registry with slowly varying synthetic readings.
///
/// Each device ramps through a staggered sawtooth so the aggregate total
/// changes between ticks without any external input.
pub async fn run_simulation(registry: Arc<SimulatedRegistry>, period: Duration) {
    let mut step: u64 = 0;
    loop {
        for (i, device) in registry.power_devices().iter().enumerate() {
            let base = 100.0 * (i as f64 + 1.0);
            let ramp = ((step + i as u64 * 7) % 20) as f64;
            registry.push_power(&device.id, base + ramp * 10.0);
        }
        step += 1;
        tokio::time::sleep(period).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_filters_and_sorts() {
        let cache = PowerCache::new();
        cache.update("a", "Fridge", 150.0);
        cache.update("b", "Heater", 2000.0);
        cache.update("c", "Idle lamp", 0.0);
        cache.update("d", "Broken sensor", -5.0);

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].name, "Heater");
        assert_eq!(snapshot[1].name, "Fridge");
    }

    #[test]
    fn test_update_replaces_previous_reading() {
        let cache = PowerCache::new();
        cache.update("a", "Fridge", 150.0);
        cache.update("a", "Fridge", 90.0);

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].power, 90.0);
    }

    #[tokio::test]
    async fn test_bootstrap_subscribes_all_devices() {
        let registry = Arc::new(SimulatedRegistry::new(vec![
            DeviceInfo {
                id: "a".to_string(),
                name: "Fridge".to_string(),
            },
            DeviceInfo {
                id: "b".to_string(),
                name: "Heater".to_string(),
            },
        ]));
        let cache = PowerCache::new();

        bootstrap(registry.clone(), cache.clone(), Duration::from_secs(30)).await;

        registry.push_power("a", 150.0);
        registry.push_power("b", 2000.0);

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].name, "Heater");
    }
}
