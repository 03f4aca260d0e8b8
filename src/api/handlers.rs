//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use super::types::{SettingsUpdate, SettingsView};
use super::ApiState;
use crate::core::{EngineSnapshot, HistorySample};

/// Returns the current tariff settings.
///
/// `GET /settings` → 200 + `SettingsView` JSON
pub async fn get_settings(State(state): State<Arc<ApiState>>) -> Json<SettingsView> {
    let config = state.config.lock().await;
    Json(SettingsView::from(&config.tariff))
}

/// Applies a partial settings update.
///
/// `PUT /settings` → 200 + the updated `SettingsView` JSON. Only fields
/// present in the body are applied. The new settings are persisted
/// best-effort and a change notification wakes the engine for an
/// out-of-cadence tariff refresh.
pub async fn update_settings(
    State(state): State<Arc<ApiState>>,
    Json(update): Json<SettingsUpdate>,
) -> Json<SettingsView> {
    let mut config = state.config.lock().await;
    update.apply_to(&mut config.tariff);

    if let Err(e) = config.save() {
        log::warn!("Failed to persist settings: {}", e);
    }

    let view = SettingsView::from(&config.tariff);
    drop(config);

    // Wake the tick loop for an immediate tariff refresh
    let _ = state.refresh.send(());

    Json(view)
}

/// Returns the latest engine snapshot.
///
/// `GET /state` → 200 + `EngineSnapshot` JSON
pub async fn get_state(State(state): State<Arc<ApiState>>) -> Json<EngineSnapshot> {
    let engine = state.engine.lock().await;
    Json(engine.snapshot().clone())
}

/// Returns the recorded history samples, oldest first.
///
/// `GET /history` → 200 + `Vec<HistorySample>` JSON
pub async fn get_history(State(state): State<Arc<ApiState>>) -> Json<Vec<HistorySample>> {
    let engine = state.engine.lock().await;
    Json(engine.history())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::core::{Config, DeviceSnapshot, TariffSettings};
    use crate::engine::{LogEventSink, LogOutputSink, TariffMonitor};
    use chrono::NaiveDate;
    use tokio::sync::{watch, Mutex};

    fn make_test_state() -> Arc<ApiState> {
        let now = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap();
        let mut engine = TariffMonitor::new(
            &TariffSettings::default(),
            now,
            Box::new(LogOutputSink),
            Box::new(LogEventSink),
        );
        engine.tick(
            now + chrono::Duration::hours(1),
            vec![DeviceSnapshot {
                id: "a".to_string(),
                name: "Heater".to_string(),
                power: 2000.0,
            }],
        );

        let (refresh, _rx) = watch::channel(());
        Arc::new(ApiState {
            config: Arc::new(Mutex::new(Config::default())),
            engine: Arc::new(Mutex::new(engine)),
            refresh,
        })
    }

    #[tokio::test]
    async fn test_get_settings_shape() {
        let app = router(make_test_state());

        let req = Request::builder()
            .uri("/settings")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["currency"], "EUR");
        assert_eq!(json["dayRate"], 0.12);
        assert_eq!(json["nightRate"], 0.06);
        assert_eq!(json["seasons"][0]["name"], "Winter");
        assert_eq!(json["seasons"][0]["startMonth"], 11);
    }

    #[tokio::test]
    async fn test_partial_update_applies_present_fields_only() {
        let state = make_test_state();
        let app = router(state.clone());

        let req = Request::builder()
            .method(Method::PUT)
            .uri("/settings")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"dayRate":0.30}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["dayRate"], 0.30);
        assert_eq!(json["nightRate"], 0.06);
        assert_eq!(json["currency"], "EUR");

        let config = state.config.lock().await;
        assert_eq!(config.tariff.day_rate, 0.30);
    }

    #[tokio::test]
    async fn test_update_notifies_refresh_channel() {
        let state = make_test_state();
        let mut rx = state.refresh.subscribe();
        let app = router(state.clone());

        let req = Request::builder()
            .method(Method::PUT)
            .uri("/settings")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"nightRate":0.05}"#))
            .unwrap();
        app.oneshot(req).await.unwrap();

        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_get_state_serves_snapshot() {
        let app = router(make_test_state());

        let req = Request::builder()
            .uri("/state")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["tariff"], "day");
        assert_eq!(json["season"], "Winter");
        assert_eq!(json["total_power"], 2000.0);
    }

    #[tokio::test]
    async fn test_get_history_serves_samples() {
        let app = router(make_test_state());

        let req = Request::builder()
            .uri("/history")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.len(), 1);
        assert_eq!(json[0]["power"], 2000.0);
    }
}
