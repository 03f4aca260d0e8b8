//! Query surface for settings and engine state.
//!
//! Endpoints:
//! - `GET /settings` - current tariff settings
//! - `PUT /settings` - partial settings update
//! - `GET /state` - latest engine snapshot
//! - `GET /history` - recorded samples, oldest first

mod handlers;
mod types;

pub use types::{SettingsUpdate, SettingsView};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::sync::{watch, Mutex};

use crate::core::Config;
use crate::engine::TariffMonitor;

/// State shared across all request handlers
pub struct ApiState {
    /// Persisted configuration
    pub config: Arc<Mutex<Config>>,
    /// The running engine instance
    pub engine: Arc<Mutex<TariffMonitor>>,
    /// Settings-change notification consumed by the tick loop
    pub refresh: watch::Sender<()>,
}

/// Builds the axum router with all API routes
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route(
            "/settings",
            get(handlers::get_settings).put(handlers::update_settings),
        )
        .route("/state", get(handlers::get_state))
        .route("/history", get(handlers::get_history))
        .with_state(state)
}

/// Binds to the given address and serves the API
pub async fn serve(state: Arc<ApiState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Query API listening on http://{}", addr);
    axum::serve(listener, app).await
}
