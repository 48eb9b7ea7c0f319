//! hostpulse: streams host metrics to WebSocket viewers and runs bounded
//! per-connection monitoring sessions.

mod config;
mod gpu;
mod metrics;
mod sampler;
mod session;
mod state;
mod types;
mod ws;

use std::net::SocketAddr;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use sysinfo::System;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::sampler::spawn_sampler;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();
    info!(
        interval_ms = config.update_interval_ms,
        duration_secs = config.monitoring_duration_secs,
        max_points = config.max_data_points,
        "starting"
    );

    let state = AppState::new(config.clone());
    spawn_sampler(state.clone());

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/api/snapshot", get(latest_snapshot))
        .route("/api/health", get(health))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    println!("hostpulse listening on http://{addr} (ws at /ws)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Latest collected snapshot; 503 until the first tick lands.
async fn latest_snapshot(State(state): State<AppState>) -> impl IntoResponse {
    match state.latest.read().await.clone() {
        Some(snapshot) => Json(snapshot).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "no snapshot yet").into_response(),
    }
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "hostname": System::host_name().unwrap_or_else(|| "unknown".into()),
        "uptimeSecs": state.started_at.elapsed().as_secs(),
    }))
}
