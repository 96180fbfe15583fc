// Framework bootstrap for the game server runtime.

use crate::frameworks::config;
use crate::interface_adapters::net::ws_handler;
use crate::interface_adapters::protocol::JsonSnapshotEncoder;
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::clock::SystemClock;
use crate::use_cases::{WorldSettings, spawn_world};

use axum::{Router, routing::get};
use std::{io::Result, sync::Arc};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub fn world_settings() -> WorldSettings {
    WorldSettings {
        event_channel_capacity: config::EVENT_CHANNEL_CAPACITY,
        tick_interval: config::tick_interval(),
        broadcast_delay: config::broadcast_delay(),
        tuning: config::arena_tuning(),
    }
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    run_with_settings(listener, world_settings()).await
}

pub async fn run_with_settings(
    listener: tokio::net::TcpListener,
    settings: WorldSettings,
) -> Result<()> {
    let address = listener.local_addr()?;

    // Spawn the authoritative world loop; it lives as long as the event sender in AppState.
    let world = spawn_world(settings, JsonSnapshotEncoder, SystemClock);
    let state = Arc::new(AppState {
        event_tx: world.event_tx,
    });

    // The bare path serves the socket too, for clients that connect to `ws://host:port`.
    let app = Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = format!("{}:{}", config::http_host(), config::http_port());

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}
