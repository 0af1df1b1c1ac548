// Framework bootstrap for the arena server runtime.

use crate::domain::TileWorld;
use crate::domain::tuning::player::PlayerTuning;
use crate::domain::tuning::projectile::ProjectileTuning;
use crate::frameworks::config;
use crate::interface_adapters::http::health_handler;
use crate::interface_adapters::net::ws_handler;
use crate::interface_adapters::protocol::encode_event;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{Arena, GameEvent, world_task};

use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::mpsc;

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

/// Serves the arena on an already bound listener.
pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state()?;
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::new(config::bind_addr(), config::http_port());

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state() -> Result<Arc<AppState>> {
    // input_tx/rx: every connection event goes to the single world task.
    let (input_tx, input_rx) = mpsc::channel::<GameEvent>(config::INPUT_CHANNEL_CAPACITY);

    let world = TileWorld::arena().map_err(|e| {
        tracing::error!(error = ?e, "invalid arena layout");
        std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{e:?}"))
    })?;
    tracing::debug!(
        cols = world.cols(),
        rows = world.rows(),
        tile = world.tile_size(),
        "arena map loaded"
    );
    let arena = Arena::new(world, PlayerTuning::default(), ProjectileTuning::default());

    // The world task owns all game state and lives as long as any sender does.
    tokio::spawn(world_task(
        input_rx,
        arena,
        config::TICK_INTERVAL,
        encode_event,
    ));

    Ok(Arc::new(AppState {
        input_tx,
        outbound_capacity: config::OUTBOUND_CHANNEL_CAPACITY,
    }))
}
