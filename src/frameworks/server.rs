// Framework bootstrap for the world server runtime.

use crate::domain::ComponentRegistry;
use crate::domain::tuning::PlayerTuning;
use crate::frameworks::config;
use crate::interface_adapters::net::{status_handler, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::use_cases::game::world_task;
use crate::use_cases::{World, WorldCommand, WorldSettings};

use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::{Notify, mpsc, watch};

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

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let shutdown = Arc::new(Notify::new());
    let state = build_state(shutdown.clone());

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/status", get(status_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    let served = axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    });
    shutdown.notify_one();
    served
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state(shutdown: Arc<Notify>) -> Arc<AppState> {
    let tick_interval = config::tick_interval();
    let settings = WorldSettings {
        tick_interval,
        player: PlayerTuning::default(),
    };
    tracing::debug!(
        tick_interval_ms = tick_interval.as_millis() as u64,
        "world configured"
    );

    // Single world task: the only place the ECS world is touched.
    let world = World::new(ComponentRegistry::standard(), settings);
    let (command_tx, command_rx) = mpsc::channel::<WorldCommand>(config::COMMAND_CHANNEL_CAPACITY);
    let (tick_tx, _tick_rx) = watch::channel::<u64>(0);
    tokio::spawn(world_task(
        world,
        command_rx,
        tick_tx.clone(),
        tick_interval,
        shutdown,
    ));

    Arc::new(AppState {
        command_tx,
        tick_tx,
    })
}
