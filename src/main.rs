//! Dog-walker game server - authoritative multiplayer simulation
//!
//! This is the main entry point for the game server. It handles:
//! - The REST command surface for joining, steering, and querying games
//! - Static file serving for the game client
//! - The simulation tick loop (periodic or externally driven)
//! - Durable score records in PostgreSQL

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dogwalk_server::app::AppState;
use dogwalk_server::game::Game;
use dogwalk_server::http::build_router;
use dogwalk_server::store::RecordStore;
use dogwalk_server::{cli, config, ticker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    let args = cli::Args::parse();

    info!("Starting dog-walker game server");

    // Load the scenario and build the world
    let game_config = config::load(&args.config_file)
        .with_context(|| format!("loading config from {}", args.config_file.display()))?;
    let game = Game::new(&game_config, args.randomize_spawn_points)?;
    info!(maps = game.maps().len(), "world loaded");

    // Connect the record store; pool size tracks the CPU count
    let db_url = std::env::var("GAME_DB_URL")
        .context("GAME_DB_URL environment variable is required")?;
    let pool_size = std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1);
    let records = RecordStore::connect(&db_url, pool_size)
        .await
        .context("connecting to the record store")?;
    records
        .ensure_schema()
        .await
        .context("preparing the record store schema")?;

    let auto_tick = args.tick_period_ms.is_some();
    let state = AppState::new(game, records, auto_tick);

    // In auto-tick mode the ticker is the only source of time advancement
    if let Some(period_ms) = args.tick_period_ms {
        ticker::spawn(state.clone(), Duration::from_millis(period_ms));
        info!(period_ms, "auto-tick enabled");
    } else {
        info!("manual tick mode: time advances via /api/v1/game/tick");
    }

    let router = build_router(state, args.www_root);

    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
