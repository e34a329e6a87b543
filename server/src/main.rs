//! Entry point: parses configuration, initializes logging, and runs the
//! room supervisor's TCP listener and health endpoint until a shutdown
//! signal arrives.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::{error, info, warn};
use tokio::sync::Mutex;

use server::config::Config;
use server::network::{run_health_listener, run_tcp_listener};
use server::stats::{InMemoryStats, StatsStore};
use server::supervisor::Supervisor;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let config = Config::parse();

    if config.database_url.is_none() {
        warn!("DATABASE_URL not set; falling back to in-memory stats");
    }

    info!(
        "starting room server on {} (tick rate {} Hz, map seed {}, max {} rooms)",
        config.bind_addr(),
        config.tick_rate,
        config.map_seed,
        config.max_rooms,
    );

    let supervisor = Arc::new(Mutex::new(Supervisor::new(config.map_seed, config.max_rooms)));
    let stats: Arc<dyn StatsStore> = Arc::new(InMemoryStats::new());

    let health_addr = config.health_addr();
    let health_supervisor = Arc::clone(&supervisor);
    tokio::spawn(async move {
        if let Err(e) = run_health_listener(&health_addr, health_supervisor).await {
            error!("health endpoint stopped: {e}");
        }
    });

    let bind_addr = config.bind_addr();
    let game_supervisor = Arc::clone(&supervisor);
    let game_stats = Arc::clone(&stats);
    let listener =
        tokio::spawn(async move { run_tcp_listener(&bind_addr, game_supervisor, game_stats).await });

    tokio::select! {
        result = listener => match result {
            Ok(Ok(())) => ExitCode::SUCCESS,
            Ok(Err(e)) => {
                error!("bind failure: {e}");
                ExitCode::FAILURE
            }
            Err(e) => {
                error!("listener task panicked: {e}");
                ExitCode::FAILURE
            }
        },
        _ = shutdown_signal() => {
            info!("shutdown signal received, stopping all rooms");
            ExitCode::SUCCESS
        }
    }
}

async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt()).expect("install SIGINT handler");
    let mut sigterm = signal(SignalKind::terminate()).expect("install SIGTERM handler");

    tokio::select! {
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
    }
}
