mod routes;
mod state;
mod tick_loop;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use voyage_core::EventLevel;
use voyage_world::{
    build_initial_catalog, build_initial_state, load_content, load_snapshot, OfflineNarrator,
    Publisher, RetryingPublisher, ShiplogPublisher, TracingPublisher,
};

use crate::state::{AppState, SimState};
use crate::tick_loop::{LoopConfig, StopReason};

#[derive(Parser)]
#[command(name = "voyage_daemon", about = "Ocean research vessel simulation daemon")]
struct Cli {
    /// Start a new voyage with this world seed. Mutually exclusive with --state.
    #[arg(long, conflicts_with = "state_file")]
    seed: Option<u64>,
    /// Resume from a saved snapshot. Mutually exclusive with --seed.
    #[arg(long = "state", conflicts_with = "seed")]
    state_file: Option<PathBuf>,
    #[arg(long, default_value = "./content")]
    content_dir: String,
    #[arg(long, default_value = "./saves")]
    save_dir: PathBuf,
    /// Wall-clock milliseconds between ticks.
    #[arg(long, default_value_t = 1000)]
    tick_interval_ms: u64,
    /// Simulated seconds per wall-clock second.
    #[arg(long, default_value_t = 5.0)]
    time_scale: f64,
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Snapshot every N ticks. Zero disables periodic snapshots.
    #[arg(long, default_value_t = 12)]
    snapshot_every: u64,
    #[arg(long, default_value = "normal", value_parser = ["normal", "debug"])]
    event_level: String,
    /// Write ship's logs and galleries as .shiplog files here.
    #[arg(long)]
    shiplog_dir: Option<PathBuf>,
    #[arg(long, default_value_t = 3001)]
    port: u16,
    #[arg(long, default_value = "http://localhost:5173")]
    cors_origin: String,
}

fn open_game(cli: &Cli) -> Result<SimState> {
    let content = load_content(&cli.content_dir)?;
    if let Some(path) = &cli.state_file {
        let snapshot = load_snapshot(path)?;
        return Ok(SimState::new(snapshot.ship, snapshot.catalog, content));
    }
    let seed = cli.seed.unwrap_or_else(rand::random);
    let ship = build_initial_state(&content, seed, &mut OfflineNarrator);
    let catalog = build_initial_catalog(&content, seed);
    Ok(SimState::new(ship, catalog, content))
}

fn make_publisher(cli: &Cli) -> Result<Box<dyn Publisher + Send>> {
    Ok(match &cli.shiplog_dir {
        Some(dir) => {
            let shiplog = ShiplogPublisher::new(dir)
                .with_context(|| format!("opening shiplog directory: {}", dir.display()))?;
            Box::new(RetryingPublisher::new(shiplog, 3, Duration::from_millis(500)))
        }
        None => Box::new(TracingPublisher),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let sim = open_game(&cli)?;
    tracing::info!(
        ship = %sim.ship.name,
        seed = sim.ship.meta.seed,
        tick = sim.ship.meta.tick,
        content_version = %sim.content.content_version,
        "voyage loaded"
    );
    let app = AppState::new(sim, cli.time_scale, Some(cli.save_dir.clone()));
    let (publish_tx, publisher_task) = tick_loop::spawn_publisher(make_publisher(&cli)?);

    let router = routes::make_router_with_cors(app.clone(), &cli.cors_origin);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("listening on http://{addr}");

    let (stop_tx, mut stop_rx) = tokio::sync::watch::channel(false);
    let server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.wait_for(|stop| *stop).await;
            })
            .await
    });

    let config = LoopConfig {
        tick_interval: Duration::from_millis(cli.tick_interval_ms.max(1)),
        max_ticks: cli.max_ticks,
        snapshot_every: cli.snapshot_every,
        event_level: match cli.event_level.as_str() {
            "debug" => EventLevel::Debug,
            _ => EventLevel::Normal,
        },
    };
    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("ctrl-c handler failed: {err}");
            std::future::pending::<()>().await;
        }
    };
    let reason = tick_loop::run_tick_loop(app, config, publish_tx, shutdown).await;
    if reason == StopReason::ShipLost {
        tracing::warn!("ship lost, shutting down");
    }

    let _ = stop_tx.send(true);
    // Open event streams never finish on their own.
    if tokio::time::timeout(Duration::from_secs(5), server).await.is_err() {
        tracing::warn!("server did not stop within 5s");
    }
    publisher_task.await.context("publisher task")?;
    Ok(())
}
