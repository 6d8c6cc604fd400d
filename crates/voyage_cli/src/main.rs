use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use voyage_core::{
    Catalog, Event, EventLevel, MemoryCatalog, Services, ShipState, StatusFileWriter, StatusReport,
    Table, TickStatus,
};
use voyage_world::{
    build_initial_catalog, build_initial_state, dispatch, load_content, load_snapshot,
    save_snapshot, snapshot_path, OfflineNarrator, Publisher, RetryingPublisher, ShiplogPublisher,
    TracingPublisher,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "voyage_cli", about = "Ocean research vessel simulation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the voyage for a fixed number of ticks.
    Run(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    #[arg(long)]
    ticks: u64,
    /// Start a new voyage with this world seed. Mutually exclusive with --state.
    #[arg(long, conflicts_with = "state_file")]
    seed: Option<u64>,
    /// Resume from a saved snapshot. Mutually exclusive with --seed.
    #[arg(long = "state", conflicts_with = "seed")]
    state_file: Option<PathBuf>,
    #[arg(long, default_value = "./content")]
    content_dir: String,
    /// Simulated seconds per tick.
    #[arg(long, default_value_t = 5.0)]
    tick_secs: f64,
    #[arg(long, default_value_t = 100)]
    print_every: u64,
    #[arg(long, default_value = "normal", value_parser = ["normal", "debug"])]
    event_level: String,
    /// Write the final snapshot here.
    #[arg(long)]
    save: Option<PathBuf>,
    /// Where the final snapshot goes when the ship is lost and --save is unset.
    #[arg(long, default_value = "./saves")]
    save_dir: PathBuf,
    /// Append one status row per printed tick to this CSV.
    #[arg(long)]
    status_csv: Option<PathBuf>,
    /// Write ship's logs and galleries as .shiplog files in this directory
    /// instead of the log output.
    #[arg(long)]
    shiplog_dir: Option<PathBuf>,
    /// Print the final status report as JSON instead of the footer.
    #[arg(long)]
    json: bool,
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn open_game(args: &RunArgs) -> Result<(voyage_core::GameContent, ShipState, MemoryCatalog)> {
    let content = load_content(&args.content_dir)?;
    if let Some(path) = &args.state_file {
        let snapshot = load_snapshot(path)?;
        return Ok((content, snapshot.ship, snapshot.catalog));
    }
    let seed = args.seed.unwrap_or_else(rand::random);
    let ship = build_initial_state(&content, seed, &mut OfflineNarrator);
    let catalog = build_initial_catalog(&content, seed);
    Ok((content, ship, catalog))
}

fn make_publisher(args: &RunArgs) -> Result<Box<dyn Publisher>> {
    Ok(match &args.shiplog_dir {
        Some(dir) => {
            let shiplog = ShiplogPublisher::new(dir)
                .with_context(|| format!("opening shiplog directory: {}", dir.display()))?;
            Box::new(RetryingPublisher::new(shiplog, 3, Duration::from_millis(200)))
        }
        None => Box::new(TracingPublisher),
    })
}

fn run(args: &RunArgs) -> Result<()> {
    let (content, mut ship, mut catalog) = open_game(args)?;
    let level = match args.event_level.as_str() {
        "debug" => EventLevel::Debug,
        _ => EventLevel::Normal,
    };
    let mut publisher = make_publisher(args)?;
    let mut status_writer = match &args.status_csv {
        Some(path) => Some(
            StatusFileWriter::create(path)
                .with_context(|| format!("opening status CSV: {}", path.display()))?,
        ),
        None => None,
    };
    let mut narrator = OfflineNarrator;
    let print_every = args.print_every.max(1);

    println!(
        "Starting voyage: ship={} ticks={} seed={} tick_secs={} pois={} content_version={}",
        ship.name,
        args.ticks,
        ship.meta.seed,
        args.tick_secs,
        catalog.count(Table::Pois),
        content.content_version,
    );
    println!("{}", "-".repeat(80));

    let mut last: Option<StatusReport> = None;
    let mut terminated = false;
    for _ in 0..args.ticks {
        let mut services = Services {
            catalog: &mut catalog,
            narrator: &mut narrator,
        };
        let report = voyage_core::tick(&mut ship, &mut services, &content, args.tick_secs, level);

        for envelope in &report.events {
            tracing::debug!(tick = envelope.tick, id = %envelope.id, event = ?envelope.event);
            print_notable(&envelope.event, envelope.tick);
            // Failures are already logged by the publisher; the voyage goes on.
            let _ = dispatch(publisher.as_mut(), envelope);
        }

        if report.summary.tick % print_every == 0 {
            println!("{}", report.summary.line());
            if let Some(writer) = status_writer.as_mut() {
                writer
                    .write_row(&report.summary)
                    .context("writing status row")?;
            }
        }

        terminated = matches!(report.status, TickStatus::Terminated(_));
        last = Some(report.summary);
        if terminated {
            break;
        }
    }

    println!("{}", "-".repeat(80));
    println!("Done. Final state at tick {}:", ship.meta.tick);
    if let Some(summary) = &last {
        if args.json {
            let json = serde_json::to_string_pretty(summary).context("serializing status")?;
            println!("{json}");
        } else {
            println!("{}", summary.footer());
        }
    }

    if let Some(writer) = status_writer.as_mut() {
        writer.flush().context("final status flush")?;
    }
    if let Some(path) = final_snapshot_path(args, terminated, ship.meta.tick) {
        save_snapshot(&path, &ship, &catalog)?;
        println!("Snapshot written to {}", path.display());
    }
    Ok(())
}

/// `--save` if given. A lost ship is always persisted, under `--save-dir`
/// when no explicit path was asked for.
fn final_snapshot_path(args: &RunArgs, terminated: bool, tick: u64) -> Option<PathBuf> {
    match &args.save {
        Some(path) => Some(path.clone()),
        None if terminated => Some(snapshot_path(&args.save_dir, tick)),
        None => None,
    }
}

fn print_notable(event: &Event, tick: u64) {
    match event {
        Event::PoiDiscovered { name, kind, .. } => {
            println!("*** DISCOVERED: {name} ({}) at tick={tick:06} ***", kind.label());
        }
        Event::CrewDied { role, name } => {
            println!("*** CREW LOST: {name} ({}) at tick={tick:06} ***", role.short());
        }
        Event::ShipLost {
            survivors,
            position,
        } => {
            println!(
                "*** SHIP LOST at {position}, {survivors} survivors, tick={tick:06} ***"
            );
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(&args)?,
    }
    Ok(())
}
