use crate::state::{AppState, SimState};
use std::future::Future;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use voyage_core::{EventEnvelope, EventLevel, Services, TickStatus};
use voyage_world::Publisher;

/// Periodic and final snapshots overwrite this file.
pub const LATEST_SNAPSHOT: &str = "latest.json";

pub struct LoopConfig {
    pub tick_interval: Duration,
    pub max_ticks: Option<u64>,
    /// Snapshot every N ticks. Zero disables periodic snapshots.
    pub snapshot_every: u64,
    pub event_level: EventLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    ShipLost,
    Shutdown,
    MaxTicks,
}

/// Runs one tick under the lock, advancing ship time by `elapsed_secs`.
pub fn step(app: &AppState, elapsed_secs: f64, level: EventLevel) -> (Vec<EventEnvelope>, TickStatus) {
    let mut guard = app.sim.lock();
    let SimState {
        ref mut ship,
        ref mut catalog,
        ref content,
        ref mut narrator,
        ref mut status,
    } = *guard;
    let mut services = Services { catalog, narrator };
    let report = voyage_core::tick(ship, &mut services, content, elapsed_secs, level);
    *status = report.status;
    (report.events, report.status)
}

/// Drives the simulation from the wall clock until the ship is lost,
/// `shutdown` resolves, or `max_ticks` is reached. Always writes a final
/// snapshot before returning.
pub async fn run_tick_loop(
    app: AppState,
    config: LoopConfig,
    publish_tx: mpsc::UnboundedSender<EventEnvelope>,
    shutdown: impl Future<Output = ()>,
) -> StopReason {
    tokio::pin!(shutdown);
    let mut interval = tokio::time::interval(config.tick_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval.tick().await; // discard the immediate first tick
    let mut last = Instant::now();

    let reason = loop {
        tokio::select! {
            () = &mut shutdown => break StopReason::Shutdown,
            _ = interval.tick() => {}
        }
        let now = Instant::now();
        let elapsed = now.duration_since(last);
        last = now;
        if app.paused.load(Ordering::Relaxed) {
            continue;
        }

        let (events, status) = step(&app, elapsed.as_secs_f64() * app.time_scale, config.event_level);
        for envelope in &events {
            tracing::info!(tick = envelope.tick, id = %envelope.id, event = ?envelope.event, "event");
            let _ = publish_tx.send(envelope.clone());
        }
        let _ = app.event_tx.send(events);

        if status != TickStatus::Continue {
            break StopReason::ShipLost;
        }
        let tick = app.sim.lock().ship.meta.tick;
        if config.snapshot_every > 0 && tick % config.snapshot_every == 0 {
            save_latest(&app);
        }
        if config.max_ticks.is_some_and(|max| tick >= max) {
            break StopReason::MaxTicks;
        }
    };

    save_latest(&app);
    tracing::info!(?reason, "tick loop stopped");
    reason
}

fn save_latest(app: &AppState) {
    match app.save(Some(LATEST_SNAPSHOT)) {
        Ok(Some((path, tick))) => tracing::debug!(tick, path = %path.display(), "snapshot saved"),
        Ok(None) => {}
        Err(err) => tracing::error!("snapshot failed: {err:#}"),
    }
}

/// Forwards log entries and galleries on a blocking thread, in tick order.
/// Finishes once every sender is dropped and the queue is drained.
pub fn spawn_publisher(
    mut publisher: Box<dyn Publisher + Send>,
) -> (
    mpsc::UnboundedSender<EventEnvelope>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<EventEnvelope>();
    let handle = tokio::task::spawn_blocking(move || {
        while let Some(envelope) = rx.blocking_recv() {
            // Failures are logged by the publisher and dropped.
            let _ = voyage_world::dispatch(publisher.as_mut(), &envelope);
        }
    });
    (tx, handle)
}
