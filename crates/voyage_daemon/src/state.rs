use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::broadcast;
use voyage_core::{EventEnvelope, GameContent, MemoryCatalog, ShipState, TickStatus};
use voyage_world::OfflineNarrator;

pub struct SimState {
    pub ship: ShipState,
    pub catalog: MemoryCatalog,
    pub content: GameContent,
    pub narrator: OfflineNarrator,
    pub status: TickStatus,
}

impl SimState {
    pub fn new(ship: ShipState, catalog: MemoryCatalog, content: GameContent) -> Self {
        Self {
            ship,
            catalog,
            content,
            narrator: OfflineNarrator,
            status: TickStatus::Continue,
        }
    }
}

pub type SharedSim = Arc<Mutex<SimState>>;
pub type EventTx = broadcast::Sender<Vec<EventEnvelope>>;

#[derive(Clone)]
pub struct AppState {
    pub sim: SharedSim,
    pub event_tx: EventTx,
    /// Simulated seconds per wall-clock second.
    pub time_scale: f64,
    pub paused: Arc<AtomicBool>,
    /// Where snapshots go. `None` disables saving.
    pub save_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(sim: SimState, time_scale: f64, save_dir: Option<PathBuf>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            sim: Arc::new(Mutex::new(sim)),
            event_tx,
            time_scale,
            paused: Arc::new(AtomicBool::new(false)),
            save_dir,
        }
    }

    /// Encodes under the lock and writes after releasing it. Returns the
    /// path and tick saved, or `None` when saving is disabled.
    pub fn save(&self, file_name: Option<&str>) -> anyhow::Result<Option<(PathBuf, u64)>> {
        let Some(dir) = &self.save_dir else {
            return Ok(None);
        };
        let (body, tick) = {
            let sim = self.sim.lock();
            let body = voyage_world::encode_snapshot(&sim.ship, &sim.catalog)?;
            (body, sim.ship.meta.tick)
        };
        let path = match file_name {
            Some(name) => dir.join(name),
            None => voyage_world::snapshot_path(dir, tick),
        };
        voyage_world::write_atomic(&path, &body)?;
        Ok(Some((path, tick)))
    }
}
