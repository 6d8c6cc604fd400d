//! Save and load of the full game: ship state plus catalog.
//!
//! Writes go to a sibling temp file first and are renamed into place, so a
//! crash mid-write never leaves a truncated snapshot behind.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use voyage_core::{MemoryCatalog, ShipState};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Snapshot {
    pub ship: ShipState,
    pub catalog: MemoryCatalog,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    ship: &'a ShipState,
    catalog: &'a MemoryCatalog,
}

/// Serializes without taking ownership, so callers can encode under a lock
/// and write after releasing it.
pub fn encode_snapshot(ship: &ShipState, catalog: &MemoryCatalog) -> Result<String> {
    serde_json::to_string_pretty(&SnapshotRef { ship, catalog }).context("serializing snapshot")
}

pub fn write_atomic(path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating snapshot directory: {}", parent.display()))?;
    }
    let tmp = temp_path(path);
    std::fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("moving snapshot into place: {}", path.display()))?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

pub fn save_snapshot(path: &Path, ship: &ShipState, catalog: &MemoryCatalog) -> Result<()> {
    let body = encode_snapshot(ship, catalog)?;
    write_atomic(path, &body)
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot: {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&json)
        .with_context(|| format!("parsing snapshot: {}", path.display()))?;
    anyhow::ensure!(
        snapshot.ship.meta.schema_version == voyage_core::SCHEMA_VERSION,
        "snapshot {} has schema version {}, expected {}",
        path.display(),
        snapshot.ship.meta.schema_version,
        voyage_core::SCHEMA_VERSION,
    );
    Ok(snapshot)
}

/// `save_{tick}.json` inside `dir`.
pub fn snapshot_path(dir: &Path, tick: u64) -> PathBuf {
    dir.join(format!("save_{tick:08}.json"))
}
