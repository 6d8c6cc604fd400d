//! Content loading, new-game construction, and persistence shared between
//! voyage_cli and voyage_daemon.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use voyage_core::narrative::{self, ContentGenerator};
use voyage_core::{
    worldgen, Catalog, Clock, ComponentHealth, Constants, Counters, Crew, Depth, GameContent,
    MemoryCatalog, MetaState, NewPoi, PoiKind, PoiTypeTable, ResearchState, ResourceRule,
    ResourceSet, Role, Seat, ShipState, ShipStatus, ShipTemplate, Track,
};

pub mod narrator;
pub mod publish;
pub mod snapshot;

pub use narrator::OfflineNarrator;
pub use publish::{
    dispatch, PublishError, Publisher, RetryingPublisher, ShiplogPublisher, TracingPublisher,
};
pub use snapshot::{
    encode_snapshot, load_snapshot, save_snapshot, snapshot_path, write_atomic, Snapshot,
};

#[derive(Deserialize)]
struct PoiTypesFile {
    content_version: String,
    #[serde(flatten)]
    table: PoiTypeTable,
}

/// Validates loaded content, panicking on any authoring error.
///
/// Catches mistakes like a POI kind listed at both depths, a pool too small
/// to draw two resources from, or a crew roster missing a role.
pub fn validate_content(content: &GameContent) {
    validate_poi_types(&content.poi_types);
    validate_constants(&content.constants);
    validate_ship(&content.ship, &content.poi_types);
}

fn validate_poi_types(poi_types: &PoiTypeTable) {
    assert!(
        !poi_types.adjectives.is_empty(),
        "poi_types adjective list is empty"
    );
    let mut seen = HashSet::new();
    for (depth, defs) in [
        (Depth::Surface, &poi_types.surface),
        (Depth::Submerged, &poi_types.submerged),
    ] {
        assert!(
            defs.iter().any(|def| def.weight > 0),
            "no {} POI kind has a positive weight",
            depth.label(),
        );
        for def in defs {
            assert!(
                seen.insert(def.kind),
                "POI kind '{}' is listed more than once",
                def.kind.label(),
            );
            if let ResourceRule::Pool(pool) = &def.resources {
                assert!(
                    !def.kind.has_fixed_resources(),
                    "POI kind '{}' must use a fixed resource set",
                    def.kind.label(),
                );
                let distinct: HashSet<_> = pool.iter().collect();
                assert!(
                    distinct.len() >= 2,
                    "POI kind '{}' resource pool needs at least two distinct entries",
                    def.kind.label(),
                );
            }
        }
    }
    for kind in [PoiKind::OffshorePlatform, PoiKind::Deposit] {
        assert!(
            seen.contains(&kind),
            "POI kind '{}' is required but not defined",
            kind.label(),
        );
    }
}

fn validate_constants(c: &Constants) {
    let table = &c.frequency_ticks;
    for (name, ticks) in [
        ("daily", table.daily),
        ("bidaily", table.bidaily),
        ("weekly", table.weekly),
        ("biweekly", table.biweekly),
        ("monthly", table.monthly),
        ("bimonthly", table.bimonthly),
    ] {
        assert!(ticks > 0, "frequency_ticks.{name} must be positive");
    }
    assert!(
        c.boldly_go_min_distance < c.boldly_go_max_distance,
        "boldly_go_min_distance must be below boldly_go_max_distance",
    );
    assert!(
        c.site_size_min < c.site_size_max,
        "site_size_min must be below site_size_max",
    );
    assert!(
        c.away_damage_min < c.away_damage_max,
        "away_damage_min must be below away_damage_max",
    );
    assert!(
        c.harvest_min < c.harvest_max,
        "harvest_min must be below harvest_max",
    );
    assert!(
        c.artifact_reward_min <= c.artifact_reward_max && c.tech_reward_min <= c.tech_reward_max,
        "research reward bands are inverted",
    );
    assert!(c.away_mishap_percent <= 100, "away_mishap_percent above 100");
}

fn validate_ship(ship: &ShipTemplate, poi_types: &PoiTypeTable) {
    for role in Role::ALL {
        let count = ship.crew.iter().filter(|c| c.role == role).count();
        assert!(
            count == 1,
            "ship crew roster lists role '{}' {count} times, expected once",
            role.short(),
        );
    }
    assert!(!ship.sensors.is_empty(), "ship has no sensors");
    assert!(ship.max_speed > 0.0, "ship max_speed must be positive");
    assert!(
        poi_types.def(PoiKind::OffshorePlatform).is_some(),
        "home port needs an offshore_platform POI kind",
    );
}

pub fn load_content(content_dir: &str) -> Result<GameContent> {
    let dir = Path::new(content_dir);
    let constants: Constants = serde_json::from_str(
        &std::fs::read_to_string(dir.join("constants.json")).context("reading constants.json")?,
    )
    .context("parsing constants.json")?;
    let poi_file: PoiTypesFile = serde_json::from_str(
        &std::fs::read_to_string(dir.join("poi_types.json")).context("reading poi_types.json")?,
    )
    .context("parsing poi_types.json")?;
    let ship: ShipTemplate = serde_json::from_str(
        &std::fs::read_to_string(dir.join("ship.json")).context("reading ship.json")?,
    )
    .context("parsing ship.json")?;
    let content = GameContent {
        content_version: poi_file.content_version,
        constants,
        poi_types: poi_file.table,
        ship,
    };
    validate_content(&content);
    Ok(content)
}

/// Crew roster from the ship template. Unnamed berths get a generated name.
fn build_crew(ship: &ShipTemplate, narrator: &mut dyn ContentGenerator) -> Crew {
    let mut seat_for = |role: Role| {
        let Some(entry) = ship.crew.iter().find(|c| c.role == role) else {
            return Seat::vacant(role.short());
        };
        let name = entry
            .name
            .clone()
            .unwrap_or_else(|| narrative::crew_name(narrator, &entry.title));
        Seat {
            occupant: Some(name),
            health: 100.0,
            title: entry.title.clone(),
        }
    };
    Crew {
        commanding_officer: seat_for(Role::CommandingOfficer),
        chief_engineer: seat_for(Role::ChiefEngineer),
        chief_science_officer: seat_for(Role::ChiefScienceOfficer),
        junior_engineer: seat_for(Role::JuniorEngineer),
        junior_scientist: seat_for(Role::JuniorScientist),
    }
}

/// A fresh ship moored at the home port with no course set.
pub fn build_initial_state(
    content: &GameContent,
    seed: u64,
    narrator: &mut dyn ContentGenerator,
) -> ShipState {
    let ship = &content.ship;
    ShipState {
        meta: MetaState {
            tick: 0,
            seed,
            schema_version: voyage_core::SCHEMA_VERSION,
            content_version: content.content_version.clone(),
        },
        name: ship.name.clone(),
        status: ShipStatus::Underway,
        position: ship.home_port.pos.center(),
        heading: 0.0,
        speed: 0.0,
        max_speed: ship.max_speed,
        fuel_efficiency: ship.fuel_efficiency,
        track: Track::None,
        health: ComponentHealth {
            hull: 100.0,
            engine: 100.0,
            lab: 100.0,
            bridge: 100.0,
            dinghy: 100.0,
            sub: 100.0,
        },
        cargo: ship.cargo.clone(),
        capacity: ship.capacity.clone(),
        crew: build_crew(ship, narrator),
        sensors: ship.sensors.clone(),
        research: ResearchState {
            pending_tech: 0,
            pending_artifact: 0,
            effort_tech: ship.lab_base,
            effort_artifact: ship.lab_base,
            lab_base: ship.lab_base,
        },
        money: ship.money,
        odometer: 0.0,
        clock: Clock {
            day: 0,
            seconds: 0.0,
        },
        counters: Counters { next_event_id: 0 },
    }
}

/// A catalog holding only the home port, already explored.
pub fn build_initial_catalog(content: &GameContent, seed: u64) -> MemoryCatalog {
    let port = &content.ship.home_port;
    let mut profile = worldgen::profile_poi(seed, port.pos, Depth::Surface, content);
    profile.kind = PoiKind::OffshorePlatform;
    profile.weirdness = 1;
    profile.resources = match content.poi_types.def(PoiKind::OffshorePlatform) {
        Some(def) => match &def.resources {
            ResourceRule::Fixed(set) => set.iter().copied().collect(),
            ResourceRule::Pool(_) => ResourceSet::new(),
        },
        None => ResourceSet::new(),
    };
    let mut catalog = MemoryCatalog::new();
    catalog.insert_poi(NewPoi {
        pos: port.pos,
        depth: Depth::Surface,
        name: port.name.clone(),
        profile,
        description: port.description.clone(),
        images: vec![],
    });
    catalog
}
