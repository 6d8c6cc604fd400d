//! Shared test fixtures for voyage_core and downstream crates.
//!
//! `base_content()` mirrors the shipped content directory closely enough for
//! scenario tests. `calm_content()` switches off incidents and detection so a
//! test only sees what it sets up.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::catalog::Catalog;
use crate::narrative::ContentGenerator;
use crate::{
    CargoHold, Clock, ComponentHealth, Constants, Counters, Crew, CrewTemplate, Depth,
    FrequencyTable, GameContent, GridPos, HomePort, MetaState, NewPoi, PoiId, PoiKind, PoiKindDef,
    PoiProfile, PoiTypeTable, Position, ResearchState, Resource, ResourceRule, ResourceSet, Role,
    Seat, SensorKind, SensorState, ShipState, ShipStatus, ShipTemplate, Track,
};

pub fn base_constants() -> Constants {
    Constants {
        frequency_ticks: FrequencyTable {
            daily: 17_280,
            bidaily: 34_560,
            weekly: 120_960,
            biweekly: 241_920,
            monthly: 518_400,
            bimonthly: 1_036_800,
        },
        surface_detection_probability: 0.0004,
        submerged_detection_probability: 0.0003,
        engine_damage_per_sec: 0.000_004_823,
        crew_regen_per_sec: 0.000_289_352,
        daily_food_per_crew: 3.0,
        daily_water_per_crew: 200.0,
        jeopardy_fuel_fraction: 1.0 / 3.0,
        jeopardy_component_health: 25.0,
        jeopardy_food: 105.0,
        jeopardy_water: 7_000.0,
        boldly_go_one_in: 10,
        boldly_go_min_distance: 240.0,
        boldly_go_max_distance: 1_680.0,
        exploration_radius: 480.0,
        emergency_speed: 3.0,
        min_working_health: 25.0,
        chief_engineer_repair_ceiling: 75.0,
        junior_engineer_repair_ceiling: 90.0,
        lab_fast_threshold: 75.0,
        lab_fast_effort: 1.0,
        lab_slow_effort: 0.5,
        artifact_reward_min: 30_000,
        artifact_reward_max: 50_000,
        tech_reward_min: 5_000,
        tech_reward_max: 10_000,
        upgrade_material_cost: 10.0,
        severe_storm_one_in: 10,
        severe_storm_multiplier: 3.0,
        malfunction_max_fraction: 0.75,
        storm_max_fraction: 0.25,
        creature_hull_max_fraction: 0.75,
        creature_component_max_fraction: 0.5,
        illness_max_fraction: 0.8,
        site_size_min: 1,
        site_size_max: 60,
        away_team_min_health: 75.0,
        away_team_size: 2,
        away_mishap_percent: 10,
        away_damage_min: 10,
        away_damage_max: 100,
        harvest_min: 10.0,
        harvest_max: 40.0,
        bulk_harvest_multiplier: 50.0,
        deposit_fuel_per_size: 100.0,
        hire_price: 500.0,
        repair_price_per_point: 10.0,
        fuel_price: 2.0,
        water_price: 2.0,
        food_price: 5.0,
        fallback_image: "images/no_signal.png".to_string(),
    }
}

fn kind(kind: PoiKind, weight: u32, resources: ResourceRule) -> PoiKindDef {
    PoiKindDef {
        kind,
        weight,
        resources,
    }
}

pub fn base_poi_types() -> PoiTypeTable {
    use Resource::{Artifact, Food, Fuel, Iron, Silicon, Tech, Water};
    PoiTypeTable {
        surface: vec![
            kind(PoiKind::Island, 50, ResourceRule::Pool(vec![Food, Water, Iron, Silicon, Tech, Artifact])),
            kind(PoiKind::Derelict, 15, ResourceRule::Pool(vec![Iron, Silicon, Tech, Artifact])),
            kind(PoiKind::OffshorePlatform, 10, ResourceRule::Fixed(vec![Fuel, Food, Water])),
            kind(PoiKind::Ship, 10, ResourceRule::Fixed(vec![Fuel, Food, Water])),
        ],
        submerged: vec![
            kind(PoiKind::Wreck, 30, ResourceRule::Fixed(vec![Iron, Tech, Artifact])),
            kind(PoiKind::Coral, 30, ResourceRule::Fixed(vec![Food])),
            kind(PoiKind::UnderwaterCave, 25, ResourceRule::Pool(vec![Iron, Silicon, Tech, Artifact])),
            kind(PoiKind::Deposit, 15, ResourceRule::Fixed(vec![Fuel])),
        ],
        adjectives: ["misty", "windswept", "overgrown", "silent", "glittering"]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
    }
}

fn crew_template() -> Vec<CrewTemplate> {
    [
        (Role::CommandingOfficer, "Captain", "Ines Marlowe"),
        (Role::ChiefEngineer, "Chief Engineer", "Tomas Reyes"),
        (Role::ChiefScienceOfficer, "Chief Science Officer", "Priya Natarajan"),
        (Role::JuniorEngineer, "Junior Engineer", "Owen Hale"),
        (Role::JuniorScientist, "Junior Scientist", "Mara Lindqvist"),
    ]
    .into_iter()
    .map(|(role, title, name)| CrewTemplate {
        role,
        title: title.to_string(),
        name: Some(name.to_string()),
    })
    .collect()
}

pub fn base_ship() -> ShipTemplate {
    ShipTemplate {
        name: "Meridian".to_string(),
        max_speed: 12.0,
        fuel_efficiency: 2.0,
        cargo: CargoHold {
            fuel: 4_000.0,
            food: 300.0,
            water: 20_000.0,
            iron: 100.0,
            silicon: 100.0,
        },
        capacity: CargoHold {
            fuel: 5_000.0,
            food: 500.0,
            water: 30_000.0,
            iron: 500.0,
            silicon: 500.0,
        },
        crew: crew_template(),
        sensors: vec![
            SensorState {
                kind: SensorKind::Radar,
                base_range: 24.0,
                modifier_pct: 0.0,
            },
            SensorState {
                kind: SensorKind::Visual,
                base_range: 12.0,
                modifier_pct: 0.0,
            },
            SensorState {
                kind: SensorKind::Sonar,
                base_range: 6.0,
                modifier_pct: 0.0,
            },
        ],
        lab_base: 60.0,
        money: 100_000.0,
        home_port: HomePort {
            name: "Port Endeavour".to_string(),
            pos: GridPos::new(0, 0),
            description: "A busy offshore platform and the ship's home port.".to_string(),
        },
    }
}

pub fn base_content() -> GameContent {
    GameContent {
        content_version: "test".to_string(),
        constants: base_constants(),
        poi_types: base_poi_types(),
        ship: base_ship(),
    }
}

/// No incidents, no detections, no personal logs.
pub fn calm_content() -> GameContent {
    let mut content = base_content();
    let never = u64::MAX;
    content.constants.frequency_ticks = FrequencyTable {
        daily: never,
        bidaily: never,
        weekly: never,
        biweekly: never,
        monthly: never,
        bimonthly: never,
    };
    content.constants.surface_detection_probability = 0.0;
    content.constants.submerged_detection_probability = 0.0;
    content
}

pub fn base_crew() -> Crew {
    let seat = |title: &str, name: &str| Seat {
        occupant: Some(name.to_string()),
        health: 100.0,
        title: title.to_string(),
    };
    Crew {
        commanding_officer: seat("Captain", "Ines Marlowe"),
        chief_engineer: seat("Chief Engineer", "Tomas Reyes"),
        chief_science_officer: seat("Chief Science Officer", "Priya Natarajan"),
        junior_engineer: seat("Junior Engineer", "Owen Hale"),
        junior_scientist: seat("Junior Scientist", "Mara Lindqvist"),
    }
}

/// Fresh ship at the home port, idle, everything at full health.
pub fn base_state(content: &GameContent) -> ShipState {
    let ship = &content.ship;
    ShipState {
        meta: MetaState {
            tick: 0,
            seed: 42,
            schema_version: crate::SCHEMA_VERSION,
            content_version: content.content_version.clone(),
        },
        name: ship.name.clone(),
        status: ShipStatus::Underway,
        position: Position::new(0.0, 0.0),
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
        crew: base_crew(),
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

pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

/// Registers an explored site of `kind` at `pos` and returns its id.
pub fn insert_site(catalog: &mut dyn Catalog, pos: GridPos, kind: PoiKind) -> PoiId {
    let depth = match kind {
        PoiKind::Wreck | PoiKind::Coral | PoiKind::UnderwaterCave | PoiKind::Deposit => {
            Depth::Submerged
        }
        _ => Depth::Surface,
    };
    catalog.insert_poi(NewPoi {
        pos,
        depth,
        name: format!("Test {kind}"),
        profile: PoiProfile {
            kind,
            adjective: "silent".to_string(),
            weirdness: 3,
            resources: ResourceSet::new(),
        },
        description: format!("A test {kind}."),
        images: vec![],
    })
}

/// Content generator that is always down.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingNarrator;

impl ContentGenerator for FailingNarrator {
    fn describe(&mut self, _prompt: &str) -> Option<String> {
        None
    }

    fn image(&mut self, _prompt: &str, _tag: &str) -> Option<String> {
        None
    }

    fn name(&mut self, _subject: &str) -> Option<String> {
        None
    }
}

/// Content generator that replays queued answers and records every call.
///
/// Descriptions and names come from the queues (`None` once empty). Images
/// always succeed with a reference derived from the tag.
#[derive(Debug, Default, Clone)]
pub struct ScriptedNarrator {
    pub names: VecDeque<String>,
    pub descriptions: VecDeque<String>,
    pub prompts: Vec<String>,
    pub image_tags: Vec<String>,
}

impl ContentGenerator for ScriptedNarrator {
    fn describe(&mut self, prompt: &str) -> Option<String> {
        self.prompts.push(prompt.to_string());
        self.descriptions.pop_front()
    }

    fn image(&mut self, _prompt: &str, tag: &str) -> Option<String> {
        self.image_tags.push(tag.to_string());
        Some(format!("images/{tag}.png"))
    }

    fn name(&mut self, _subject: &str) -> Option<String> {
        self.names.pop_front()
    }
}
