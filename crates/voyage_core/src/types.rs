//! Type definitions for `voyage_core`.
//!
//! The ship-state aggregate, catalog records, content definitions, and the
//! event vocabulary shared by every part of the simulation.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::probability::FrequencyTable;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(EventId);
string_id!(ContactId);
string_id!(PoiId);

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Continuous ocean coordinates. One unit is one nautical mile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Integer grid cell. Catalog keys and world generation both work on cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i64,
    pub y: i64,
}

impl GridPos {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The cell containing `pos`, rounding half away from zero.
    pub fn containing(pos: Position) -> Self {
        Self {
            x: pos.x.round() as i64,
            y: pos.y.round() as i64,
        }
    }

    pub fn center(self) -> Position {
        Position::new(self.x as f64, self.y as f64)
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventLevel {
    Normal,
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Depth {
    Surface,
    Submerged,
}

impl Depth {
    pub fn label(self) -> &'static str {
        match self {
            Depth::Surface => "surface",
            Depth::Submerged => "submerged",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Radar,
    Visual,
    Sonar,
}

impl SensorKind {
    pub fn label(self) -> &'static str {
        match self {
            SensorKind::Radar => "radar",
            SensorKind::Visual => "visual",
            SensorKind::Sonar => "sonar",
        }
    }

    /// Sonar hears submerged returns; everything else sees the surface.
    pub fn depth(self) -> Depth {
        match self {
            SensorKind::Radar | SensorKind::Visual => Depth::Surface,
            SensorKind::Sonar => Depth::Submerged,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiKind {
    Island,
    Derelict,
    Wreck,
    Coral,
    UnderwaterCave,
    Deposit,
    OffshorePlatform,
    Ship,
}

impl PoiKind {
    pub const ALL: [PoiKind; 8] = [
        PoiKind::Island,
        PoiKind::Derelict,
        PoiKind::Wreck,
        PoiKind::Coral,
        PoiKind::UnderwaterCave,
        PoiKind::Deposit,
        PoiKind::OffshorePlatform,
        PoiKind::Ship,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PoiKind::Island => "island",
            PoiKind::Derelict => "derelict",
            PoiKind::Wreck => "wreck",
            PoiKind::Coral => "coral",
            PoiKind::UnderwaterCave => "underwater cave",
            PoiKind::Deposit => "deposit",
            PoiKind::OffshorePlatform => "offshore platform",
            PoiKind::Ship => "ship",
        }
    }

    /// Sites worth photographing and sending an away team to.
    pub fn is_photogenic(self) -> bool {
        matches!(
            self,
            PoiKind::Island
                | PoiKind::Derelict
                | PoiKind::Wreck
                | PoiKind::Coral
                | PoiKind::UnderwaterCave
        )
    }

    /// Infrastructure-like sites whose resources never vary by cell.
    pub fn has_fixed_resources(self) -> bool {
        matches!(
            self,
            PoiKind::OffshorePlatform
                | PoiKind::Ship
                | PoiKind::Wreck
                | PoiKind::Coral
                | PoiKind::Deposit
        )
    }

    /// Sites where the away team can expect flora and fauna.
    pub fn bears_life(self) -> bool {
        matches!(
            self,
            PoiKind::Island | PoiKind::Wreck | PoiKind::Coral | PoiKind::UnderwaterCave
        )
    }
}

impl std::fmt::Display for PoiKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Fuel,
    Food,
    Water,
    Iron,
    Silicon,
    Tech,
    Artifact,
}

impl Resource {
    /// The cargo hold a gathered resource lands in, if it is bulk cargo.
    pub fn cargo(self) -> Option<Cargo> {
        match self {
            Resource::Fuel => Some(Cargo::Fuel),
            Resource::Food => Some(Cargo::Food),
            Resource::Water => Some(Cargo::Water),
            Resource::Iron => Some(Cargo::Iron),
            Resource::Silicon => Some(Cargo::Silicon),
            Resource::Tech | Resource::Artifact => None,
        }
    }
}

pub type ResourceSet = SmallVec<[Resource; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Hull,
    Engine,
    Lab,
    Bridge,
    Dinghy,
    Sub,
}

impl Component {
    pub const ALL: [Component; 6] = [
        Component::Hull,
        Component::Engine,
        Component::Lab,
        Component::Bridge,
        Component::Dinghy,
        Component::Sub,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Component::Hull => "hull",
            Component::Engine => "engine",
            Component::Lab => "lab",
            Component::Bridge => "bridge",
            Component::Dinghy => "dinghy",
            Component::Sub => "sub",
        }
    }

    /// Raw material consumed per point of crew repair.
    pub fn repair_material(self) -> Cargo {
        match self {
            Component::Engine | Component::Dinghy | Component::Sub | Component::Hull => Cargo::Iron,
            Component::Lab | Component::Bridge => Cargo::Silicon,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cargo {
    Fuel,
    Food,
    Water,
    Iron,
    Silicon,
}

impl Cargo {
    pub const ALL: [Cargo; 5] = [
        Cargo::Fuel,
        Cargo::Food,
        Cargo::Water,
        Cargo::Iron,
        Cargo::Silicon,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Cargo::Fuel => "fuel",
            Cargo::Food => "food",
            Cargo::Water => "water",
            Cargo::Iron => "iron",
            Cargo::Silicon => "silicon",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    CommandingOfficer,
    ChiefEngineer,
    ChiefScienceOfficer,
    JuniorEngineer,
    JuniorScientist,
}

impl Role {
    /// Duty order. The commanding officer always acts first.
    pub const ALL: [Role; 5] = [
        Role::CommandingOfficer,
        Role::ChiefEngineer,
        Role::ChiefScienceOfficer,
        Role::JuniorEngineer,
        Role::JuniorScientist,
    ];

    pub fn short(self) -> &'static str {
        match self {
            Role::CommandingOfficer => "co",
            Role::ChiefEngineer => "cheng",
            Role::ChiefScienceOfficer => "cso",
            Role::JuniorEngineer => "eng",
            Role::JuniorScientist => "sci",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Tech,
    Artifact,
}

// ---------------------------------------------------------------------------
// Ship state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipState {
    pub meta: MetaState,
    pub name: String,
    pub status: ShipStatus,
    pub position: Position,
    /// Compass degrees, clockwise from north.
    pub heading: f64,
    /// Knots.
    pub speed: f64,
    pub max_speed: f64,
    /// Fuel burned per nautical mile.
    pub fuel_efficiency: f64,
    pub track: Track,
    pub health: ComponentHealth,
    pub cargo: CargoHold,
    pub capacity: CargoHold,
    pub crew: Crew,
    pub sensors: Vec<SensorState>,
    pub research: ResearchState,
    pub money: f64,
    pub odometer: f64,
    pub clock: Clock,
    pub counters: Counters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaState {
    pub tick: u64,
    /// World seed. Every generated cell derives from it.
    pub seed: u64,
    pub schema_version: u32,
    pub content_version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipStatus {
    Underway,
    Lost,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Track {
    None,
    /// Sailing for an arbitrary distant waypoint with no catalog entry.
    BoldlyGoing { waypoint: GridPos },
    Contact { id: ContactId },
    /// Heading back to an already-explored point of interest.
    Poi { id: PoiId },
}

impl Track {
    pub fn is_none(&self) -> bool {
        matches!(self, Track::None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub hull: f64,
    pub engine: f64,
    pub lab: f64,
    pub bridge: f64,
    pub dinghy: f64,
    pub sub: f64,
}

impl ComponentHealth {
    pub fn get(&self, component: Component) -> f64 {
        match component {
            Component::Hull => self.hull,
            Component::Engine => self.engine,
            Component::Lab => self.lab,
            Component::Bridge => self.bridge,
            Component::Dinghy => self.dinghy,
            Component::Sub => self.sub,
        }
    }

    pub fn set(&mut self, component: Component, value: f64) {
        let slot = match component {
            Component::Hull => &mut self.hull,
            Component::Engine => &mut self.engine,
            Component::Lab => &mut self.lab,
            Component::Bridge => &mut self.bridge,
            Component::Dinghy => &mut self.dinghy,
            Component::Sub => &mut self.sub,
        };
        *slot = value.clamp(0.0, 100.0);
    }

    /// Subtracts `amount`, clamped at zero. Returns the new health.
    pub fn damage(&mut self, component: Component, amount: f64) -> f64 {
        self.set(component, self.get(component) - amount);
        self.get(component)
    }

    /// Mean over every component, for status display.
    pub fn overall(&self) -> f64 {
        Component::ALL.iter().map(|c| self.get(*c)).sum::<f64>() / Component::ALL.len() as f64
    }
}

/// Bulk cargo quantities. Also used for the matching capacities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoHold {
    pub fuel: f64,
    pub food: f64,
    pub water: f64,
    pub iron: f64,
    pub silicon: f64,
}

impl CargoHold {
    pub fn get(&self, cargo: Cargo) -> f64 {
        match cargo {
            Cargo::Fuel => self.fuel,
            Cargo::Food => self.food,
            Cargo::Water => self.water,
            Cargo::Iron => self.iron,
            Cargo::Silicon => self.silicon,
        }
    }

    pub fn get_mut(&mut self, cargo: Cargo) -> &mut f64 {
        match cargo {
            Cargo::Fuel => &mut self.fuel,
            Cargo::Food => &mut self.food,
            Cargo::Water => &mut self.water,
            Cargo::Iron => &mut self.iron,
            Cargo::Silicon => &mut self.silicon,
        }
    }
}

/// One duty station. `occupant == None` is a vacant seat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub occupant: Option<String>,
    pub health: f64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crew {
    pub commanding_officer: Seat,
    pub chief_engineer: Seat,
    pub chief_science_officer: Seat,
    pub junior_engineer: Seat,
    pub junior_scientist: Seat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    pub kind: SensorKind,
    pub base_range: f64,
    /// Percent bonus over `base_range`, raised by tech upgrades.
    pub modifier_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchState {
    pub pending_tech: u32,
    pub pending_artifact: u32,
    pub effort_tech: f64,
    pub effort_artifact: f64,
    /// Effort counters reset to this value after each completed analysis.
    pub lab_base: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    pub day: u64,
    /// Seconds into the current day, always below 86400.
    pub seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
}

// ---------------------------------------------------------------------------
// Catalog records
// ---------------------------------------------------------------------------

/// An unexplored sensor return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub pos: GridPos,
    pub depth: Depth,
}

/// Deterministic properties of a cell's point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiProfile {
    pub kind: PoiKind,
    pub adjective: String,
    pub weirdness: u8,
    pub resources: ResourceSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub id: PoiId,
    pub pos: GridPos,
    pub depth: Depth,
    pub name: String,
    pub profile: PoiProfile,
    pub description: String,
    pub images: Vec<String>,
}

/// Everything needed to create a POI record; the catalog assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPoi {
    pub pos: GridPos,
    pub depth: Depth,
    pub name: String,
    pub profile: PoiProfile,
    pub description: String,
    pub images: Vec<String>,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub tick: u64,
    pub event: Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseReason {
    Jeopardy,
    BoldlyGo,
    Explore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Upgrade {
    MaxSpeed { knots: f64 },
    SensorRange { sensor: SensorKind, modifier_pct: f64 },
    FuelEfficiency { per_mile: f64, at_floor: bool },
    LabBase { reduced_by: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    ContactsDetected {
        sensor: SensorKind,
        count: usize,
    },
    CourseSet {
        track: Track,
        target: GridPos,
        reason: CourseReason,
    },
    WaypointReached {
        waypoint: GridPos,
    },
    PoiDiscovered {
        poi_id: PoiId,
        name: String,
        kind: PoiKind,
    },
    PoiRevisited {
        poi_id: PoiId,
        name: String,
    },
    AwayTeamDeployed {
        site: String,
        members: Vec<Role>,
        craft: Component,
    },
    CraftDamaged {
        craft: Component,
        damage: f64,
        destroyed: bool,
    },
    CrewInjured {
        role: Role,
        damage: f64,
    },
    ResourcesGathered {
        cargo: Cargo,
        amount: f64,
    },
    CrewHired {
        role: Role,
        name: String,
        price: f64,
    },
    ShipyardRepair {
        component: Component,
        cost: f64,
    },
    SuppliesPurchased {
        cargo: Cargo,
        amount: f64,
        cost: f64,
    },
    /// Only emitted at `EventLevel::Debug`.
    ComponentMaintained {
        role: Role,
        component: Component,
        health: f64,
    },
    /// Only emitted at `EventLevel::Debug`.
    LabWork {
        role: Role,
        subject: Subject,
        remaining: f64,
    },
    ResearchCompleted {
        subject: Subject,
        reward: f64,
        upgrade: Option<Upgrade>,
    },
    Malfunction {
        component: Component,
        damage: f64,
    },
    Storm {
        severe: bool,
        damage: Vec<(Component, f64)>,
    },
    CreatureAttack {
        hull_damage: f64,
        component: Component,
        component_damage: f64,
    },
    Illness {
        role: Role,
        damage: f64,
    },
    CrewDied {
        role: Role,
        name: String,
    },
    CrewPromoted {
        from: Role,
        to: Role,
        name: String,
    },
    LogEntry {
        author: String,
        title: String,
        body: String,
    },
    Gallery {
        title: String,
        images: Vec<String>,
    },
    ShipLost {
        survivors: usize,
        position: GridPos,
    },
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameContent {
    pub content_version: String,
    pub constants: Constants,
    pub poi_types: PoiTypeTable,
    pub ship: ShipTemplate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoiTypeTable {
    pub surface: Vec<PoiKindDef>,
    pub submerged: Vec<PoiKindDef>,
    pub adjectives: Vec<String>,
}

impl PoiTypeTable {
    pub fn for_depth(&self, depth: Depth) -> &[PoiKindDef] {
        match depth {
            Depth::Surface => &self.surface,
            Depth::Submerged => &self.submerged,
        }
    }

    pub fn def(&self, kind: PoiKind) -> Option<&PoiKindDef> {
        self.surface
            .iter()
            .chain(&self.submerged)
            .find(|def| def.kind == kind)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoiKindDef {
    pub kind: PoiKind,
    pub weight: u32,
    pub resources: ResourceRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceRule {
    /// Every site of this kind carries exactly this set.
    Fixed(Vec<Resource>),
    /// Each site draws two distinct resources from the pool.
    Pool(Vec<Resource>),
}

/// Starting ship for a new game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipTemplate {
    pub name: String,
    pub max_speed: f64,
    pub fuel_efficiency: f64,
    pub cargo: CargoHold,
    pub capacity: CargoHold,
    pub crew: Vec<CrewTemplate>,
    pub sensors: Vec<SensorState>,
    pub lab_base: f64,
    pub money: f64,
    pub home_port: HomePort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewTemplate {
    pub role: Role,
    pub title: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomePort {
    pub name: String,
    pub pos: GridPos,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    /// Five-second ticks per named recurrence period.
    pub frequency_ticks: FrequencyTable,
    pub surface_detection_probability: f64,
    pub submerged_detection_probability: f64,
    pub engine_damage_per_sec: f64,
    /// Crew heal rate when fed and watered; also the base starvation rate.
    pub crew_regen_per_sec: f64,
    pub daily_food_per_crew: f64,
    pub daily_water_per_crew: f64,
    // Captain
    pub jeopardy_fuel_fraction: f64,
    pub jeopardy_component_health: f64,
    pub jeopardy_food: f64,
    pub jeopardy_water: f64,
    /// One-in-N chance of boldly going when no track is set.
    pub boldly_go_one_in: u64,
    pub boldly_go_min_distance: f64,
    pub boldly_go_max_distance: f64,
    pub exploration_radius: f64,
    pub emergency_speed: f64,
    // Crew work
    pub min_working_health: f64,
    pub chief_engineer_repair_ceiling: f64,
    pub junior_engineer_repair_ceiling: f64,
    pub lab_fast_threshold: f64,
    pub lab_fast_effort: f64,
    pub lab_slow_effort: f64,
    pub artifact_reward_min: u32,
    pub artifact_reward_max: u32,
    pub tech_reward_min: u32,
    pub tech_reward_max: u32,
    pub upgrade_material_cost: f64,
    // Incidents
    pub severe_storm_one_in: u64,
    pub severe_storm_multiplier: f64,
    pub malfunction_max_fraction: f64,
    pub storm_max_fraction: f64,
    pub creature_hull_max_fraction: f64,
    pub creature_component_max_fraction: f64,
    pub illness_max_fraction: f64,
    // Away missions
    pub site_size_min: u32,
    pub site_size_max: u32,
    pub away_team_min_health: f64,
    pub away_team_size: usize,
    pub away_mishap_percent: u32,
    pub away_damage_min: u32,
    pub away_damage_max: u32,
    pub harvest_min: f64,
    pub harvest_max: f64,
    pub bulk_harvest_multiplier: f64,
    pub deposit_fuel_per_size: f64,
    // Prices
    pub hire_price: f64,
    pub repair_price_per_point: f64,
    pub fuel_price: f64,
    pub water_price: f64,
    pub food_price: f64,
    /// Image reference substituted when the content generator fails.
    pub fallback_image: String,
}
