//! Deterministic world generation.
//!
//! Nothing about the ocean is stored until the ship looks at it. Every cell
//! derives its own random stream from the world seed, its coordinates, and a
//! context tag, so any cell can be regenerated in any order.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use xxhash_rust::xxh3::xxh3_64;

use crate::{
    Clock, Constants, Depth, GameContent, GridPos, PoiKind, PoiProfile, Position, ResourceRule,
    ResourceSet, SensorKind,
};

const POOL_DRAWS: usize = 2;

/// Fresh random stream for one cell and context.
pub fn cell_stream(seed: u64, cell: GridPos, context: &str) -> ChaCha8Rng {
    let key = format!("{seed}:{},{}{context}", cell.x, cell.y);
    ChaCha8Rng::seed_from_u64(xxh3_64(key.as_bytes()))
}

/// Stream for a decision taken in `cell` at a specific moment of ship time.
///
/// Folding the clock in keeps successive ticks spent in the same cell from
/// replaying identical rolls.
pub fn moment_stream(seed: u64, cell: GridPos, tag: &str, clock: &Clock) -> ChaCha8Rng {
    cell_stream(seed, cell, &format!("{tag}@{}-{}", clock.day, clock.seconds))
}

/// Inclusive integer bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i64,
    pub max_x: i64,
    pub min_y: i64,
    pub max_y: i64,
}

pub fn bounds(origin: Position, radius: f64) -> Bounds {
    Bounds {
        min_x: (origin.x - radius).round() as i64,
        max_x: (origin.x + radius).round() as i64,
        min_y: (origin.y - radius).round() as i64,
        max_y: (origin.y + radius).round() as i64,
    }
}

fn detection_probability(depth: Depth, constants: &Constants) -> f64 {
    match depth {
        Depth::Surface => constants.surface_detection_probability,
        Depth::Submerged => constants.submerged_detection_probability,
    }
}

/// Every cell in the box around `origin` that returns a contact to `sensor`.
///
/// Rows run from the top of the box down, columns left to right. Cost grows
/// with the square of the radius.
pub fn sensor_sweep(
    seed: u64,
    origin: Position,
    radius: f64,
    sensor: SensorKind,
    constants: &Constants,
) -> Vec<(GridPos, Depth)> {
    let depth = sensor.depth();
    let threshold = detection_probability(depth, constants);
    let area = bounds(origin, radius);
    let mut found = Vec::new();
    for y in (area.min_y..=area.max_y).rev() {
        for x in area.min_x..=area.max_x {
            let cell = GridPos::new(x, y);
            let roll: f64 = cell_stream(seed, cell, sensor.label()).gen();
            if roll < threshold {
                found.push((cell, depth));
            }
        }
    }
    found
}

/// Weirdness trends upward with latitude: `y / 100` nudged by up to one
/// point either way, then clamped into `[1, 10]`.
pub fn weirdness(y: i64, rng: &mut impl Rng) -> u8 {
    let nudged = (y as f64 / 1000.0) * 10.0 + rng.gen_range(-1.0..=1.0);
    if nudged < 1.0 {
        1
    } else if nudged > 10.0 {
        10
    } else {
        nudged.round() as u8
    }
}

/// The point of interest a contact turns out to be.
///
/// All properties come from the cell's own stream, so regenerating the same
/// cell always yields the same profile.
pub fn profile_poi(seed: u64, cell: GridPos, depth: Depth, content: &GameContent) -> PoiProfile {
    let mut rng = cell_stream(seed, cell, "");
    let defs = content.poi_types.for_depth(depth);
    let def = defs.choose_weighted(&mut rng, |def| def.weight).ok();
    let kind = def.map_or(
        match depth {
            Depth::Surface => PoiKind::Island,
            Depth::Submerged => PoiKind::UnderwaterCave,
        },
        |def| def.kind,
    );
    let adjective = content
        .poi_types
        .adjectives
        .choose(&mut rng)
        .cloned()
        .unwrap_or_default();
    let weirdness = weirdness(cell.y, &mut rng);
    let resources = match def.map(|def| &def.resources) {
        Some(ResourceRule::Fixed(set)) => set.iter().copied().collect(),
        Some(ResourceRule::Pool(pool)) => {
            let mut unique = ResourceSet::new();
            for resource in pool {
                if !unique.contains(resource) {
                    unique.push(*resource);
                }
            }
            unique
                .choose_multiple(&mut rng, POOL_DRAWS)
                .copied()
                .collect()
        }
        None => ResourceSet::new(),
    };
    PoiProfile {
        kind,
        adjective,
        weirdness,
        resources,
    }
}
