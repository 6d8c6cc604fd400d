//! Navigation geometry. Pure functions of their inputs.
//!
//! Headings are compass degrees measured clockwise from north (+y).

use crate::Position;

/// Compass bearing from `ship` to `target`, in `[0, 360)`.
///
/// Returns 0 when there is no target. A target sharing the ship's x
/// coordinate is due north (0) or due south (180).
pub fn bearing(ship: Position, target: Option<Position>) -> f64 {
    let Some(target) = target else {
        return 0.0;
    };
    let dx = target.x - ship.x;
    if dx == 0.0 {
        return if ship.y > target.y { 180.0 } else { 0.0 };
    }
    let offset = if dx > 0.0 { 90.0 } else { 270.0 };
    let angle = ((target.y - ship.y) / dx).atan().to_degrees();
    offset - angle
}

/// Euclidean distance.
pub fn range(a: Position, b: Position) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Dead reckoning: where `origin` ends up after `distance` on `heading`.
pub fn project(origin: Position, heading: f64, distance: f64) -> Position {
    let radians = heading.to_radians();
    Position::new(
        origin.x + distance * radians.sin(),
        origin.y + distance * radians.cos(),
    )
}

pub fn effective_range(base: f64, modifier_pct: f64) -> f64 {
    base * (1.0 + modifier_pct / 100.0)
}

/// Minutes to cover `distance` at `speed` knots. `None` when stopped.
pub fn eta(speed: f64, distance: f64) -> Option<f64> {
    if speed <= 0.0 {
        return None;
    }
    Some(distance / (speed / 60.0))
}

/// Renders minutes as `"H hours, M minutes"`.
pub fn format_eta(minutes: f64) -> String {
    let hours = (minutes / 60.0).floor();
    let rest = (minutes % 60.0).round();
    format!("{hours} hours, {rest} minutes")
}

/// Linear scan for the nearest (or farthest) candidate.
///
/// Ties keep the earliest candidate. Returns `None` for empty input, which
/// callers treat as "nothing qualifies".
pub fn closest<T>(
    origin: Position,
    candidates: impl IntoIterator<Item = (T, Position)>,
    pick_farthest: bool,
) -> Option<(T, f64)> {
    let mut best: Option<(T, f64)> = None;
    for (item, pos) in candidates {
        let distance = range(origin, pos);
        let better = match &best {
            None => true,
            Some((_, current)) if pick_farthest => distance > *current,
            Some((_, current)) => distance < *current,
        };
        if better {
            best = Some((item, distance));
        }
    }
    best
}
