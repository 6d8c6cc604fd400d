//! Physical and resource update for one tick of elapsed time.

use crate::crew::drift_health;
use crate::{navigation, Clock, Constants, ShipState};

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Advances the clock by `secs`, returning how many days rolled over.
pub(crate) fn advance_clock(clock: &mut Clock, secs: f64) -> u64 {
    clock.seconds += secs.max(0.0);
    let mut rollovers = 0;
    while clock.seconds >= SECONDS_PER_DAY {
        clock.seconds -= SECONDS_PER_DAY;
        clock.day += 1;
        rollovers += 1;
    }
    rollovers
}

/// Moves the ship, wears the engine, and burns supplies for `secs` seconds.
///
/// Food and water are rationed once per day rollover using the crew aboard
/// at that moment; crew health drifts continuously.
pub(crate) fn advance(state: &mut ShipState, constants: &Constants, secs: f64) {
    let rollovers = advance_clock(&mut state.clock, secs);

    let distance = (state.speed / 3600.0 * secs).max(0.0);
    if distance > 0.0 {
        state.position = navigation::project(state.position, state.heading, distance);
        state.odometer += distance;
    }

    let engine = state.health.engine - constants.engine_damage_per_sec * secs;
    state.health.set(crate::Component::Engine, engine);
    state.cargo.fuel = (state.cargo.fuel - state.fuel_efficiency * distance).max(0.0);

    if rollovers > 0 {
        let aboard = state.crew.count_aboard() as f64;
        let days = rollovers as f64;
        state.cargo.food = (state.cargo.food - constants.daily_food_per_crew * aboard * days).max(0.0);
        state.cargo.water =
            (state.cargo.water - constants.daily_water_per_crew * aboard * days).max(0.0);
    }

    drift_health(
        &mut state.crew,
        state.cargo.food,
        state.cargo.water,
        constants.crew_regen_per_sec,
        secs,
    );
}
