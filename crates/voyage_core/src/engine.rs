use crate::catalog::Catalog;
use crate::narrative::ContentGenerator;
use crate::status::{self, StatusReport};
use crate::worldgen::{moment_stream, sensor_sweep};
use crate::{
    arrival, crew, duty, incidents, navigation, underway, Constants, Event, EventEnvelope,
    EventLevel, GameContent, GridPos, Role, ShipState, ShipStatus, Track,
};

/// External collaborators the orchestrator talks to during a tick.
pub struct Services<'a> {
    pub catalog: &'a mut dyn Catalog,
    pub narrator: &'a mut dyn ContentGenerator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum TerminationReason {
    ShipLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum TickStatus {
    Continue,
    Terminated(TerminationReason),
}

#[derive(Debug, Clone)]
pub struct TickReport {
    pub events: Vec<EventEnvelope>,
    pub status: TickStatus,
    pub summary: StatusReport,
}

/// Advance the simulation by `elapsed_secs` of ship time.
///
/// Order of operations:
/// 1. Move the ship, wear the engine, burn supplies, drift crew health.
/// 2. Sweep every sensor and register new contacts.
/// 3. Crew duties, commanding officer first.
/// 4. Incident rolls.
/// 5. Arrival, ship loss, crew casualties, then the speed for next tick.
///
/// A lost ship is never mutated again; later calls return `Terminated`
/// with no events.
pub fn tick(
    state: &mut ShipState,
    services: &mut Services<'_>,
    content: &GameContent,
    elapsed_secs: f64,
    event_level: EventLevel,
) -> TickReport {
    if state.status == ShipStatus::Lost {
        return TickReport {
            events: Vec::new(),
            status: TickStatus::Terminated(TerminationReason::ShipLost),
            summary: status::summarize(state, &*services.catalog, content),
        };
    }

    let constants = &content.constants;
    let mut outcomes = Vec::new();

    underway::advance(state, constants, elapsed_secs);
    sweep_sensors(state, services.catalog, constants, &mut outcomes);

    let cell = GridPos::containing(state.position);
    let mut crew_rng = moment_stream(state.meta.seed, cell, "crew", &state.clock);
    duty::stand_watch(
        state,
        &*services.catalog,
        services.narrator,
        content,
        &mut crew_rng,
        event_level,
        &mut outcomes,
    );

    let mut incident_rng = moment_stream(state.meta.seed, cell, "incident", &state.clock);
    incidents::roll(
        state,
        &*services.catalog,
        services.narrator,
        content,
        &mut incident_rng,
        &mut outcomes,
    );

    arrival::check(state, services, content, &mut outcomes);

    outcomes.extend(crew::resolve_casualties(&mut state.crew));
    let outcome = if state.health.hull <= 0.0 {
        abandon_ship(state, &mut outcomes);
        TickStatus::Terminated(TerminationReason::ShipLost)
    } else {
        derive_speed(state, constants);
        TickStatus::Continue
    };

    let current_tick = state.meta.tick;
    let events = outcomes
        .into_iter()
        .map(|event| crate::emit(&mut state.counters, current_tick, event))
        .collect();
    state.meta.tick += 1;

    TickReport {
        events,
        status: outcome,
        summary: status::summarize(state, &*services.catalog, content),
    }
}

fn sweep_sensors(
    state: &ShipState,
    catalog: &mut dyn Catalog,
    constants: &Constants,
    outcomes: &mut Vec<Event>,
) {
    for sensor in &state.sensors {
        let radius = navigation::effective_range(sensor.base_range, sensor.modifier_pct);
        let found = sensor_sweep(state.meta.seed, state.position, radius, sensor.kind, constants);
        let created = catalog.insert_contacts(&found);
        if !created.is_empty() {
            outcomes.push(Event::ContactsDetected {
                sensor: sensor.kind,
                count: created.len(),
            });
        }
    }
}

fn count_survivors(state: &ShipState) -> usize {
    Role::ALL
        .iter()
        .map(|role| state.crew.seat(*role))
        .filter(|seat| !seat.is_vacant() && seat.health > 0.0)
        .count()
}

/// Terminal transition: all stop, distress call, status flips to lost.
fn abandon_ship(state: &mut ShipState, outcomes: &mut Vec<Event>) {
    state.speed = 0.0;
    state.heading = 0.0;
    state.track = Track::None;
    state.status = ShipStatus::Lost;

    let position = GridPos::containing(state.position);
    let survivors = count_survivors(state);
    outcomes.push(Event::LogEntry {
        author: "SHIPCOM".to_string(),
        title: format!(
            "EMERGENCY AUTOMATED MESSAGE {}: ABANDONED SHIP",
            state.name.to_uppercase()
        ),
        body: format!(
            "The hull of {} has failed and the ship has been abandoned at {}, {}. \
             {survivors} surviving crew have taken to the lifeboats. All vessels in the \
             area are requested to render assistance.",
            state.name, position.x, position.y
        ),
    });
    outcomes.push(Event::ShipLost {
        survivors,
        position,
    });
}

/// Speed for the next tick, scaled by hull and engine condition.
///
/// A dead engine or an empty tank stops the ship; any other positive speed
/// is held at or above emergency sail.
pub(crate) fn derive_speed(state: &mut ShipState, constants: &Constants) {
    let base = if state.speed > 0.0 {
        state.max_speed
    } else {
        0.0
    };
    let condition = (state.health.hull + state.health.engine) / 2.0 / 100.0;
    let mut speed = base * condition;
    if state.health.engine <= 0.0 || state.cargo.fuel <= 0.0 {
        speed = 0.0;
    }
    if speed > 0.0 && speed < constants.emergency_speed {
        speed = constants.emergency_speed;
    }
    state.speed = speed;
}
