//! Crew decision pass, run once per tick in fixed role order.
//!
//! The commanding officer owns the track. Engineers patch components,
//! scientists grind through lab work, and anyone aboard may write a
//! personal log.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::Catalog;
use crate::economy;
use crate::narrative::{self, ContentGenerator};
use crate::probability::{self, Frequency};
use crate::status::track_target;
use crate::{
    navigation, Constants, CourseReason, Event, EventLevel, GameContent, GridPos, PoiId, PoiKind,
    Position, Role, ShipState, Track,
};

const JEOPARDY_COMPONENTS: [crate::Component; 4] = [
    crate::Component::Hull,
    crate::Component::Engine,
    crate::Component::Lab,
    crate::Component::Bridge,
];

/// Runs every seat's duties. Vacant seats are skipped.
pub(crate) fn stand_watch(
    state: &mut ShipState,
    catalog: &dyn Catalog,
    narrator: &mut dyn ContentGenerator,
    content: &GameContent,
    rng: &mut impl Rng,
    level: EventLevel,
    outcomes: &mut Vec<Event>,
) {
    let constants = &content.constants;
    for role in Role::ALL {
        if state.crew.seat(role).is_vacant() {
            continue;
        }
        match role {
            Role::CommandingOfficer => command(state, catalog, constants, rng, outcomes),
            Role::ChiefEngineer => {
                maintain(state, role, constants.chief_engineer_repair_ceiling, constants, level, outcomes);
            }
            Role::JuniorEngineer => {
                maintain(state, role, constants.junior_engineer_repair_ceiling, constants, level, outcomes);
            }
            Role::ChiefScienceOfficer | Role::JuniorScientist => {
                economy::lab_work(state, role, constants, rng, level, outcomes);
            }
        }
        if probability::chance(rng, Frequency::Bidaily, &constants.frequency_ticks) {
            outcomes.extend(narrative::crew_log(state, narrator, role, None, ""));
        }
    }
}

fn maintain(
    state: &mut ShipState,
    role: Role,
    ceiling: f64,
    constants: &Constants,
    level: EventLevel,
    outcomes: &mut Vec<Event>,
) {
    if !state.crew.seat(role).fit_for(constants.min_working_health) {
        return;
    }
    if let Some((component, health)) = economy::repair_step(state, ceiling) {
        if level == EventLevel::Debug {
            outcomes.push(Event::ComponentMaintained {
                role,
                component,
                health,
            });
        }
    }
}

/// Commanding officer: drop stale tracks, answer jeopardy, pick a course,
/// and steer for it.
fn command(
    state: &mut ShipState,
    catalog: &dyn Catalog,
    constants: &Constants,
    rng: &mut impl Rng,
    outcomes: &mut Vec<Event>,
) {
    if !state.track.is_none() && track_target(&state.track, catalog).is_none() {
        state.track = Track::None;
    }

    if let Some((id, pos)) = jeopardy_destination(state, catalog, constants) {
        let track = Track::Poi { id };
        if track != state.track {
            state.track = track.clone();
            outcomes.push(Event::CourseSet {
                track,
                target: pos,
                reason: CourseReason::Jeopardy,
            });
        }
    }

    if state.track.is_none() {
        choose_course(state, catalog, constants, rng, outcomes);
    }

    if let Some(target) = track_target(&state.track, catalog) {
        state.heading = navigation::bearing(state.position, Some(target.center()));
        state.speed = state.max_speed;
    }
}

fn any_component_critical(state: &ShipState, constants: &Constants) -> bool {
    JEOPARDY_COMPONENTS
        .iter()
        .any(|c| state.health.get(*c) <= constants.jeopardy_component_health)
}

fn nearest_poi(
    origin: Position,
    catalog: &dyn Catalog,
    kinds: &[PoiKind],
) -> Option<(PoiId, GridPos)> {
    let candidates = kinds
        .iter()
        .flat_map(|kind| catalog.pois_by_kind(*kind))
        .map(|poi| ((poi.id.clone(), poi.pos), poi.pos.center()));
    navigation::closest(origin, candidates, false).map(|(found, _)| found)
}

/// Where the ship must go to survive, if anywhere.
///
/// Low fuel seeks the closest platform or deposit, or only deposits when a
/// full tank is unaffordable. Short provisions or a critical component send
/// the ship to the closest platform instead, when one is known.
pub(crate) fn jeopardy_destination(
    state: &ShipState,
    catalog: &dyn Catalog,
    constants: &Constants,
) -> Option<(PoiId, GridPos)> {
    let mut destination = None;

    if state.cargo.fuel < state.capacity.fuel * constants.jeopardy_fuel_fraction {
        let top_up = (state.capacity.fuel - state.cargo.fuel) * constants.fuel_price;
        let kinds: &[PoiKind] = if state.money >= top_up {
            &[PoiKind::OffshorePlatform, PoiKind::Deposit]
        } else {
            &[PoiKind::Deposit]
        };
        destination = nearest_poi(state.position, catalog, kinds);
    }

    let short_of_provisions = state.cargo.food <= constants.jeopardy_food
        || state.cargo.water <= constants.jeopardy_water;
    if short_of_provisions || any_component_critical(state, constants) {
        if let Some(platform) = nearest_poi(state.position, catalog, &[PoiKind::OffshorePlatform]) {
            destination = Some(platform);
        }
    }

    destination
}

fn choose_course(
    state: &mut ShipState,
    catalog: &dyn Catalog,
    constants: &Constants,
    rng: &mut impl Rng,
    outcomes: &mut Vec<Event>,
) {
    if !probability::coin(rng, constants.boldly_go_one_in) {
        let nearby: Vec<_> = catalog
            .all_contacts()
            .into_iter()
            .filter(|c| navigation::range(state.position, c.pos.center()) <= constants.exploration_radius)
            .collect();
        if let Some(contact) = nearby.choose(rng) {
            state.track = Track::Contact {
                id: contact.id.clone(),
            };
            outcomes.push(Event::CourseSet {
                track: state.track.clone(),
                target: contact.pos,
                reason: CourseReason::Explore,
            });
            return;
        }
    }
    boldly_go(state, constants, rng, outcomes);
}

fn boldly_go(
    state: &mut ShipState,
    constants: &Constants,
    rng: &mut impl Rng,
    outcomes: &mut Vec<Event>,
) {
    let (min, max) = (constants.boldly_go_min_distance, constants.boldly_go_max_distance);
    let distance = if max > min { rng.gen_range(min..max) } else { min };
    let heading = rng.gen_range(0.0..360.0);
    let waypoint = GridPos::containing(navigation::project(state.position, heading, distance));
    state.track = Track::BoldlyGoing { waypoint };
    outcomes.push(Event::CourseSet {
        track: state.track.clone(),
        target: waypoint,
        reason: CourseReason::BoldlyGo,
    });
}
