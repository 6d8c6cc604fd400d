//! Stochastic incidents: malfunctions, storms, creature attacks, illness.
//!
//! Each check is an independent 1/N trial, so several can land on the same
//! tick. Damage scales with the target's current health.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::Catalog;
use crate::narrative::{self, ContentGenerator};
use crate::probability::{self, Frequency};
use crate::status;
use crate::{Component, Event, GameContent, GridPos, Role, ShipState};

const MALFUNCTION_TARGETS: [Component; 5] = [
    Component::Engine,
    Component::Lab,
    Component::Bridge,
    Component::Dinghy,
    Component::Sub,
];

const STORM_TARGETS: [Component; 5] = [
    Component::Hull,
    Component::Lab,
    Component::Bridge,
    Component::Dinghy,
    Component::Sub,
];

fn log_incident(
    state: &ShipState,
    catalog: &dyn Catalog,
    narrator: &mut dyn ContentGenerator,
    content: &GameContent,
    role: Role,
    occasion: &str,
    outcomes: &mut Vec<Event>,
) {
    let footer = status::summarize(state, catalog, content).footer();
    outcomes.extend(narrative::crew_log(state, narrator, role, Some(occasion), &footer));
}

/// Rolls every incident once for this tick.
pub(crate) fn roll(
    state: &mut ShipState,
    catalog: &dyn Catalog,
    narrator: &mut dyn ContentGenerator,
    content: &GameContent,
    rng: &mut impl Rng,
    outcomes: &mut Vec<Event>,
) {
    let table = &content.constants.frequency_ticks;
    if probability::chance(rng, Frequency::Biweekly, table) {
        let component = malfunction(state, content, rng, outcomes);
        let occasion = format!("malfunction of the {}", component.label());
        log_incident(state, catalog, narrator, content, Role::ChiefEngineer, &occasion, outcomes);
    }
    if probability::chance(rng, Frequency::Weekly, table) {
        let severe = storm(state, content, rng, outcomes);
        let occasion = if severe {
            "encountered a severe storm while at sea"
        } else {
            "encountered a light storm while at sea"
        };
        log_incident(state, catalog, narrator, content, Role::CommandingOfficer, occasion, outcomes);
    }
    if probability::chance(rng, Frequency::Monthly, table) {
        creature_attack(state, narrator, content, rng, outcomes);
        log_incident(
            state,
            catalog,
            narrator,
            content,
            Role::CommandingOfficer,
            "attack by a sea creature",
            outcomes,
        );
    }
    if probability::chance(rng, Frequency::Monthly, table) {
        if let Some(role) = illness(state, content, rng, outcomes) {
            let occasion = format!("illness of {}", state.crew.seat(role).full_name());
            log_incident(state, catalog, narrator, content, Role::ChiefScienceOfficer, &occasion, outcomes);
        }
    }
}

pub(crate) fn malfunction(
    state: &mut ShipState,
    content: &GameContent,
    rng: &mut impl Rng,
    outcomes: &mut Vec<Event>,
) -> Component {
    let component = *MALFUNCTION_TARGETS.choose(rng).unwrap_or(&Component::Engine);
    let damage = state.health.get(component)
        * rng.gen::<f64>()
        * content.constants.malfunction_max_fraction;
    state.health.damage(component, damage);
    outcomes.push(Event::Malfunction { component, damage });
    component
}

/// Returns whether the storm was severe.
pub(crate) fn storm(
    state: &mut ShipState,
    content: &GameContent,
    rng: &mut impl Rng,
    outcomes: &mut Vec<Event>,
) -> bool {
    let constants = &content.constants;
    let severe = probability::coin(rng, constants.severe_storm_one_in);
    let multiplier = if severe {
        constants.severe_storm_multiplier
    } else {
        1.0
    };
    let damage = STORM_TARGETS
        .iter()
        .map(|component| {
            let amount = state.health.get(*component)
                * rng.gen::<f64>()
                * constants.storm_max_fraction
                * multiplier;
            state.health.damage(*component, amount);
            (*component, amount)
        })
        .collect();
    outcomes.push(Event::Storm { severe, damage });
    severe
}

pub(crate) fn creature_attack(
    state: &mut ShipState,
    narrator: &mut dyn ContentGenerator,
    content: &GameContent,
    rng: &mut impl Rng,
    outcomes: &mut Vec<Event>,
) {
    let constants = &content.constants;
    let hull = state.health.hull;
    let hull_damage = (hull * rng.gen::<f64>() * constants.creature_hull_max_fraction).floor();
    let component = *MALFUNCTION_TARGETS.choose(rng).unwrap_or(&Component::Engine);
    let component_damage =
        (hull * rng.gen::<f64>() * constants.creature_component_max_fraction).round();
    state.health.damage(Component::Hull, hull_damage);
    state.health.damage(component, component_damage);
    outcomes.push(Event::CreatureAttack {
        hull_damage,
        component,
        component_damage,
    });

    let cell = GridPos::containing(state.position);
    let tag = narrative::image_tag(state, cell.x, cell.y, "creature", "attack");
    let image = narrative::photograph(
        narrator,
        "an enormous sea creature attacking a small research vessel on the open ocean",
        &tag,
        constants,
    );
    outcomes.push(Event::Gallery {
        title: format!("Footage from the creature attack on day {}", state.clock.day),
        images: vec![image],
    });
}

/// Sickens one crew member aboard. Returns who, if anyone was aboard.
pub(crate) fn illness(
    state: &mut ShipState,
    content: &GameContent,
    rng: &mut impl Rng,
    outcomes: &mut Vec<Event>,
) -> Option<Role> {
    let aboard: Vec<Role> = Role::ALL
        .into_iter()
        .filter(|role| !state.crew.seat(*role).is_vacant())
        .collect();
    let role = *aboard.choose(rng)?;
    let damage =
        state.crew.seat(role).health * rng.gen::<f64>() * content.constants.illness_max_fraction;
    state.crew.adjust_health(role, -damage);
    outcomes.push(Event::Illness { role, damage });
    Some(role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::test_fixtures::{base_content, base_state, make_rng, FailingNarrator};

    #[test]
    fn malfunction_never_touches_hull() {
        let content = base_content();
        let mut rng = make_rng();
        for _ in 0..100 {
            let mut state = base_state(&content);
            let mut outcomes = Vec::new();
            let component = malfunction(&mut state, &content, &mut rng, &mut outcomes);
            assert_ne!(component, Component::Hull);
            assert!((state.health.hull - 100.0).abs() < 1e-9);
            let lost = 100.0 - state.health.get(component);
            assert!((0.0..=75.0).contains(&lost));
        }
    }

    #[test]
    fn storm_damage_is_bounded_by_multiplier() {
        let content = base_content();
        let mut rng = make_rng();
        let mut saw_severe = false;
        for _ in 0..500 {
            let mut state = base_state(&content);
            let mut outcomes = Vec::new();
            let severe = storm(&mut state, &content, &mut rng, &mut outcomes);
            saw_severe |= severe;
            let cap = if severe { 75.0 } else { 25.0 };
            let Event::Storm { damage, .. } = &outcomes[0] else {
                panic!("expected storm");
            };
            assert_eq!(damage.len(), 5);
            for (component, amount) in damage {
                assert!(*amount <= cap);
                assert!(state.health.get(*component) >= 0.0);
            }
            assert!((state.health.engine - 100.0).abs() < 1e-9);
        }
        assert!(saw_severe);
    }

    #[test]
    fn creature_attack_uses_pre_attack_hull() {
        let content = base_content();
        let mut rng = make_rng();
        for _ in 0..100 {
            let mut state = base_state(&content);
            state.health.hull = 40.0;
            let mut outcomes = Vec::new();
            creature_attack(&mut state, &mut FailingNarrator, &content, &mut rng, &mut outcomes);
            let Event::CreatureAttack {
                hull_damage,
                component_damage,
                ..
            } = outcomes[0]
            else {
                panic!("expected attack");
            };
            assert!(hull_damage <= 30.0);
            assert!((hull_damage - hull_damage.floor()).abs() < 1e-9);
            assert!(component_damage <= 20.0);
            let Event::Gallery { images, title } = &outcomes[1] else {
                panic!("expected footage");
            };
            assert_eq!(images[0], content.constants.fallback_image);
            assert!(title.starts_with("Footage from the creature attack"));
        }
    }

    #[test]
    fn illness_skips_an_empty_ship() {
        let content = base_content();
        let mut state = base_state(&content);
        for role in Role::ALL {
            state.crew.seat_mut(role).occupant = None;
        }
        let mut outcomes = Vec::new();
        assert!(illness(&mut state, &content, &mut make_rng(), &mut outcomes).is_none());
        assert!(outcomes.is_empty());
    }

    #[test]
    fn illness_damage_bounded() {
        let content = base_content();
        let mut rng = make_rng();
        for _ in 0..100 {
            let mut state = base_state(&content);
            let mut outcomes = Vec::new();
            let role = illness(&mut state, &content, &mut rng, &mut outcomes).unwrap();
            assert!(state.crew.seat(role).health >= 20.0 - 1e-9);
        }
    }

    #[test]
    fn certain_incidents_all_fire_with_logs() {
        let mut content = base_content();
        let t = &mut content.constants.frequency_ticks;
        t.biweekly = 1;
        t.weekly = 1;
        t.monthly = 1;
        let mut state = base_state(&content);
        let catalog = MemoryCatalog::new();
        let mut outcomes = Vec::new();
        roll(&mut state, &catalog, &mut FailingNarrator, &content, &mut make_rng(), &mut outcomes);
        assert!(outcomes.iter().any(|e| matches!(e, Event::Malfunction { .. })));
        assert!(outcomes.iter().any(|e| matches!(e, Event::Storm { .. })));
        assert!(outcomes.iter().any(|e| matches!(e, Event::CreatureAttack { .. })));
        assert!(outcomes.iter().any(|e| matches!(e, Event::Illness { .. })));
        let logs: Vec<_> = outcomes
            .iter()
            .filter_map(|e| match e {
                Event::LogEntry { body, .. } => Some(body),
                _ => None,
            })
            .collect();
        assert_eq!(logs.len(), 4);
        assert!(logs.iter().all(|body| body.contains("SHIP'S STATUS")));
    }
}
