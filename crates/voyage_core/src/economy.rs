//! Resource ledger: crew repairs, lab effort, research payouts, and trade.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::narrative::{self, ContentGenerator};
use crate::{
    Cargo, Component, Constants, Event, Role, SensorKind, ShipState, Subject, Upgrade,
};

/// Crew repair order. The hull is left to shipyards.
pub const REPAIR_PRIORITY: [Component; 5] = [
    Component::Engine,
    Component::Bridge,
    Component::Lab,
    Component::Dinghy,
    Component::Sub,
];

/// Adds to a cargo hold, clamped to `[0, capacity]`. Returns the amount
/// that actually changed hands.
pub fn add_cargo(state: &mut ShipState, cargo: Cargo, amount: f64) -> f64 {
    let capacity = state.capacity.get(cargo);
    let slot = state.cargo.get_mut(cargo);
    let before = *slot;
    *slot = (before + amount).clamp(0.0, capacity);
    *slot - before
}

/// One point of repair on the first damaged component at or below
/// `ceiling` whose material is in stock. Destroyed components are beyond
/// crew repair.
pub(crate) fn repair_step(state: &mut ShipState, ceiling: f64) -> Option<(Component, f64)> {
    for component in REPAIR_PRIORITY {
        let health = state.health.get(component);
        if health <= 0.0 || health > ceiling {
            continue;
        }
        let material = component.repair_material();
        if state.cargo.get(material) < 1.0 {
            continue;
        }
        *state.cargo.get_mut(material) -= 1.0;
        state.health.set(component, health + 1.0);
        return Some((component, state.health.get(component)));
    }
    None
}

fn pending(state: &ShipState, subject: Subject) -> u32 {
    match subject {
        Subject::Tech => state.research.pending_tech,
        Subject::Artifact => state.research.pending_artifact,
    }
}

fn effort_mut(state: &mut ShipState, subject: Subject) -> &mut f64 {
    match subject {
        Subject::Tech => &mut state.research.effort_tech,
        Subject::Artifact => &mut state.research.effort_artifact,
    }
}

/// One tick of lab work by `role`. Only the chief science officer can
/// close out an analysis and claim its reward.
pub(crate) fn lab_work(
    state: &mut ShipState,
    role: Role,
    constants: &Constants,
    rng: &mut impl Rng,
    level: crate::EventLevel,
    outcomes: &mut Vec<Event>,
) {
    if !state.crew.seat(role).fit_for(constants.min_working_health)
        || state.health.lab <= constants.min_working_health
    {
        return;
    }
    let open: Vec<Subject> = [Subject::Tech, Subject::Artifact]
        .into_iter()
        .filter(|subject| pending(state, *subject) > 0)
        .collect();
    let Some(subject) = open.choose(rng).copied() else {
        return;
    };
    let effort = if state.health.lab > constants.lab_fast_threshold {
        constants.lab_fast_effort
    } else {
        constants.lab_slow_effort
    };
    let remaining = {
        let counter = effort_mut(state, subject);
        *counter -= effort;
        *counter
    };
    if level == crate::EventLevel::Debug {
        outcomes.push(Event::LabWork {
            role,
            subject,
            remaining,
        });
    }
    if role == Role::ChiefScienceOfficer && remaining <= 0.0 {
        outcomes.push(reward_research(state, subject, constants, rng));
    }
}

/// Pays out a finished analysis and resets its effort counter.
pub(crate) fn reward_research(
    state: &mut ShipState,
    subject: Subject,
    constants: &Constants,
    rng: &mut impl Rng,
) -> Event {
    let (min, max) = match subject {
        Subject::Artifact => (constants.artifact_reward_min, constants.artifact_reward_max),
        Subject::Tech => (constants.tech_reward_min, constants.tech_reward_max),
    };
    let reward = f64::from(if max > min { rng.gen_range(min..max) } else { min });
    state.money += reward;
    let upgrade = match subject {
        Subject::Artifact => {
            state.research.pending_artifact = state.research.pending_artifact.saturating_sub(1);
            None
        }
        Subject::Tech => {
            state.research.pending_tech = state.research.pending_tech.saturating_sub(1);
            Some(apply_upgrade(state, constants, rng))
        }
    };
    *effort_mut(state, subject) = state.research.lab_base;
    Event::ResearchCompleted {
        subject,
        reward,
        upgrade,
    }
}

#[derive(Debug, Clone, Copy)]
enum UpgradeTarget {
    MaxSpeed,
    FuelEfficiency,
    LabBase,
    Sensor(SensorKind),
}

fn consume(state: &mut ShipState, cargo: Cargo, amount: f64) {
    let slot = state.cargo.get_mut(cargo);
    *slot = (*slot - amount).max(0.0);
}

fn apply_upgrade(state: &mut ShipState, constants: &Constants, rng: &mut impl Rng) -> Upgrade {
    let mut targets = vec![
        UpgradeTarget::MaxSpeed,
        UpgradeTarget::FuelEfficiency,
        UpgradeTarget::LabBase,
    ];
    targets.extend(state.sensors.iter().map(|s| UpgradeTarget::Sensor(s.kind)));
    let target = targets
        .choose(rng)
        .copied()
        .unwrap_or(UpgradeTarget::MaxSpeed);
    let cost = constants.upgrade_material_cost;
    match target {
        UpgradeTarget::MaxSpeed => {
            state.max_speed += 1.0;
            consume(state, Cargo::Iron, cost);
            Upgrade::MaxSpeed {
                knots: state.max_speed,
            }
        }
        UpgradeTarget::Sensor(kind) => {
            let boost = f64::from(rng.gen_range(2_u32..10));
            let mut modifier_pct = 0.0;
            if let Some(sensor) = state.sensors.iter_mut().find(|s| s.kind == kind) {
                sensor.modifier_pct += boost;
                modifier_pct = sensor.modifier_pct;
            }
            consume(state, Cargo::Silicon, cost);
            Upgrade::SensorRange {
                sensor: kind,
                modifier_pct,
            }
        }
        UpgradeTarget::FuelEfficiency => {
            state.fuel_efficiency -= rng.gen::<f64>();
            let at_floor = state.fuel_efficiency < 1.0;
            if at_floor {
                state.fuel_efficiency = 1.0;
            }
            consume(state, Cargo::Iron, cost);
            Upgrade::FuelEfficiency {
                per_mile: state.fuel_efficiency,
                at_floor,
            }
        }
        UpgradeTarget::LabBase => {
            let reduced_by = (state.research.lab_base * rng.gen_range(0.01..0.05)).round();
            state.research.lab_base -= reduced_by;
            consume(state, Cargo::Silicon, cost);
            Upgrade::LabBase { reduced_by }
        }
    }
}

/// Fills vacant seats at the hiring price while money lasts.
pub(crate) fn hire_crew(
    state: &mut ShipState,
    narrator: &mut dyn ContentGenerator,
    constants: &Constants,
    outcomes: &mut Vec<Event>,
) {
    for role in Role::ALL {
        if !state.crew.seat(role).is_vacant() || state.money < constants.hire_price {
            continue;
        }
        let name = narrative::crew_name(narrator, &state.crew.seat(role).title);
        let seat = state.crew.seat_mut(role);
        seat.occupant = Some(name.clone());
        seat.health = 100.0;
        state.money -= constants.hire_price;
        outcomes.push(Event::CrewHired {
            role,
            name,
            price: constants.hire_price,
        });
    }
}

/// Restores every affordable component to full health at the shipyard
/// rate. Hull work is billed at double.
pub(crate) fn shipyard_repairs(
    state: &mut ShipState,
    constants: &Constants,
    outcomes: &mut Vec<Event>,
) {
    for component in Component::ALL {
        let needed = 100.0 - state.health.get(component);
        if needed <= 0.0 {
            continue;
        }
        let billed = if component == Component::Hull {
            needed * 2.0
        } else {
            needed
        };
        let cost = ((billed * constants.repair_price_per_point) * 100.0).round() / 100.0;
        if state.money < cost {
            continue;
        }
        state.health.set(component, 100.0);
        state.money -= cost;
        outcomes.push(Event::ShipyardRepair { component, cost });
    }
}

/// Tops up fuel, water, and food to capacity when the whole top-up is
/// affordable.
pub(crate) fn buy_supplies(state: &mut ShipState, constants: &Constants, outcomes: &mut Vec<Event>) {
    let price_list = [
        (Cargo::Fuel, constants.fuel_price),
        (Cargo::Water, constants.water_price),
        (Cargo::Food, constants.food_price),
    ];
    for (cargo, price) in price_list {
        let needed = state.capacity.get(cargo) - state.cargo.get(cargo);
        if needed <= 0.0 {
            continue;
        }
        let cost = ((needed * price) * 100.0).round() / 100.0;
        if cost > state.money {
            continue;
        }
        state.money -= cost;
        let amount = add_cargo(state, cargo, needed);
        outcomes.push(Event::SuppliesPurchased {
            cargo,
            amount,
            cost,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_content, base_state, make_rng, FailingNarrator};
    use crate::EventLevel;
    use rand::SeedableRng;

    #[test]
    fn add_cargo_clamps_both_ways() {
        let content = base_content();
        let mut state = base_state(&content);
        state.cargo.iron = 495.0;
        let added = add_cargo(&mut state, Cargo::Iron, 20.0);
        assert!((added - 5.0).abs() < 1e-9);
        assert!((state.cargo.iron - state.capacity.iron).abs() < 1e-9);
        add_cargo(&mut state, Cargo::Iron, -10_000.0);
        assert!(state.cargo.iron.abs() < 1e-9);
    }

    #[test]
    fn repair_follows_priority_and_ceiling() {
        let content = base_content();
        let mut state = base_state(&content);
        state.health.engine = 80.0;
        state.health.bridge = 50.0;
        state.health.lab = 40.0;
        let iron = state.cargo.iron;
        let silicon = state.cargo.silicon;

        // Engine above the chief's ceiling, so the bridge is next.
        let repaired = repair_step(&mut state, 75.0);
        assert_eq!(repaired.map(|r| r.0), Some(Component::Bridge));
        assert!((state.health.bridge - 51.0).abs() < 1e-9);
        assert!((state.cargo.silicon - (silicon - 1.0)).abs() < 1e-9);

        // The junior's higher ceiling reaches the engine.
        let repaired = repair_step(&mut state, 90.0);
        assert_eq!(repaired.map(|r| r.0), Some(Component::Engine));
        assert!((state.cargo.iron - (iron - 1.0)).abs() < 1e-9);
    }

    #[test]
    fn repair_skips_components_without_material() {
        let content = base_content();
        let mut state = base_state(&content);
        state.health.engine = 20.0;
        state.health.lab = 20.0;
        state.cargo.iron = 0.5;
        let repaired = repair_step(&mut state, 75.0);
        assert_eq!(repaired.map(|r| r.0), Some(Component::Lab));
        assert!((state.health.engine - 20.0).abs() < 1e-9);
    }

    #[test]
    fn destroyed_components_are_not_crew_repairable() {
        let content = base_content();
        let mut state = base_state(&content);
        state.health.dinghy = 0.0;
        assert!(repair_step(&mut state, 90.0).is_none());
    }

    #[test]
    fn repair_never_exceeds_full_health() {
        let content = base_content();
        let mut state = base_state(&content);
        for component in REPAIR_PRIORITY {
            state.health.set(component, 99.5);
        }
        for _ in 0..10 {
            repair_step(&mut state, 100.0);
        }
        for component in Component::ALL {
            assert!(state.health.get(component) <= 100.0);
        }
    }

    #[test]
    fn lab_effort_depends_on_lab_health() {
        let content = base_content();
        let mut state = base_state(&content);
        let mut rng = make_rng();
        let mut outcomes = Vec::new();
        state.research.pending_artifact = 1;
        state.research.effort_artifact = 10.0;

        lab_work(&mut state, Role::JuniorScientist, &content.constants, &mut rng, EventLevel::Debug, &mut outcomes);
        assert!((state.research.effort_artifact - 9.0).abs() < 1e-9);

        state.health.lab = 50.0;
        lab_work(&mut state, Role::JuniorScientist, &content.constants, &mut rng, EventLevel::Debug, &mut outcomes);
        assert!((state.research.effort_artifact - 8.5).abs() < 1e-9);
        assert_eq!(outcomes.len(), 2);

        state.health.lab = 20.0;
        lab_work(&mut state, Role::JuniorScientist, &content.constants, &mut rng, EventLevel::Debug, &mut outcomes);
        assert!((state.research.effort_artifact - 8.5).abs() < 1e-9);
    }

    #[test]
    fn only_science_officer_completes_research() {
        let content = base_content();
        let mut state = base_state(&content);
        let mut rng = make_rng();
        let mut outcomes = Vec::new();
        state.research.pending_artifact = 1;
        state.research.effort_artifact = 1.0;

        lab_work(&mut state, Role::JuniorScientist, &content.constants, &mut rng, EventLevel::Normal, &mut outcomes);
        assert!(outcomes.is_empty());
        assert_eq!(state.research.pending_artifact, 1);

        let money = state.money;
        lab_work(&mut state, Role::ChiefScienceOfficer, &content.constants, &mut rng, EventLevel::Normal, &mut outcomes);
        assert_eq!(state.research.pending_artifact, 0);
        assert!((state.research.effort_artifact - state.research.lab_base).abs() < 1e-9);
        let Event::ResearchCompleted { reward, upgrade, .. } = &outcomes[0] else {
            panic!("expected research completion");
        };
        assert!((30_000.0..50_000.0).contains(reward));
        assert!(upgrade.is_none());
        assert!((state.money - money - reward).abs() < 1e-9);
    }

    #[test]
    fn tech_research_grants_one_upgrade() {
        let content = base_content();
        for seed in 0..40 {
            let mut state = base_state(&content);
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
            state.research.pending_tech = 1;
            let before = state.clone();
            let Event::ResearchCompleted { reward, upgrade, .. } =
                reward_research(&mut state, Subject::Tech, &content.constants, &mut rng)
            else {
                panic!("expected research completion");
            };
            assert!((5_000.0..10_000.0).contains(&reward));
            let material_spent = (before.cargo.iron - state.cargo.iron)
                + (before.cargo.silicon - state.cargo.silicon);
            assert!((material_spent - 10.0).abs() < 1e-9);
            match upgrade.expect("tech always upgrades") {
                Upgrade::MaxSpeed { knots } => assert!((knots - before.max_speed - 1.0).abs() < 1e-9),
                Upgrade::SensorRange { modifier_pct, .. } => {
                    assert!((2.0..10.0).contains(&modifier_pct));
                }
                Upgrade::FuelEfficiency { per_mile, .. } => assert!(per_mile >= 1.0),
                Upgrade::LabBase { reduced_by } => {
                    assert!((state.research.lab_base - (before.research.lab_base - reduced_by)).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn fuel_efficiency_never_drops_below_one() {
        let content = base_content();
        let mut state = base_state(&content);
        state.fuel_efficiency = 1.01;
        let mut rng = make_rng();
        for _ in 0..200 {
            apply_upgrade(&mut state, &content.constants, &mut rng);
        }
        assert!(state.fuel_efficiency >= 1.0);
        assert!(state.cargo.iron >= 0.0 && state.cargo.silicon >= 0.0);
    }

    #[test]
    fn hiring_fills_vacancies_while_affordable() {
        let content = base_content();
        let mut state = base_state(&content);
        state.crew.junior_engineer.occupant = None;
        state.crew.junior_engineer.health = 0.0;
        state.crew.junior_scientist.occupant = None;
        state.crew.junior_scientist.health = 0.0;
        state.money = 700.0;
        let mut outcomes = Vec::new();
        hire_crew(&mut state, &mut FailingNarrator, &content.constants, &mut outcomes);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(state.crew.junior_engineer.occupant.as_deref(), Some("Unknown Junior Engineer"));
        assert!((state.crew.junior_engineer.health - 100.0).abs() < 1e-9);
        assert!(state.crew.junior_scientist.is_vacant());
        assert!((state.money - 200.0).abs() < 1e-9);
    }

    #[test]
    fn shipyard_bills_hull_double_and_skips_unaffordable() {
        let content = base_content();
        let mut state = base_state(&content);
        state.health.hull = 90.0;
        state.health.engine = 0.0;
        state.money = 500.0;
        let mut outcomes = Vec::new();
        shipyard_repairs(&mut state, &content.constants, &mut outcomes);
        // Hull: 10 points, doubled, at $10 a point. Engine needs $1000.
        assert!((state.health.hull - 100.0).abs() < 1e-9);
        assert!(state.health.engine.abs() < 1e-9);
        assert!((state.money - 300.0).abs() < 1e-9);
        assert_eq!(outcomes.len(), 1);
    }

    #[test]
    fn supplies_top_up_when_affordable() {
        let content = base_content();
        let mut state = base_state(&content);
        state.cargo.fuel = state.capacity.fuel - 100.0;
        state.cargo.water = state.capacity.water - 1000.0;
        state.cargo.food = state.capacity.food - 10.0;
        state.money = 500.0;
        let mut outcomes = Vec::new();
        buy_supplies(&mut state, &content.constants, &mut outcomes);
        // Fuel $200 bought, water $2000 skipped, food $50 bought.
        assert!((state.cargo.fuel - state.capacity.fuel).abs() < 1e-9);
        assert!((state.cargo.water - (state.capacity.water - 1000.0)).abs() < 1e-9);
        assert!((state.cargo.food - state.capacity.food).abs() < 1e-9);
        assert!((state.money - 250.0).abs() < 1e-9);
        assert!(state.money >= 0.0);
    }
}
