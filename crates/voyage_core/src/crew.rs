//! Crew lifecycle: health drift, death, and chain-of-command succession.

use crate::{Crew, Event, Role, Seat};

impl Seat {
    pub fn vacant(title: &str) -> Self {
        Self {
            occupant: None,
            health: 0.0,
            title: title.to_string(),
        }
    }

    pub fn is_vacant(&self) -> bool {
        self.occupant.is_none()
    }

    /// Occupied and above `threshold` health.
    pub fn fit_for(&self, threshold: f64) -> bool {
        !self.is_vacant() && self.health > threshold
    }

    /// "Chief Engineer Ada Park", or just the title when vacant.
    pub fn full_name(&self) -> String {
        match &self.occupant {
            Some(name) => format!("{} {name}", self.title),
            None => self.title.clone(),
        }
    }

    fn set_health(&mut self, value: f64) {
        self.health = value.clamp(0.0, 100.0);
    }
}

impl Crew {
    pub fn seat(&self, role: Role) -> &Seat {
        match role {
            Role::CommandingOfficer => &self.commanding_officer,
            Role::ChiefEngineer => &self.chief_engineer,
            Role::ChiefScienceOfficer => &self.chief_science_officer,
            Role::JuniorEngineer => &self.junior_engineer,
            Role::JuniorScientist => &self.junior_scientist,
        }
    }

    pub fn seat_mut(&mut self, role: Role) -> &mut Seat {
        match role {
            Role::CommandingOfficer => &mut self.commanding_officer,
            Role::ChiefEngineer => &mut self.chief_engineer,
            Role::ChiefScienceOfficer => &mut self.chief_science_officer,
            Role::JuniorEngineer => &mut self.junior_engineer,
            Role::JuniorScientist => &mut self.junior_scientist,
        }
    }

    pub fn count_aboard(&self) -> usize {
        Role::ALL
            .iter()
            .filter(|role| !self.seat(**role).is_vacant())
            .count()
    }

    /// Applies `delta` to one seat's health, clamped to `[0, 100]`.
    /// Vacant seats are unaffected.
    pub fn adjust_health(&mut self, role: Role, delta: f64) {
        let seat = self.seat_mut(role);
        if !seat.is_vacant() {
            let next = seat.health + delta;
            seat.set_health(next);
        }
    }
}

/// Continuous health trend over `secs` seconds.
///
/// Fed and watered crew heal at `rate`. Without food they lose `rate`;
/// without water they lose twice that, on top.
pub(crate) fn drift_health(crew: &mut Crew, food: f64, water: f64, rate: f64, secs: f64) {
    let delta = if food > 0.0 && water > 0.0 {
        rate * secs
    } else {
        let mut loss = 0.0;
        if food <= 0.0 {
            loss += rate * secs;
        }
        if water <= 0.0 {
            loss += 2.0 * rate * secs;
        }
        -loss
    };
    for role in Role::ALL {
        crew.adjust_health(role, delta);
    }
}

/// Succession pairs, resolved in order so a promotion can cascade.
const SUCCESSION: [(Role, Role); 3] = [
    (Role::CommandingOfficer, Role::ChiefEngineer),
    (Role::ChiefEngineer, Role::JuniorEngineer),
    (Role::ChiefScienceOfficer, Role::JuniorScientist),
];

/// Clears every occupied seat at zero health, then restores the chain of
/// command. Returns the deaths and promotions that happened.
pub fn resolve_casualties(crew: &mut Crew) -> Vec<Event> {
    let mut outcomes = Vec::new();
    for role in Role::ALL {
        let seat = crew.seat_mut(role);
        if seat.health <= 0.0 {
            if let Some(name) = seat.occupant.take() {
                seat.health = 0.0;
                outcomes.push(Event::CrewDied { role, name });
            }
        }
    }
    promote(crew, &mut outcomes);
    outcomes
}

fn promote(crew: &mut Crew, outcomes: &mut Vec<Event>) {
    for (senior, junior) in SUCCESSION {
        if !crew.seat(senior).is_vacant() {
            continue;
        }
        let successor = crew.seat_mut(junior);
        let Some(name) = successor.occupant.take() else {
            continue;
        };
        let health = successor.health;
        successor.health = 0.0;
        let seat = crew.seat_mut(senior);
        seat.occupant = Some(name.clone());
        seat.health = health;
        outcomes.push(Event::CrewPromoted {
            from: junior,
            to: senior,
            name,
        });
    }
}
