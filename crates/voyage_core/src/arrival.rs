//! Arrival at the tracked destination.
//!
//! Reaching a boldly-going waypoint just clears the track. Reaching a
//! contact or a known POI runs the full visit: survey, photographs, an
//! optional away mission, trade, and the catalog update.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::Catalog;
use crate::economy;
use crate::engine::Services;
use crate::narrative::{self, Finding};
use crate::status::{self, track_target};
use crate::worldgen::{self, cell_stream, moment_stream};
use crate::{
    Cargo, Component, Depth, Event, GameContent, GridPos, NewPoi, PoiKind, PoiProfile, Resource,
    Role, ShipState, Track,
};

/// Away-team picking order: juniors go first, the captain last.
const AWAY_PRIORITY: [Role; 5] = [
    Role::JuniorScientist,
    Role::JuniorEngineer,
    Role::ChiefScienceOfficer,
    Role::ChiefEngineer,
    Role::CommandingOfficer,
];

/// Resolves arrival if the ship sits in its destination cell.
pub(crate) fn check(
    state: &mut ShipState,
    services: &mut Services<'_>,
    content: &GameContent,
    outcomes: &mut Vec<Event>,
) {
    let Some(target) = track_target(&state.track, &*services.catalog) else {
        return;
    };
    if GridPos::containing(state.position) != target {
        return;
    }
    match state.track.clone() {
        Track::None => {}
        Track::BoldlyGoing { waypoint } => {
            state.track = Track::None;
            outcomes.push(Event::WaypointReached { waypoint });
        }
        Track::Contact { .. } | Track::Poi { .. } => at_poi(state, services, content, outcomes),
    }
}

/// What the ship found when it arrived, before any catalog writes.
struct Site {
    cell: GridPos,
    depth: Depth,
    name: String,
    profile: PoiProfile,
    description: String,
    known: Option<(crate::PoiId, Vec<String>)>,
}

fn survey(state: &ShipState, services: &mut Services<'_>, content: &GameContent, size: u32) -> Option<Site> {
    match &state.track {
        Track::Contact { id } => {
            let contact = services.catalog.contact(id)?.clone();
            let profile = worldgen::profile_poi(state.meta.seed, contact.pos, contact.depth, content);
            let name = narrative::poi_name(services.narrator, profile.kind);
            let description = narrative::describe_poi(services.narrator, &name, &profile, size);
            services.catalog.delete_contact(id);
            Some(Site {
                cell: contact.pos,
                depth: contact.depth,
                name,
                profile,
                description,
                known: None,
            })
        }
        Track::Poi { id } => {
            let poi = services.catalog.poi(id)?.clone();
            Some(Site {
                cell: poi.pos,
                depth: poi.depth,
                name: poi.name,
                profile: poi.profile,
                description: poi.description,
                known: Some((poi.id, poi.images)),
            })
        }
        Track::None | Track::BoldlyGoing { .. } => None,
    }
}

pub(crate) fn at_poi(
    state: &mut ShipState,
    services: &mut Services<'_>,
    content: &GameContent,
    outcomes: &mut Vec<Event>,
) {
    let constants = &content.constants;
    state.speed = 0.0;
    let cell = GridPos::containing(state.position);
    let mut anchor = cell_stream(state.meta.seed, cell, "anchor");
    let size = if constants.site_size_max > constants.site_size_min {
        anchor.gen_range(constants.site_size_min..constants.site_size_max)
    } else {
        constants.site_size_min
    };

    let Some(site) = survey(state, services, content, size) else {
        state.track = Track::None;
        return;
    };
    state.track = Track::None;

    let kind = site.profile.kind;
    let mut images = Vec::new();
    if kind.is_photogenic() {
        let tag = narrative::image_tag(state, site.cell.x, site.cell.y, &site.name, "");
        images.push(narrative::photograph(services.narrator, &site.description, &tag, constants));
        away_mission(state, services, content, &site, &mut images, outcomes);
    }

    match kind {
        PoiKind::Deposit => {
            let fuel = constants.deposit_fuel_per_size * f64::from(size);
            let amount = economy::add_cargo(state, Cargo::Fuel, fuel);
            outcomes.push(Event::ResourcesGathered {
                cargo: Cargo::Fuel,
                amount,
            });
        }
        PoiKind::OffshorePlatform | PoiKind::Ship => trade(state, services, content, &site, outcomes),
        _ => {}
    }

    match site.known {
        None => {
            let poi_id = services.catalog.insert_poi(NewPoi {
                pos: site.cell,
                depth: site.depth,
                name: site.name.clone(),
                profile: site.profile,
                description: site.description,
                images: images.clone(),
            });
            outcomes.push(Event::PoiDiscovered {
                poi_id,
                name: site.name.clone(),
                kind,
            });
        }
        Some((poi_id, mut known_images)) => {
            if !images.is_empty() {
                known_images.extend(images.iter().cloned());
                services.catalog.update_poi_images(&poi_id, known_images);
            }
            outcomes.push(Event::PoiRevisited {
                poi_id,
                name: site.name.clone(),
            });
        }
    }

    if !images.is_empty() {
        outcomes.push(Event::Gallery {
            title: format!("Photographs from {}", site.name),
            images,
        });
    }
}

/// Platforms hire, repair, and sell; ships only sell. The captain logs it.
fn trade(
    state: &mut ShipState,
    services: &mut Services<'_>,
    content: &GameContent,
    site: &Site,
    outcomes: &mut Vec<Event>,
) {
    let constants = &content.constants;
    if site.profile.kind == PoiKind::OffshorePlatform {
        economy::hire_crew(state, services.narrator, constants, outcomes);
        economy::shipyard_repairs(state, constants, outcomes);
    }
    economy::buy_supplies(state, constants, outcomes);
    let footer = status::summarize(state, &*services.catalog, content).footer();
    let occasion = format!("visiting and trading with {}", site.name);
    outcomes.extend(narrative::crew_log(
        state,
        services.narrator,
        Role::CommandingOfficer,
        Some(&occasion),
        &footer,
    ));
}

fn pick_team(state: &ShipState, content: &GameContent) -> Vec<Role> {
    AWAY_PRIORITY
        .into_iter()
        .filter(|role| state.crew.seat(*role).fit_for(content.constants.away_team_min_health))
        .take(content.constants.away_team_size)
        .collect()
}

fn percent(rng: &mut impl Rng, odds: u32) -> bool {
    rng.gen_range(0..100) < odds
}

fn damage_roll(rng: &mut impl Rng, content: &GameContent) -> f64 {
    let (min, max) = (content.constants.away_damage_min, content.constants.away_damage_max);
    f64::from(if max > min { rng.gen_range(min..max) } else { min })
}

/// Sends a small team ashore (or below) in the matching craft.
fn away_mission(
    state: &mut ShipState,
    services: &mut Services<'_>,
    content: &GameContent,
    site: &Site,
    images: &mut Vec<String>,
    outcomes: &mut Vec<Event>,
) {
    let constants = &content.constants;
    let craft = match site.depth {
        Depth::Surface => Component::Dinghy,
        Depth::Submerged => Component::Sub,
    };
    let members = pick_team(state, content);
    if members.is_empty() || state.health.get(craft) <= 0.0 {
        return;
    }
    outcomes.push(Event::AwayTeamDeployed {
        site: site.name.clone(),
        members: members.clone(),
        craft,
    });

    let mut rng = moment_stream(state.meta.seed, site.cell, "away", &state.clock);
    if percent(&mut rng, constants.away_mishap_percent) {
        let damage = damage_roll(&mut rng, content);
        let destroyed = state.health.damage(craft, damage) <= 0.0;
        outcomes.push(Event::CraftDamaged {
            craft,
            damage,
            destroyed,
        });
        if destroyed {
            for role in &members {
                let damage = state.crew.seat(*role).health;
                state.crew.adjust_health(*role, -damage);
                outcomes.push(Event::CrewInjured { role: *role, damage });
            }
            return;
        }
    }
    if percent(&mut rng, constants.away_mishap_percent) {
        if let Some(role) = members.choose(&mut rng).copied() {
            let damage = damage_roll(&mut rng, content);
            state.crew.adjust_health(role, -damage);
            outcomes.push(Event::CrewInjured { role, damage });
        }
    }

    let reports = gather(state, services, content, site, &mut rng, images, outcomes);
    if reports.is_empty() {
        return;
    }
    let leader = state.crew.seat(members[0]).full_name();
    outcomes.push(Event::LogEntry {
        author: leader,
        title: format!("Away Team Report: {}", site.name),
        body: reports.join("\n\n"),
    });
}

/// Findings and resources the team brings back. Returns report paragraphs.
fn gather(
    state: &mut ShipState,
    services: &mut Services<'_>,
    content: &GameContent,
    site: &Site,
    rng: &mut impl Rng,
    images: &mut Vec<String>,
    outcomes: &mut Vec<Event>,
) -> Vec<String> {
    let constants = &content.constants;
    let profile = &site.profile;
    let mut reports = Vec::new();
    let mut findings = Vec::new();
    if profile.kind.bears_life() {
        findings.extend([Finding::Flora, Finding::Fauna]);
    }
    for resource in &profile.resources {
        match resource {
            Resource::Tech => {
                state.research.pending_tech += 1;
                findings.push(Finding::Tech);
            }
            Resource::Artifact => {
                state.research.pending_artifact += 1;
                findings.push(Finding::Artifact);
            }
            _ => {}
        }
    }
    for finding in findings {
        let report =
            narrative::describe_finding(services.narrator, finding, &site.name, profile.weirdness);
        let tag = narrative::image_tag(state, site.cell.x, site.cell.y, &site.name, finding.label());
        images.push(narrative::photograph(services.narrator, &report, &tag, constants));
        reports.push(report);
    }

    for cargo in profile.resources.iter().filter_map(|r| r.cargo()) {
        let mut amount = if constants.harvest_max > constants.harvest_min {
            rng.gen_range(constants.harvest_min..constants.harvest_max)
        } else {
            constants.harvest_min
        };
        if matches!(cargo, Cargo::Water | Cargo::Fuel) {
            amount *= constants.bulk_harvest_multiplier;
        }
        let amount = economy::add_cargo(state, cargo, amount.round());
        outcomes.push(Event::ResourcesGathered { cargo, amount });
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MemoryCatalog, Table};
    use crate::test_fixtures::{base_content, base_state, insert_site, FailingNarrator};
    use crate::Position;

    fn services<'a>(
        catalog: &'a mut MemoryCatalog,
        narrator: &'a mut FailingNarrator,
    ) -> Services<'a> {
        Services { catalog, narrator }
    }

    #[test]
    fn waypoint_arrival_clears_track() {
        let content = base_content();
        let mut state = base_state(&content);
        state.position = Position::new(12.2, -3.4);
        state.track = Track::BoldlyGoing {
            waypoint: GridPos::new(12, -3),
        };
        let mut catalog = MemoryCatalog::new();
        let mut narrator = FailingNarrator;
        let mut outcomes = Vec::new();
        check(&mut state, &mut services(&mut catalog, &mut narrator), &content, &mut outcomes);
        assert!(state.track.is_none());
        assert!(matches!(outcomes[0], Event::WaypointReached { .. }));
    }

    #[test]
    fn not_yet_arrived_does_nothing() {
        let content = base_content();
        let mut state = base_state(&content);
        state.speed = 5.0;
        state.track = Track::BoldlyGoing {
            waypoint: GridPos::new(100, 0),
        };
        let mut catalog = MemoryCatalog::new();
        let mut narrator = FailingNarrator;
        let mut outcomes = Vec::new();
        check(&mut state, &mut services(&mut catalog, &mut narrator), &content, &mut outcomes);
        assert!(outcomes.is_empty());
        assert!((state.speed - 5.0).abs() < 1e-9);
    }

    #[test]
    fn contact_becomes_poi_on_arrival() {
        let content = base_content();
        let mut state = base_state(&content);
        let cell = GridPos::new(40, 60);
        state.position = cell.center();
        state.speed = 10.0;
        let mut catalog = MemoryCatalog::new();
        let ids = catalog.insert_contacts(&[(cell, Depth::Surface)]);
        state.track = Track::Contact { id: ids[0].clone() };
        let mut narrator = FailingNarrator;
        let mut outcomes = Vec::new();

        check(&mut state, &mut services(&mut catalog, &mut narrator), &content, &mut outcomes);

        assert!(state.speed.abs() < 1e-9);
        assert!(state.track.is_none());
        assert_eq!(catalog.count(Table::Contacts), 0);
        let poi_id = catalog.find_poi_id(cell).expect("poi created");
        let poi = catalog.poi(&poi_id).unwrap();
        let expected = worldgen::profile_poi(state.meta.seed, cell, Depth::Surface, &content);
        assert_eq!(poi.profile, expected);
        assert!(poi.name.starts_with("Unknown"));
        assert!(outcomes
            .iter()
            .any(|e| matches!(e, Event::PoiDiscovered { poi_id: id, .. } if *id == poi_id)));
    }

    #[test]
    fn revisit_appends_images_and_keeps_single_record() {
        let content = base_content();
        let mut state = base_state(&content);
        let mut catalog = MemoryCatalog::new();
        let cell = GridPos::new(-8, 3);
        let poi_id = insert_site(&mut catalog, cell, PoiKind::Island);
        catalog.update_poi_images(&poi_id, vec!["old.png".to_string()]);
        state.position = cell.center();
        state.track = Track::Poi { id: poi_id.clone() };
        let mut narrator = FailingNarrator;
        let mut outcomes = Vec::new();

        check(&mut state, &mut services(&mut catalog, &mut narrator), &content, &mut outcomes);

        assert_eq!(catalog.count(Table::Pois), 1);
        let poi = catalog.poi(&poi_id).unwrap();
        assert!(poi.images.len() > 1);
        assert_eq!(poi.images[0], "old.png");
        assert!(outcomes.iter().any(|e| matches!(e, Event::PoiRevisited { .. })));
        assert!(outcomes.iter().any(|e| matches!(e, Event::Gallery { .. })));
    }

    #[test]
    fn deposit_refuels_by_site_size() {
        let content = base_content();
        let mut state = base_state(&content);
        let mut catalog = MemoryCatalog::new();
        let cell = GridPos::new(3, 3);
        let poi_id = insert_site(&mut catalog, cell, PoiKind::Deposit);
        state.position = cell.center();
        state.cargo.fuel = 0.0;
        state.track = Track::Poi { id: poi_id };
        let mut narrator = FailingNarrator;
        let mut outcomes = Vec::new();

        check(&mut state, &mut services(&mut catalog, &mut narrator), &content, &mut outcomes);

        let c = &content.constants;
        assert!(state.cargo.fuel >= c.deposit_fuel_per_size * f64::from(c.site_size_min));
        assert!(state.cargo.fuel <= state.capacity.fuel);
        assert!(!outcomes.iter().any(|e| matches!(e, Event::Gallery { .. })));
    }

    #[test]
    fn platform_trades_and_logs() {
        let content = base_content();
        let mut state = base_state(&content);
        let mut catalog = MemoryCatalog::new();
        let cell = GridPos::new(0, 10);
        let poi_id = insert_site(&mut catalog, cell, PoiKind::OffshorePlatform);
        state.position = cell.center();
        state.track = Track::Poi { id: poi_id };
        state.crew.junior_engineer.occupant = None;
        state.health.bridge = 60.0;
        state.cargo.fuel = 10.0;
        let mut narrator = FailingNarrator;
        let mut outcomes = Vec::new();

        check(&mut state, &mut services(&mut catalog, &mut narrator), &content, &mut outcomes);

        assert!(!state.crew.junior_engineer.is_vacant());
        assert!((state.health.bridge - 100.0).abs() < 1e-9);
        assert!((state.cargo.fuel - state.capacity.fuel).abs() < 1e-9);
        assert!(outcomes.iter().any(|e| matches!(
            e,
            Event::LogEntry { title, .. } if title.starts_with("Captain's Log: Visiting And Trading")
        )));
    }

    #[test]
    fn team_needs_healthy_crew() {
        let content = base_content();
        let mut state = base_state(&content);
        assert_eq!(
            pick_team(&state, &content),
            vec![Role::JuniorScientist, Role::JuniorEngineer]
        );
        state.crew.junior_scientist.health = 50.0;
        assert_eq!(
            pick_team(&state, &content),
            vec![Role::JuniorEngineer, Role::ChiefScienceOfficer]
        );
        for role in Role::ALL {
            state.crew.seat_mut(role).health = 10.0;
        }
        assert!(pick_team(&state, &content).is_empty());
    }

    #[test]
    fn destroyed_craft_grounds_the_mission() {
        let content = base_content();
        let mut state = base_state(&content);
        state.health.dinghy = 0.0;
        let mut catalog = MemoryCatalog::new();
        let cell = GridPos::new(7, 7);
        let poi_id = insert_site(&mut catalog, cell, PoiKind::Island);
        state.position = cell.center();
        state.track = Track::Poi { id: poi_id };
        let mut narrator = FailingNarrator;
        let mut outcomes = Vec::new();
        check(&mut state, &mut services(&mut catalog, &mut narrator), &content, &mut outcomes);
        assert!(!outcomes.iter().any(|e| matches!(e, Event::AwayTeamDeployed { .. })));
    }
}
