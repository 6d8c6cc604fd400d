use super::*;

#[test]
fn destroyed_hull_abandons_ship() {
    let content = calm_content();
    let mut state = base_state(&content);
    let mut catalog = MemoryCatalog::new();
    state.health.hull = 0.0;
    state.speed = 8.0;
    state.heading = 45.0;
    state.track = Track::BoldlyGoing {
        waypoint: GridPos::new(500, 500),
    };

    let report = step(&mut state, &mut catalog, &content);

    assert_eq!(
        report.status,
        TickStatus::Terminated(TerminationReason::ShipLost)
    );
    assert_eq!(state.status, ShipStatus::Lost);
    assert!(state.speed.abs() < 1e-9);
    assert!(state.heading.abs() < 1e-9);
    assert!(state.track.is_none());
    assert!(has_event(&report.events, |e| matches!(
        e,
        Event::LogEntry { author, title, .. }
            if author == "SHIPCOM" && title == "EMERGENCY AUTOMATED MESSAGE MERIDIAN: ABANDONED SHIP"
    )));
    assert!(has_event(&report.events, |e| matches!(
        e,
        Event::ShipLost { survivors: 5, .. }
    )));
}

#[test]
fn lost_ship_is_never_mutated_again() {
    let content = base_content();
    let mut state = base_state(&content);
    let mut catalog = MemoryCatalog::new();
    state.health.hull = 0.0;
    step(&mut state, &mut catalog, &content);

    let frozen = state.clone();
    let catalog_before = catalog.clone();
    for _ in 0..50 {
        let report = step(&mut state, &mut catalog, &content);
        assert!(report.events.is_empty());
        assert_eq!(
            report.status,
            TickStatus::Terminated(TerminationReason::ShipLost)
        );
    }
    assert_eq!(state, frozen);
    assert_eq!(catalog, catalog_before);
}

#[test]
fn survivors_exclude_the_dead_and_vacant() {
    let content = calm_content();
    let mut state = base_state(&content);
    let mut catalog = MemoryCatalog::new();
    state.health.hull = 0.0;
    // Without food or water nobody heals before the count.
    state.cargo.food = 0.0;
    state.cargo.water = 0.0;
    state.crew.junior_scientist.occupant = None;
    state.crew.junior_engineer.health = 0.0;
    let report = step(&mut state, &mut catalog, &content);
    assert!(has_event(&report.events, |e| matches!(
        e,
        Event::ShipLost { survivors: 3, .. }
    )));
    assert!(has_event(&report.events, |e| matches!(
        e,
        Event::CrewDied { role: Role::JuniorEngineer, .. }
    )));
    assert!(state.crew.junior_engineer.occupant.is_none());
}
