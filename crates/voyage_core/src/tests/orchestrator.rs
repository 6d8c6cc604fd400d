use super::*;

#[test]
fn tick_advances_counter_and_clock() {
    let content = calm_content();
    let mut state = base_state(&content);
    let mut catalog = MemoryCatalog::new();
    step(&mut state, &mut catalog, &content);
    assert_eq!(state.meta.tick, 1);
    assert!((state.clock.seconds - TICK_SECS).abs() < 1e-9);
}

#[test]
fn idle_ship_picks_a_course_and_gets_underway() {
    let content = calm_content();
    let mut state = base_state(&content);
    let mut catalog = MemoryCatalog::new();
    let report = step(&mut state, &mut catalog, &content);
    assert!(matches!(state.track, Track::BoldlyGoing { .. }));
    assert!(has_event(&report.events, |e| matches!(e, Event::CourseSet { .. })));
    // Near full health, so the captain's order stands at about max speed.
    assert!((state.speed - state.max_speed).abs() < 1e-3);
    assert!(report.summary.track.is_some());
}

#[test]
fn event_ids_are_sequential_across_ticks() {
    let content = calm_content();
    let mut state = base_state(&content);
    let mut catalog = MemoryCatalog::new();
    let events = run(&mut state, &mut catalog, &content, 200, TICK_SECS);
    assert!(!events.is_empty());
    for (i, envelope) in events.iter().enumerate() {
        assert_eq!(envelope.id.0, format!("evt_{i:06}"));
    }
    assert!(events.windows(2).all(|w| w[0].tick <= w[1].tick));
}

#[test]
fn damaged_ship_slows_but_keeps_emergency_sail() {
    let content = calm_content();
    let mut state = base_state(&content);
    let mut catalog = MemoryCatalog::new();
    state.health.hull = 30.0;
    state.health.engine = 10.0;
    // The captain would head for a platform; keep one far away.
    insert_site(&mut catalog, GridPos::new(2_000, 0), PoiKind::OffshorePlatform);
    step(&mut state, &mut catalog, &content);
    // 12 knots x 20% = 2.4, held at emergency sail.
    assert!((state.speed - content.constants.emergency_speed).abs() < 1e-9);
    assert!(matches!(state.track, Track::Poi { .. }));
}

#[test]
fn dead_engine_or_empty_tank_stops_the_ship() {
    let content = calm_content();
    let mut catalog = MemoryCatalog::new();

    let mut state = base_state(&content);
    state.health.engine = 0.0;
    step(&mut state, &mut catalog, &content);
    assert!(state.speed.abs() < 1e-9);

    let mut state = base_state(&content);
    state.cargo.fuel = 0.0;
    step(&mut state, &mut catalog, &content);
    assert!(state.speed.abs() < 1e-9);
}

fn detections(report: &TickReport) -> usize {
    report
        .events
        .iter()
        .filter_map(|e| match e.event {
            Event::ContactsDetected { count, .. } => Some(count),
            _ => None,
        })
        .sum()
}

fn sites(catalog: &MemoryCatalog) -> usize {
    catalog.count(Table::Contacts) + catalog.count(Table::Pois)
}

#[test]
fn detected_contacts_are_registered_once() {
    let mut content = calm_content();
    content.constants.surface_detection_probability = 0.01;
    let mut state = base_state(&content);
    let mut catalog = MemoryCatalog::new();
    let first = step(&mut state, &mut catalog, &content);
    assert!(sites(&catalog) > 0);
    assert_eq!(detections(&first), sites(&catalog));

    // Cells already on file are never registered twice.
    let before = sites(&catalog);
    let second = step(&mut state, &mut catalog, &content);
    assert_eq!(sites(&catalog), before + detections(&second));
}

#[test]
fn debug_level_reports_crew_work() {
    let content = calm_content();
    let mut state = base_state(&content);
    state.health.lab = 60.0;
    let mut catalog = MemoryCatalog::new();
    let mut narrator = FailingNarrator;
    let mut services = Services {
        catalog: &mut catalog,
        narrator: &mut narrator,
    };
    let report = tick(&mut state, &mut services, &content, TICK_SECS, EventLevel::Debug);
    assert!(has_event(&report.events, |e| matches!(e, Event::ComponentMaintained { .. })));

    let mut quiet = base_state(&content);
    quiet.health.lab = 60.0;
    let report = tick(&mut quiet, &mut services, &content, TICK_SECS, EventLevel::Normal);
    assert!(!has_event(&report.events, |e| matches!(e, Event::ComponentMaintained { .. })));
}

#[test]
fn summary_reflects_post_tick_state() {
    let content = calm_content();
    let mut state = base_state(&content);
    let mut catalog = MemoryCatalog::new();
    let report = step(&mut state, &mut catalog, &content);
    assert_eq!(report.summary.tick, state.meta.tick);
    assert!((report.summary.speed - state.speed).abs() < 1e-9);
    assert_eq!(report.summary.crew_aboard, 5);
    assert!(report.summary.message.starts_with("Boldly going"));
}
