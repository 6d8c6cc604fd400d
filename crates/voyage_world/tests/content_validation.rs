//! Content validation tests for the shipped JSON game data.
//!
//! These tests load the actual `content/*.json` files and check:
//! 1. Schema validity (all files deserialize)
//! 2. Range constraints (no negative prices, sane probabilities)
//! 3. Content invariants (the voyage is playable)

use std::sync::OnceLock;
use voyage_core::{Catalog, Depth, GameContent, PoiKind, ResourceRule, Role};
use voyage_world::{build_initial_catalog, build_initial_state, load_content, OfflineNarrator};

/// Integration tests run from the crate directory, so go up two levels.
fn content_dir() -> String {
    let manifest = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    format!("{manifest}/../../content")
}

fn load_test_content() -> &'static GameContent {
    static CONTENT: OnceLock<GameContent> = OnceLock::new();
    CONTENT.get_or_init(|| {
        load_content(&content_dir()).expect("load_content should succeed for production content")
    })
}

// =========================================================================
// 1. Schema validation
// =========================================================================

#[test]
fn content_loads_successfully() {
    let content = load_test_content();
    assert!(!content.content_version.is_empty());
}

#[test]
fn missing_directory_reports_which_file() {
    let err = load_content("/nonexistent/content").unwrap_err();
    assert!(format!("{err:#}").contains("constants.json"));
}

// =========================================================================
// 2. Range constraints
// =========================================================================

#[test]
fn prices_are_positive() {
    let c = &load_test_content().constants;
    for (name, price) in [
        ("hire", c.hire_price),
        ("repair", c.repair_price_per_point),
        ("fuel", c.fuel_price),
        ("water", c.water_price),
        ("food", c.food_price),
    ] {
        assert!(price > 0.0, "{name} price is not positive: {price}");
    }
}

#[test]
fn detection_probabilities_are_probabilities() {
    let c = &load_test_content().constants;
    for p in [
        c.surface_detection_probability,
        c.submerged_detection_probability,
    ] {
        assert!((0.0..=1.0).contains(&p), "detection probability {p}");
    }
}

#[test]
fn frequencies_lengthen_with_period() {
    let f = &load_test_content().constants.frequency_ticks;
    let ordered = [
        f.daily,
        f.bidaily,
        f.weekly,
        f.biweekly,
        f.monthly,
        f.bimonthly,
    ];
    assert!(ordered.windows(2).all(|w| w[0] < w[1]), "{ordered:?}");
    // Authored for five-second ticks.
    assert_eq!(f.daily, 86_400 / 5);
}

#[test]
fn repair_ceilings_are_percentages() {
    let c = &load_test_content().constants;
    for ceiling in [
        c.chief_engineer_repair_ceiling,
        c.junior_engineer_repair_ceiling,
    ] {
        assert!(ceiling > 0.0 && ceiling <= 100.0);
    }
}

// =========================================================================
// 3. Content invariants
// =========================================================================

#[test]
fn starting_cargo_fits_capacity() {
    let ship = &load_test_content().ship;
    assert!(ship.cargo.fuel <= ship.capacity.fuel);
    assert!(ship.cargo.food <= ship.capacity.food);
    assert!(ship.cargo.water <= ship.capacity.water);
    assert!(ship.cargo.iron <= ship.capacity.iron);
    assert!(ship.cargo.silicon <= ship.capacity.silicon);
}

#[test]
fn deposits_carry_fuel() {
    let content = load_test_content();
    let deposit = content.poi_types.def(PoiKind::Deposit).unwrap();
    match &deposit.resources {
        ResourceRule::Fixed(set) => assert!(set.contains(&voyage_core::Resource::Fuel)),
        ResourceRule::Pool(_) => panic!("deposit resources should be fixed"),
    }
    assert!(content
        .poi_types
        .for_depth(Depth::Submerged)
        .iter()
        .any(|def| def.kind == PoiKind::Deposit));
}

#[test]
fn wrecks_and_reefs_yield_the_same_resources_everywhere() {
    let content = load_test_content();
    for kind in [PoiKind::Wreck, PoiKind::Coral] {
        let mut sets = Vec::new();
        for x in 0..400 {
            let cell = voyage_core::GridPos::new(x, 17 - x);
            let profile = voyage_core::worldgen::profile_poi(99, cell, Depth::Submerged, content);
            if profile.kind == kind && !sets.contains(&profile.resources) {
                sets.push(profile.resources);
            }
        }
        assert_eq!(sets.len(), 1, "{kind} resources vary by cell: {sets:?}");
    }
}

#[test]
fn sensors_cover_both_depths() {
    let ship = &load_test_content().ship;
    assert!(ship.sensors.iter().any(|s| s.kind.depth() == Depth::Surface));
    assert!(ship.sensors.iter().any(|s| s.kind.depth() == Depth::Submerged));
}

#[test]
fn new_game_is_crewed_and_moored() {
    let content = load_test_content();
    let state = build_initial_state(content, 1, &mut OfflineNarrator);
    for role in Role::ALL {
        assert!(!state.crew.seat(role).is_vacant(), "{role:?} vacant");
    }
    let catalog = build_initial_catalog(content, 1);
    assert_eq!(catalog.pois_by_kind(PoiKind::OffshorePlatform).len(), 1);
}
