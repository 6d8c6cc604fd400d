use super::*;
use crate::test_fixtures::{base_content, base_state, calm_content, insert_site, FailingNarrator};

mod orchestrator;
mod ship_loss;

// --- Shared test helpers ------------------------------------------------

const TICK_SECS: f64 = 5.0;

/// One tick of `secs` with an offline narrator at normal event level.
fn step_secs(
    state: &mut ShipState,
    catalog: &mut MemoryCatalog,
    content: &GameContent,
    secs: f64,
) -> TickReport {
    let mut narrator = FailingNarrator;
    let mut services = Services {
        catalog,
        narrator: &mut narrator,
    };
    tick(state, &mut services, content, secs, EventLevel::Normal)
}

fn step(state: &mut ShipState, catalog: &mut MemoryCatalog, content: &GameContent) -> TickReport {
    step_secs(state, catalog, content, TICK_SECS)
}

/// Runs up to `ticks` ticks, stopping early on termination.
fn run(
    state: &mut ShipState,
    catalog: &mut MemoryCatalog,
    content: &GameContent,
    ticks: usize,
    secs: f64,
) -> Vec<EventEnvelope> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        let report = step_secs(state, catalog, content, secs);
        events.extend(report.events);
        if report.status != TickStatus::Continue {
            break;
        }
    }
    events
}

fn has_event(events: &[EventEnvelope], pred: impl Fn(&Event) -> bool) -> bool {
    events.iter().any(|e| pred(&e.event))
}
