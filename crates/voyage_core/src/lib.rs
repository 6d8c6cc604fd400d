//! `voyage_core`: deterministic ocean voyage simulation.
//!
//! No IO, no network. World content derives from the seed and grid
//! coordinates; collaborators come in through the `Catalog` and
//! `ContentGenerator` traits.

mod arrival;
pub mod catalog;
pub mod crew;
mod duty;
pub mod economy;
mod engine;
mod incidents;
pub mod narrative;
pub mod navigation;
pub mod probability;
pub mod status;
mod types;
mod underway;
pub mod worldgen;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use catalog::{Catalog, MemoryCatalog, Table};
pub use engine::{tick, Services, TerminationReason, TickReport, TickStatus};
pub use narrative::ContentGenerator;
pub use probability::{Frequency, FrequencyTable};
pub use status::{summarize, StatusFileWriter, StatusReport};
pub use types::*;

/// Current `ShipState` snapshot layout.
pub const SCHEMA_VERSION: u32 = 1;

pub(crate) fn emit(counters: &mut Counters, tick: u64, event: Event) -> EventEnvelope {
    let id = EventId(format!("evt_{:06}", counters.next_event_id));
    counters.next_event_id += 1;
    EventEnvelope { id, tick, event }
}

#[cfg(test)]
mod tests;
