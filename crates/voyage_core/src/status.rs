//! Ship status summary produced at the end of every tick.
//!
//! `summarize(&ShipState, &dyn Catalog, &GameContent) -> StatusReport` reads
//! state without mutating it. The report feeds console output, log footers,
//! the daemon API, and the status CSV.

use std::io::Write;

use serde::Serialize;

use crate::catalog::{Catalog, Table};
use crate::navigation;
use crate::{GameContent, GridPos, Position, SensorKind, ShipState, ShipStatus, Track};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSummary {
    pub target: GridPos,
    pub label: String,
    pub distance: f64,
    pub eta: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub tick: u64,
    pub day: u64,
    pub seconds: f64,
    pub status: ShipStatus,
    pub message: String,
    pub position: Position,
    pub heading: f64,
    pub speed: f64,
    pub emergency_sail: bool,
    pub track: Option<TrackSummary>,
    pub sensor_ranges: Vec<(SensorKind, f64)>,
    pub fuel_pct: f64,
    pub overall_health: f64,
    pub crew_aboard: usize,
    pub contacts_pending: usize,
    pub pois_known: usize,
    pub money: f64,
}

/// Grid cell the current track points at, if it still resolves.
pub fn track_target(track: &Track, catalog: &dyn Catalog) -> Option<GridPos> {
    match track {
        Track::None => None,
        Track::BoldlyGoing { waypoint } => Some(*waypoint),
        Track::Contact { id } => catalog.contact(id).map(|c| c.pos),
        Track::Poi { id } => catalog.poi(id).map(|p| p.pos),
    }
}

fn describe_track(track: &Track, catalog: &dyn Catalog) -> (String, String) {
    match track {
        Track::None => (
            "none".to_string(),
            "Ship is preparing to get underway.".to_string(),
        ),
        Track::BoldlyGoing { waypoint } => (
            "distant waypoint".to_string(),
            format!("Boldly going to distant point {}, {}", waypoint.x, waypoint.y),
        ),
        Track::Poi { id } => {
            let name = catalog
                .poi(id)
                .map_or_else(|| id.to_string(), |poi| poi.name.clone());
            (name.clone(), format!("Cruising towards {name}"))
        }
        Track::Contact { id } => match catalog.contact(id) {
            Some(contact) => (
                format!("{} contact", contact.depth.label()),
                format!(
                    "Cruising towards unexplored {} contact at {}, {}",
                    contact.depth.label(),
                    contact.pos.x,
                    contact.pos.y
                ),
            ),
            None => (
                "lost contact".to_string(),
                "Searching for a lost contact.".to_string(),
            ),
        },
    }
}

pub fn summarize(state: &ShipState, catalog: &dyn Catalog, content: &GameContent) -> StatusReport {
    let (label, mut message) = describe_track(&state.track, catalog);
    if state.status == ShipStatus::Lost {
        message = format!("{} has been abandoned.", state.name);
    }
    let track = track_target(&state.track, catalog).map(|target| {
        let distance = navigation::range(state.position, target.center());
        TrackSummary {
            target,
            label,
            distance,
            eta: navigation::eta(state.speed, distance).map(navigation::format_eta),
        }
    });
    let emergency = content.constants.emergency_speed;
    StatusReport {
        tick: state.meta.tick,
        day: state.clock.day,
        seconds: state.clock.seconds,
        status: state.status,
        message,
        position: state.position,
        heading: state.heading,
        speed: state.speed,
        emergency_sail: state.speed > 0.0 && (state.speed - emergency).abs() < 1e-9,
        track,
        sensor_ranges: state
            .sensors
            .iter()
            .map(|s| (s.kind, navigation::effective_range(s.base_range, s.modifier_pct)))
            .collect(),
        fuel_pct: if state.capacity.fuel > 0.0 {
            state.cargo.fuel / state.capacity.fuel * 100.0
        } else {
            0.0
        },
        overall_health: state.health.overall(),
        crew_aboard: state.crew.count_aboard(),
        contacts_pending: catalog.count(Table::Contacts),
        pois_known: catalog.count(Table::Pois),
        money: state.money,
    }
}

impl StatusReport {
    /// Plain-text block appended to event logs.
    pub fn footer(&self) -> String {
        let mut out = String::from("\n---\n\n");
        out.push_str("                  SHIP'S STATUS\n\n");
        out.push_str(&format!("SHIP'S CLOCK: {}-{}\n\n", self.day, self.seconds.round()));
        out.push_str("NAVIGATION:\n\n");
        out.push_str(&format!(
            "   LOCATION: {:.2}, {:.2}\n\n",
            self.position.x, self.position.y
        ));
        out.push_str(&format!("   SPEED:    {:.1} knots\n\n", self.speed));
        out.push_str(&format!("   HEADING:  {:03}\n\n", self.heading.round() as i64));
        match &self.track {
            Some(track) => {
                out.push_str(&format!("   TRACK:    {} - {}\n\n", track.target, track.label));
                out.push_str(&format!(
                    "   DISTANCE: {:.2} nautical miles\n\n",
                    track.distance
                ));
                out.push_str(&format!(
                    "   ETA:      {}\n\n",
                    track.eta.as_deref().unwrap_or("N/A")
                ));
            }
            None => out.push_str("   TRACK:    N/A\n\n"),
        }
        out.push_str("SENSORS:\n\n");
        for (kind, range) in &self.sensor_ranges {
            out.push_str(&format!("   {:<8} {range:.2} nautical miles\n\n", kind.label()));
        }
        out.push_str(&format!("OVERALL HEALTH: {:.0}%\n\n", self.overall_health));
        out.push_str(&format!("FUEL: {:.1}%\n\n", self.fuel_pct));
        out.push_str(&format!("CREW ABOARD: {}\n", self.crew_aboard));
        out
    }

    /// One-line console rendering.
    pub fn line(&self) -> String {
        let sail = if self.emergency_sail { " (emergency sail)" } else { "" };
        format!(
            "[tick={:06} day={} t={:05.0}] pos=({:.1}, {:.1}) hdg={:03.0} spd={:.1}{sail} \
             fuel={:.0}% health={:.0}% crew={} contacts={} pois={} money=${:.0} | {}",
            self.tick,
            self.day,
            self.seconds,
            self.position.x,
            self.position.y,
            self.heading,
            self.speed,
            self.fuel_pct,
            self.overall_health,
            self.crew_aboard,
            self.contacts_pending,
            self.pois_known,
            self.money,
            self.message,
        )
    }
}

/// Write the CSV header row for status reports.
pub fn write_status_header(writer: &mut impl Write) -> std::io::Result<()> {
    writeln!(
        writer,
        "tick,day,seconds,status,x,y,heading,speed,emergency_sail,\
         track_distance,fuel_pct,overall_health,crew_aboard,contacts_pending,pois_known,money"
    )
}

/// Append a single status report as a CSV row.
pub fn append_status_row(writer: &mut impl Write, report: &StatusReport) -> std::io::Result<()> {
    writeln!(
        writer,
        "{},{},{},{:?},{},{},{},{},{},{},{},{},{},{},{},{}",
        report.tick,
        report.day,
        report.seconds,
        report.status,
        report.position.x,
        report.position.y,
        report.heading,
        report.speed,
        report.emergency_sail,
        report.track.as_ref().map_or(String::new(), |t| t.distance.to_string()),
        report.fuel_pct,
        report.overall_health,
        report.crew_aboard,
        report.contacts_pending,
        report.pois_known,
        report.money,
    )
}

/// Buffered status CSV that writes its header on creation.
pub struct StatusFileWriter {
    writer: std::io::BufWriter<std::fs::File>,
}

impl StatusFileWriter {
    pub fn create(path: &std::path::Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        write_status_header(&mut writer)?;
        Ok(Self { writer })
    }

    pub fn write_row(&mut self, report: &StatusReport) -> std::io::Result<()> {
        append_status_row(&mut self.writer, report)
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::test_fixtures::{base_content, base_state};
    use crate::Depth;

    #[test]
    fn idle_ship_has_no_track() {
        let content = base_content();
        let state = base_state(&content);
        let catalog = MemoryCatalog::new();
        let report = summarize(&state, &catalog, &content);
        assert!(report.track.is_none());
        assert_eq!(report.message, "Ship is preparing to get underway.");
        assert_eq!(report.crew_aboard, 5);
        assert!(report.footer().contains("TRACK:    N/A"));
    }

    #[test]
    fn contact_track_reports_distance_and_eta() {
        let content = base_content();
        let mut state = base_state(&content);
        let mut catalog = MemoryCatalog::new();
        let ids = catalog.insert_contacts(&[(GridPos::new(30, 40), Depth::Submerged)]);
        state.track = Track::Contact { id: ids[0].clone() };
        state.speed = 10.0;
        let report = summarize(&state, &catalog, &content);
        let track = report.track.clone().unwrap();
        assert!((track.distance - 50.0).abs() < 1e-9);
        assert_eq!(track.eta.as_deref(), Some("5 hours, 0 minutes"));
        assert!(report.message.contains("unexplored submerged contact at 30, 40"));
        assert_eq!(report.contacts_pending, 1);
    }

    #[test]
    fn emergency_sail_flag() {
        let content = base_content();
        let mut state = base_state(&content);
        state.speed = content.constants.emergency_speed;
        let report = summarize(&state, &MemoryCatalog::new(), &content);
        assert!(report.emergency_sail);
        assert!(report.line().contains("emergency sail"));
    }

    #[test]
    fn csv_row_has_header_width() {
        let content = base_content();
        let state = base_state(&content);
        let report = summarize(&state, &MemoryCatalog::new(), &content);
        let mut buf = Vec::new();
        write_status_header(&mut buf).unwrap();
        append_status_row(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].split(',').count(), lines[1].split(',').count());
    }
}
