//! Prompts for the content generator and the text used when it fails.
//!
//! The generator is best-effort: every call here has a deterministic
//! fallback, so a dead generator never stalls the voyage.

use crate::{Constants, Event, PoiKind, PoiProfile, Role, ShipState};

/// External text and image generation.
///
/// `None` means "failed, use fallback". Implementations must not panic.
pub trait ContentGenerator {
    fn describe(&mut self, prompt: &str) -> Option<String>;
    /// Returns a reference to the stored image.
    fn image(&mut self, prompt: &str, tag: &str) -> Option<String>;
    fn name(&mut self, subject: &str) -> Option<String>;
}

pub fn weirdness_word(weirdness: u8) -> &'static str {
    match weirdness {
        1 => "mundane",
        2 => "typical",
        3 => "normal",
        4 => "average",
        5 => "unique",
        6 => "distinctive",
        7 => "eccentric",
        8 => "weird",
        9 => "alien",
        10 => "inexplicable",
        _ => "unremarkable",
    }
}

/// Site size in minutes of exploration, as a rough descriptor.
pub fn size_word(size: u32) -> &'static str {
    match size {
        0..=15 => "small",
        16..=30 => "medium",
        31..=45 => "large",
        46..=60 => "huge",
        _ => "unknown size",
    }
}

/// Python-style title case: first letter of each word upper, rest lower.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

fn generated_name(narrator: &mut dyn ContentGenerator, subject: &str, prompt: &str) -> String {
    narrator
        .name(prompt)
        .map(|raw| {
            raw.chars()
                .filter(|c| c.is_alphanumeric() || c.is_whitespace())
                .filter(|c| *c != '\n' && *c != '\r')
                .collect::<String>()
        })
        .map(|cleaned| title_case(cleaned.trim()))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| title_case(&format!("Unknown {subject}")))
}

pub fn crew_name(narrator: &mut dyn ContentGenerator, title: &str) -> String {
    let prompt = format!(
        "Come up with a first and last name for a {title}. The name should be a normal English name."
    );
    generated_name(narrator, title, &prompt)
}

pub fn poi_name(narrator: &mut dyn ContentGenerator, kind: PoiKind) -> String {
    let prompt = format!(
        "Choose a unique name for a {kind} located in the middle of the ocean."
    );
    generated_name(narrator, kind.label(), &prompt)
}

pub fn describe_poi(
    narrator: &mut dyn ContentGenerator,
    name: &str,
    profile: &PoiProfile,
    size: u32,
) -> String {
    let size = size_word(size);
    let kind = profile.kind;
    let prompt = format!(
        "The crew has found a {size}, {adj} {kind}. The {kind} is {weird}. In five sentences \
         or less, write a description of the {kind}, along with mentioning flora and fauna \
         that might be present.",
        adj = profile.adjective,
        weird = weirdness_word(profile.weirdness),
    );
    narrator
        .describe(&prompt)
        .unwrap_or_else(|| format!("{name} is a {size}, {} {kind}.", profile.adjective))
}

/// Things an away team can bring back a report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finding {
    Flora,
    Fauna,
    Tech,
    Artifact,
}

impl Finding {
    pub fn label(self) -> &'static str {
        match self {
            Finding::Flora => "plant",
            Finding::Fauna => "animal",
            Finding::Tech => "tech",
            Finding::Artifact => "artifact",
        }
    }
}

pub fn describe_finding(
    narrator: &mut dyn ContentGenerator,
    finding: Finding,
    site: &str,
    weirdness: u8,
) -> String {
    let word = weirdness_word(weirdness);
    let prompt = match finding {
        Finding::Artifact => format!(
            "The crew has discovered an ancient artifact at {site}. The artifact is {word}. \
             Write a paragraph describing in detail what the artifact looks like."
        ),
        Finding::Tech => format!(
            "The crew has discovered some kind of technological device at {site}. The device \
             is {word}. Write a paragraph describing in detail what the device looks like."
        ),
        Finding::Flora => format!(
            "The crew has discovered what appears to be some kind of flora at {site}. The plant \
             is {word}. Write a paragraph describing in detail what the plant looks like."
        ),
        Finding::Fauna => format!(
            "The crew has discovered a {word} animal at {site}. Describe in detail what the \
             beast looks like."
        ),
    };
    narrator.describe(&prompt).unwrap_or_else(|| {
        format!(
            "The crew found a {} at {site}, and it's very {word}.",
            finding.label()
        )
    })
}

const PHOTO_SUBJECT_LIMIT: usize = 4000;

/// Longest prefix of `text` within `limit` bytes that ends on a char boundary.
fn clip(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut cut = limit;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    &text[..cut]
}

/// Photograph of `subject`. Falls back to the configured placeholder image.
pub fn photograph(
    narrator: &mut dyn ContentGenerator,
    subject: &str,
    tag: &str,
    constants: &Constants,
) -> String {
    let subject = clip(subject, PHOTO_SUBJECT_LIMIT);
    let prompt = format!(
        "A photograph of the following item:\n{subject}\nThe image MUST look like a realistic \
         photograph from a camera."
    );
    narrator
        .image(&prompt, tag)
        .unwrap_or_else(|| constants.fallback_image.clone())
}

/// Tag used to file images taken at a cell at the current ship time.
pub fn image_tag(state: &ShipState, x: i64, y: i64, site: &str, suffix: &str) -> String {
    let mut tag = format!(
        "{}-{}_{x}-{y}_{site}",
        state.clock.day,
        state.clock.seconds.round()
    );
    if !suffix.is_empty() {
        tag.push('_');
        tag.push_str(suffix);
    }
    tag
}

/// A crew member's log, personal when `occasion` is `None`.
///
/// Vacant seats write nothing. Event logs carry the ship's status footer.
pub fn crew_log(
    state: &ShipState,
    narrator: &mut dyn ContentGenerator,
    role: Role,
    occasion: Option<&str>,
    footer: &str,
) -> Option<Event> {
    let seat = state.crew.seat(role);
    let name = seat.occupant.as_deref()?;
    let title = &seat.title;
    let prompt = match occasion {
        Some(event) => format!(
            "From the perspective of {title} {name}, write a personal log describing the recent \
             {event}. The log does NOT need to have a date at the beginning."
        ),
        None => format!(
            "From the perspective of {title} {name}, write a personal log about life aboard the \
             ocean-faring vessel {ship}. The log does NOT need to have a date at the beginning. \
             Do NOT make any references to specific times or locations. Do not mention how long \
             the mission is.",
            ship = state.name
        ),
    };
    let text = narrator.describe(&prompt).unwrap_or_else(|| match occasion {
        Some(event) => format!("{title} {name} records the {event}."),
        None => format!("{title} {name} reports another quiet watch aboard {}.", state.name),
    });
    let header = format!(
        "{title}'s Log, Day {}, Time {}",
        state.clock.day,
        state.clock.seconds.round()
    );
    let (log_title, body) = match occasion {
        Some(event) => (
            format!("{title}'s Log: {}", title_case(event)),
            format!("{header}\n\n{text}\n{footer}"),
        ),
        None => (format!("{title}'s Personal Log"), format!("{header}\n\n{text}\n")),
    };
    Some(Event::LogEntry {
        author: seat.full_name(),
        title: log_title,
        body,
    })
}
