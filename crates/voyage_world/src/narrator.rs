//! Content generator for runs without a text or image service.

use voyage_core::ContentGenerator;

/// Always reports failure, so every prompt falls back to the built-in text.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineNarrator;

impl ContentGenerator for OfflineNarrator {
    fn describe(&mut self, prompt: &str) -> Option<String> {
        tracing::trace!(prompt, "offline: no description");
        None
    }

    fn image(&mut self, _prompt: &str, tag: &str) -> Option<String> {
        tracing::trace!(tag, "offline: no image");
        None
    }

    fn name(&mut self, _subject: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voyage_core::narrative;

    #[test]
    fn test_offline_names_fall_back() {
        let mut narrator = OfflineNarrator;
        assert_eq!(
            narrative::crew_name(&mut narrator, "Junior Engineer"),
            "Unknown Junior Engineer"
        );
        assert!(narrator.describe("anything").is_none());
    }
}
