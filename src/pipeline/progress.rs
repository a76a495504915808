//! Mapping worker status messages to coarse progress percentages.

use crate::constants::PROGRESS_MILESTONES;

/// Map a status message to a coarse percentage by substring match against
/// the fixed milestone table. Returns `None` for unmatched messages, which
/// leave the displayed percentage unchanged.
#[must_use]
pub fn percent_for_message(message: &str) -> Option<u8> {
    PROGRESS_MILESTONES
        .iter()
        .find(|(needle, _)| message.contains(needle))
        .map(|&(_, percent)| percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_milestones_map_to_expected_percentages() {
        assert_eq!(percent_for_message("extracting audio from video..."), Some(10));
        assert_eq!(
            percent_for_message("analyzing audio for significant moments..."),
            Some(35)
        );
        assert_eq!(percent_for_message("analyzing motion in the video..."), Some(60));
        assert_eq!(percent_for_message("found 4 highlight moments"), Some(70));
        assert_eq!(percent_for_message("generating highlight video..."), Some(90));
        assert_eq!(percent_for_message("done"), Some(100));
    }

    #[test]
    fn test_unmatched_message_leaves_percentage_unchanged() {
        assert_eq!(percent_for_message("warming up"), None);
        assert_eq!(percent_for_message(""), None);
    }

    #[test]
    fn test_milestone_percentages_are_monotonic() {
        let percents: Vec<u8> = crate::constants::PROGRESS_MILESTONES
            .iter()
            .map(|&(_, p)| p)
            .collect();
        assert!(percents.windows(2).all(|w| w[0] < w[1]));
    }
}
