//! Merging timestamps from the two signal sources.

/// Sorted, deduplicated union of the audio and motion timestamp sequences.
///
/// "OR" semantics: a moment is a highlight if either source flags it.
/// Deduplication is by exact float equality. Near-identical timestamps
/// produced independently by the two detectors almost never collide
/// exactly, so both survive as distinct highlights; a tolerance-based merge
/// would change the output contract and is deliberately not applied here.
#[must_use]
pub fn merge_timestamps(audio: &[f64], motion: &[f64]) -> Vec<f64> {
    let mut merged: Vec<f64> = audio.iter().chain(motion.iter()).copied().collect();
    merged.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    merged.dedup_by(|a, b| a == b);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_sorted_union() {
        let audio = [10.0, 2.0];
        let motion = [5.0, 20.3];
        assert_eq!(merge_timestamps(&audio, &motion), vec![2.0, 5.0, 10.0, 20.3]);
    }

    #[test]
    fn test_merge_drops_exact_duplicates() {
        let audio = [1.0, 2.0];
        let motion = [2.0, 3.0];
        assert_eq!(merge_timestamps(&audio, &motion), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_merge_keeps_near_duplicates() {
        let audio = [2.000_001];
        let motion = [2.0];
        assert_eq!(merge_timestamps(&audio, &motion).len(), 2);
    }

    #[test]
    fn test_merge_empty_inputs() {
        assert!(merge_timestamps(&[], &[]).is_empty());
        assert_eq!(merge_timestamps(&[1.0], &[]), vec![1.0]);
        assert_eq!(merge_timestamps(&[], &[1.0]), vec![1.0]);
    }
}
