use crate::contest::{Criterion, Entry};

/// Index of the first entry after `after_index` that the juror has not fully
/// rated yet. Only looks forward and never wraps around.
pub fn next_unrated(
    entries: &[Entry],
    criteria: &[Criterion],
    juror_id: &str,
    after_index: usize,
) -> Option<usize> {
    entries
        .iter()
        .enumerate()
        .skip(after_index.saturating_add(1))
        .find(|(_, e)| !e.is_rated_by(juror_id, criteria))
        .map(|(i, _)| i)
}

/// Where a juror session starts: the first entry not fully rated.
pub fn first_unrated(entries: &[Entry], criteria: &[Criterion], juror_id: &str) -> Option<usize> {
    entries
        .iter()
        .position(|e| !e.is_rated_by(juror_id, criteria))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JuryProgress {
    pub rated: usize,
    pub total: usize,
}

impl JuryProgress {
    pub fn of(entries: &[Entry], criteria: &[Criterion], juror_id: &str) -> Self {
        Self {
            rated: entries
                .iter()
                .filter(|e| e.is_rated_by(juror_id, criteria))
                .count(),
            total: entries.len(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.rated == self.total
    }

    pub fn remaining(&self) -> usize {
        self.total - self.rated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contest::RatingSet;

    fn criteria() -> Vec<Criterion> {
        vec![
            Criterion::new("originality", "Originality"),
            Criterion::new("composition", "Composition"),
        ]
    }

    fn entry(id: &str, jury_1: Option<&[(&str, u8)]>) -> Entry {
        let mut entry = Entry {
            id: id.to_string(),
            contest_id: "1".to_string(),
            title: id.to_string(),
            nomination: "Landscape".to_string(),
            url: format!("https://example.com/{}.jpg", id),
            author: None,
            ratings: Default::default(),
        };
        if let Some(values) = jury_1 {
            let ratings: RatingSet = values.iter().copied().collect();
            entry.ratings.insert("jury-1".to_string(), ratings);
        }
        entry
    }

    const FULL: &[(&str, u8)] = &[("originality", 7), ("composition", 8)];
    const PARTIAL: &[(&str, u8)] = &[("originality", 7)];

    fn sample_entries() -> Vec<Entry> {
        vec![
            entry("e0", Some(FULL)),
            entry("e1", None),
            entry("e2", Some(FULL)),
            entry("e3", Some(PARTIAL)),
            entry("e4", Some(FULL)),
        ]
    }

    #[test]
    fn test_next_unrated_skips_completed() {
        let entries = sample_entries();
        assert_eq!(next_unrated(&entries, &criteria(), "jury-1", 0), Some(1));
        assert_eq!(next_unrated(&entries, &criteria(), "jury-1", 1), Some(3));
    }

    #[test]
    fn test_next_unrated_never_wraps() {
        let entries = sample_entries();
        assert_eq!(next_unrated(&entries, &criteria(), "jury-1", 3), None);
        assert_eq!(next_unrated(&entries, &criteria(), "jury-1", 4), None);
        assert_eq!(next_unrated(&entries, &criteria(), "jury-1", 100), None);
    }

    #[test]
    fn test_next_unrated_for_other_juror() {
        let entries = sample_entries();
        // jury-2 rated nothing, so the very next entry is a candidate.
        assert_eq!(next_unrated(&entries, &criteria(), "jury-2", 2), Some(3));
    }

    #[test]
    fn test_next_unrated_handles_max_index() {
        let entries = sample_entries();
        assert_eq!(next_unrated(&entries, &criteria(), "jury-1", usize::MAX), None);
    }

    #[test]
    fn test_first_unrated() {
        let entries = sample_entries();
        assert_eq!(first_unrated(&entries, &criteria(), "jury-1"), Some(1));
        let done = vec![entry("e0", Some(FULL))];
        assert_eq!(first_unrated(&done, &criteria(), "jury-1"), None);
    }

    #[test]
    fn test_progress_counts_only_complete_sets() {
        let progress = JuryProgress::of(&sample_entries(), &criteria(), "jury-1");
        assert_eq!(progress, JuryProgress { rated: 3, total: 5 });
        assert_eq!(progress.remaining(), 2);
        assert!(!progress.is_done());
        assert!(JuryProgress::of(&[], &criteria(), "jury-1").is_done());
    }
}
