use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::engine::{calculate_score, ScoreBreakdown, ScoreResult};
use crate::contest::{Contest, Entry};

/// An entry with its computed score and place inside its nomination.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry<'a> {
    pub entry: &'a Entry,
    pub score: f64,
    pub incomplete: bool,
    /// 1-based, unique within the nomination.
    pub place: usize,
    pub breakdown: ScoreBreakdown,
}

/// Rank entries within each nomination.
///
/// Ties never share a place: the entry that comes first in `entries` gets the
/// better one. The result is grouped by nomination name (byte order), each
/// group ordered by place.
pub fn rank_entries<'a>(contest: &Contest, entries: &'a [Entry]) -> Vec<RankedEntry<'a>> {
    let mut by_nomination: BTreeMap<&str, Vec<(usize, &'a Entry, ScoreResult)>> = BTreeMap::new();

    for (index, entry) in entries.iter().enumerate() {
        let result = calculate_score(entry, &contest.criteria);
        by_nomination
            .entry(entry.nomination.as_str())
            .or_default()
            .push((index, entry, result));
    }

    let mut ranked = Vec::with_capacity(entries.len());
    for (_, mut group) in by_nomination {
        // Primary: score descending. Tie-breaker: input position ascending.
        group.sort_by(|a, b| match b.2.score.total_cmp(&a.2.score) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });

        ranked.extend(
            group
                .into_iter()
                .enumerate()
                .map(|(pos, (_, entry, result))| RankedEntry {
                    entry,
                    score: result.score,
                    incomplete: result.incomplete,
                    place: pos + 1,
                    breakdown: result.breakdown,
                }),
        );
    }

    ranked
}

/// Keep one nomination, or everything when `nomination` is `None`.
pub fn filter_nomination<'a>(
    ranked: Vec<RankedEntry<'a>>,
    nomination: Option<&str>,
) -> Vec<RankedEntry<'a>> {
    match nomination {
        None => ranked,
        Some(nomination) => ranked
            .into_iter()
            .filter(|r| r.entry.nomination == nomination)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contest::{Criterion, RatingSet};
    use chrono::Utc;
    use proptest::prelude::*;

    fn contest() -> Contest {
        Contest {
            id: "1".to_string(),
            name: "Ural Trail".to_string(),
            description: String::new(),
            nominations: vec!["Landscape".to_string(), "Fauna".to_string(), "Flora".to_string()],
            criteria: vec![
                Criterion::new("originality", "Originality"),
                Criterion::new("composition", "Composition"),
            ],
            submission_deadline: Utc::now(),
            rating_deadline: Utc::now(),
            jury: vec![],
            admin_id: "user-1".to_string(),
        }
    }

    /// Entry with one juror whose rating-set sums to `total` (0 = unrated).
    fn entry_with_total(id: &str, nomination: &str, total: u8) -> Entry {
        let mut entry = Entry {
            id: id.to_string(),
            contest_id: "1".to_string(),
            title: format!("Photo {}", id),
            nomination: nomination.to_string(),
            url: format!("https://example.com/{}.jpg", id),
            author: None,
            ratings: Default::default(),
        };
        if total > 0 {
            let first = total.min(10);
            let mut ratings = RatingSet::new();
            ratings.set("originality", first);
            if total > first {
                ratings.set("composition", total - first);
            }
            entry.ratings.insert("jury-1".to_string(), ratings);
        }
        entry
    }

    fn ids<'a>(ranked: &'a [RankedEntry<'_>]) -> Vec<&'a str> {
        ranked.iter().map(|r| r.entry.id.as_str()).collect()
    }

    #[test]
    fn test_rank_single_nomination_by_score() {
        let entries = vec![
            entry_with_total("a", "Landscape", 10),
            entry_with_total("b", "Landscape", 18),
            entry_with_total("c", "Landscape", 0),
        ];
        let ranked = rank_entries(&contest(), &entries);
        assert_eq!(ids(&ranked), vec!["b", "a", "c"]);
        assert_eq!(
            ranked.iter().map(|r| r.place).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(ranked[2].score, 0.0);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let entries = vec![
            entry_with_total("first", "Landscape", 12),
            entry_with_total("second", "Landscape", 12),
            entry_with_total("best", "Landscape", 15),
        ];
        let ranked = rank_entries(&contest(), &entries);
        assert_eq!(ids(&ranked), vec!["best", "first", "second"]);
        assert_eq!(ranked[1].place, 2);
        assert_eq!(ranked[2].place, 3);
    }

    #[test]
    fn test_places_restart_per_nomination_and_groups_sorted_by_name() {
        let entries = vec![
            entry_with_total("l1", "Landscape", 5),
            entry_with_total("f1", "Fauna", 9),
            entry_with_total("l2", "Landscape", 7),
            entry_with_total("fl1", "Flora", 3),
        ];
        let ranked = rank_entries(&contest(), &entries);
        assert_eq!(ids(&ranked), vec!["f1", "fl1", "l2", "l1"]);
        assert_eq!(
            ranked.iter().map(|r| r.place).collect::<Vec<_>>(),
            vec![1, 1, 1, 2]
        );
    }

    #[test]
    fn test_partial_rating_marks_incomplete() {
        let entries = vec![entry_with_total("a", "Landscape", 4)];
        let ranked = rank_entries(&contest(), &entries);
        assert!(ranked[0].incomplete);
    }

    #[test]
    fn test_ranked_entry_carries_juror_breakdown() {
        let mut entry = entry_with_total("a", "Landscape", 14);
        entry
            .ratings
            .insert("jury-2".to_string(), [("originality", 6)].into_iter().collect());
        let entries = vec![entry];
        let ranked = rank_entries(&contest(), &entries);

        let jurors: Vec<(&str, u32, usize)> = ranked[0]
            .breakdown
            .jurors
            .iter()
            .map(|j| (j.juror_id.as_str(), j.total, j.criteria_rated))
            .collect();
        assert_eq!(jurors, vec![("jury-1", 14, 2), ("jury-2", 6, 1)]);
        assert_eq!(ranked[0].score, 10.0);
        assert!(ranked[0].incomplete);
    }

    #[test]
    fn test_rank_empty_input() {
        assert!(rank_entries(&contest(), &[]).is_empty());
    }

    #[test]
    fn test_filter_nomination() {
        let entries = vec![
            entry_with_total("l1", "Landscape", 5),
            entry_with_total("f1", "Fauna", 9),
        ];
        let ranked = rank_entries(&contest(), &entries);
        let all = filter_nomination(ranked.clone(), None);
        assert_eq!(all.len(), 2);

        let fauna = filter_nomination(ranked, Some("Fauna"));
        assert_eq!(ids(&fauna), vec!["f1"]);
        assert_eq!(fauna[0].place, 1);
    }

    proptest! {
        #[test]
        fn places_are_consecutive_and_scores_non_increasing(
            totals in proptest::collection::vec(0u8..=20, 0..40)
        ) {
            let entries: Vec<Entry> = totals
                .iter()
                .enumerate()
                .map(|(i, t)| entry_with_total(&i.to_string(), "Landscape", *t))
                .collect();
            let ranked = rank_entries(&contest(), &entries);

            prop_assert_eq!(ranked.len(), entries.len());
            for (i, r) in ranked.iter().enumerate() {
                prop_assert_eq!(r.place, i + 1);
            }
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
                if pair[0].score == pair[1].score {
                    let a: usize = pair[0].entry.id.parse().unwrap();
                    let b: usize = pair[1].entry.id.parse().unwrap();
                    prop_assert!(a < b, "tie broken out of input order: {} before {}", a, b);
                }
            }
        }
    }
}
