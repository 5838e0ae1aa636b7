use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lowest and highest value a juror may give on a criterion.
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: String,
    pub name: String,
}

impl Criterion {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub nominations: Vec<String>,
    pub criteria: Vec<Criterion>,
    pub submission_deadline: DateTime<Utc>,
    pub rating_deadline: DateTime<Utc>,
    /// User ids of the jury members.
    #[serde(default)]
    pub jury: Vec<String>,
    pub admin_id: String,
}

impl Contest {
    pub fn has_nomination(&self, nomination: &str) -> bool {
        self.nominations.iter().any(|n| n == nomination)
    }

    pub fn criterion(&self, criterion_id: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.id == criterion_id)
    }

    pub fn is_jury_member(&self, user_id: &str) -> bool {
        self.jury.iter().any(|j| j == user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// One juror's per-criterion values for one entry.
///
/// Partial sets are valid: a juror fills criteria one at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatingSet(BTreeMap<String, u8>);

impl RatingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, criterion_id: &str) -> Option<u8> {
        self.0.get(criterion_id).copied()
    }

    /// Upsert a single criterion, leaving the others untouched.
    pub fn set(&mut self, criterion_id: impl Into<String>, value: u8) {
        self.0.insert(criterion_id.into(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of every value present, whatever the criterion.
    pub fn total(&self) -> u32 {
        self.0.values().map(|v| u32::from(*v)).sum()
    }

    /// True when every declared criterion has a value.
    pub fn is_complete(&self, criteria: &[Criterion]) -> bool {
        criteria.iter().all(|c| self.0.contains_key(&c.id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn criterion_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, u8)> for RatingSet {
    fn from_iter<I: IntoIterator<Item = (K, u8)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub contest_id: String,
    pub title: String,
    pub nomination: String,
    /// Image URI.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    /// Juror id -> that juror's rating-set.
    #[serde(default)]
    pub ratings: BTreeMap<String, RatingSet>,
}

impl Entry {
    pub fn rating_of(&self, juror_id: &str) -> Option<&RatingSet> {
        self.ratings.get(juror_id)
    }

    /// Whether the juror has a complete rating-set on this entry.
    pub fn is_rated_by(&self, juror_id: &str, criteria: &[Criterion]) -> bool {
        self.rating_of(juror_id)
            .is_some_and(|r| r.is_complete(criteria))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Jury,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria() -> Vec<Criterion> {
        vec![
            Criterion::new("originality", "Originality"),
            Criterion::new("composition", "Composition"),
            Criterion::new("technical", "Technical quality"),
        ]
    }

    #[test]
    fn test_rating_set_total_and_completeness() {
        let mut ratings = RatingSet::new();
        ratings.set("originality", 8);
        ratings.set("composition", 9);
        assert_eq!(ratings.total(), 17);
        assert!(!ratings.is_complete(&criteria()));

        ratings.set("technical", 7);
        assert_eq!(ratings.total(), 24);
        assert!(ratings.is_complete(&criteria()));
    }

    #[test]
    fn test_rating_set_set_overwrites_single_criterion() {
        let mut ratings: RatingSet = [("originality", 3), ("composition", 4)].into_iter().collect();
        ratings.set("originality", 10);
        assert_eq!(ratings.get("originality"), Some(10));
        assert_eq!(ratings.get("composition"), Some(4));
        assert_eq!(ratings.len(), 2);
    }

    #[test]
    fn test_empty_rating_set_is_complete_for_no_criteria() {
        assert!(RatingSet::new().is_complete(&[]));
    }

    #[test]
    fn test_rating_set_serializes_as_plain_map() {
        let ratings: RatingSet = [("originality", 8), ("composition", 9)].into_iter().collect();
        let json = serde_json::to_string(&ratings).unwrap();
        assert_eq!(json, r#"{"composition":9,"originality":8}"#);
    }

    #[test]
    fn test_entry_deserializes_without_author_or_ratings() {
        let json = r#"{
            "id": "entry-1",
            "contest_id": "1",
            "title": "Dawn",
            "nomination": "Landscape",
            "url": "https://example.com/dawn.jpg"
        }"#;
        let entry: Entry = serde_json::from_str(json).unwrap();
        assert!(entry.author.is_none());
        assert!(entry.ratings.is_empty());
        assert!(!entry.is_rated_by("jury-1", &criteria()));
    }

    #[test]
    fn test_contest_lookups() {
        let contest = Contest {
            id: "1".to_string(),
            name: "Ural Trail".to_string(),
            description: String::new(),
            nominations: vec!["Landscape".to_string(), "Fauna".to_string()],
            criteria: criteria(),
            submission_deadline: Utc::now(),
            rating_deadline: Utc::now(),
            jury: vec!["jury-1".to_string()],
            admin_id: "user-1".to_string(),
        };
        assert!(contest.has_nomination("Fauna"));
        assert!(!contest.has_nomination("Flora"));
        assert_eq!(contest.criterion("technical").unwrap().name, "Technical quality");
        assert!(contest.criterion("lighting").is_none());
        assert!(contest.is_jury_member("jury-1"));
        assert!(!contest.is_jury_member("jury-2"));
    }
}
