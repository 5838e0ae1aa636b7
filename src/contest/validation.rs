use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::types::{Author, Contest, Criterion};

/// Fields an organizer supplies when creating a contest.
///
/// Example YAML:
/// ```yaml
/// name: Ural Trail 2025
/// description: Annual nature photo contest
/// nominations: [Landscape, Fauna, Flora]
/// criteria:
///   - { id: originality, name: Originality }
///   - { id: composition, name: Composition }
/// submission_deadline: 2025-02-15T23:59:59Z
/// rating_deadline: 2025-03-01T23:59:59Z
/// jury: [jury-1, jury-2]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContestDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nominations: Vec<String>,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
    #[serde(default)]
    pub submission_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rating_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub jury: Vec<String>,
}

/// Partial update of an existing contest. Absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContestPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub nominations: Option<Vec<String>>,
    #[serde(default)]
    pub criteria: Option<Vec<Criterion>>,
    #[serde(default)]
    pub submission_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rating_deadline: Option<DateTime<Utc>>,
}

impl ContestPatch {
    /// Overlay the patch on an existing contest, as a draft ready for validation.
    pub fn apply_to(&self, contest: &Contest) -> ContestDraft {
        ContestDraft {
            name: self.name.clone().unwrap_or_else(|| contest.name.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| contest.description.clone()),
            nominations: self
                .nominations
                .clone()
                .unwrap_or_else(|| contest.nominations.clone()),
            criteria: self
                .criteria
                .clone()
                .unwrap_or_else(|| contest.criteria.clone()),
            submission_deadline: self.submission_deadline.or(Some(contest.submission_deadline)),
            rating_deadline: self.rating_deadline.or(Some(contest.rating_deadline)),
            jury: contest.jury.clone(),
        }
    }
}

/// What a participant sends with a new entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySubmission {
    pub title: String,
    pub nomination: String,
    pub url: String,
    pub author: Author,
}

/// Validate a contest draft.
/// Returns all validation errors at once (not just the first).
pub fn validate_contest(draft: &ContestDraft) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if draft.name.trim().is_empty() {
        errors.push("name: required".to_string());
    }

    if draft.nominations.is_empty() {
        errors.push("nominations: at least one nomination is required".to_string());
    }
    let mut seen = HashSet::new();
    for (i, nomination) in draft.nominations.iter().enumerate() {
        if nomination.trim().is_empty() {
            errors.push(format!("nominations[{}]: must not be blank", i));
        } else if !seen.insert(nomination.as_str()) {
            errors.push(format!("nominations[{}]: duplicate '{}'", i, nomination));
        }
    }

    if draft.criteria.is_empty() {
        errors.push("criteria: at least one criterion is required".to_string());
    }
    let mut seen = HashSet::new();
    for (i, criterion) in draft.criteria.iter().enumerate() {
        if criterion.id.trim().is_empty() {
            errors.push(format!("criteria[{}].id: must not be blank", i));
        } else if !seen.insert(criterion.id.as_str()) {
            errors.push(format!("criteria[{}].id: duplicate '{}'", i, criterion.id));
        }
    }

    match (draft.submission_deadline, draft.rating_deadline) {
        (Some(submission), Some(rating)) if rating < submission => {
            errors.push("rating_deadline: must not be before submission_deadline".to_string());
        }
        (submission, rating) => {
            if submission.is_none() {
                errors.push("submission_deadline: required".to_string());
            }
            if rating.is_none() {
                errors.push("rating_deadline: required".to_string());
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a participant's submission against the contest it targets.
pub fn validate_submission(
    contest: &Contest,
    submission: &EntrySubmission,
) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if submission.title.trim().is_empty() {
        errors.push("title: required".to_string());
    }
    if submission.url.trim().is_empty() {
        errors.push("url: required".to_string());
    }
    if submission.author.full_name.trim().is_empty() {
        errors.push("author.full_name: required".to_string());
    }
    if submission.author.email.trim().is_empty() {
        errors.push("author.email: required".to_string());
    }
    if !contest.has_nomination(&submission.nomination) {
        errors.push(format!(
            "nomination: '{}' is not one of {}",
            submission.nomination,
            contest.nominations.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn valid_draft() -> ContestDraft {
        let submission = Utc.with_ymd_and_hms(2025, 2, 15, 23, 59, 59).unwrap();
        ContestDraft {
            name: "Ural Trail 2025".to_string(),
            description: "Annual nature photo contest".to_string(),
            nominations: vec!["Landscape".to_string(), "Fauna".to_string()],
            criteria: vec![
                Criterion::new("originality", "Originality"),
                Criterion::new("composition", "Composition"),
            ],
            submission_deadline: Some(submission),
            rating_deadline: Some(submission + Duration::days(14)),
            jury: vec![],
        }
    }

    #[test]
    fn test_valid_draft() {
        assert!(validate_contest(&valid_draft()).is_ok());
    }

    #[test]
    fn test_empty_draft_reports_every_required_field() {
        let errors = validate_contest(&ContestDraft::default()).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors[0].starts_with("name"));
        assert!(errors.iter().any(|e| e.starts_with("nominations")));
        assert!(errors.iter().any(|e| e.starts_with("criteria")));
        assert!(errors.iter().any(|e| e.starts_with("submission_deadline")));
        assert!(errors.iter().any(|e| e.starts_with("rating_deadline")));
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut draft = valid_draft();
        draft.name = "   ".to_string();
        let errors = validate_contest(&draft).unwrap_err();
        assert_eq!(errors, vec!["name: required".to_string()]);
    }

    #[test]
    fn test_duplicate_nomination_rejected() {
        let mut draft = valid_draft();
        draft.nominations.push("Fauna".to_string());
        let errors = validate_contest(&draft).unwrap_err();
        assert!(errors[0].contains("nominations[2]: duplicate 'Fauna'"));
    }

    #[test]
    fn test_duplicate_criterion_id_rejected() {
        let mut draft = valid_draft();
        draft.criteria.push(Criterion::new("originality", "Again"));
        let errors = validate_contest(&draft).unwrap_err();
        assert!(errors[0].contains("criteria[2].id"));
    }

    #[test]
    fn test_rating_deadline_before_submission_rejected() {
        let mut draft = valid_draft();
        draft.rating_deadline = draft.submission_deadline.map(|d| d - Duration::days(1));
        let errors = validate_contest(&draft).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("rating_deadline"));
    }

    #[test]
    fn test_draft_parses_from_yaml() {
        let yaml = r#"
name: Ural Trail 2025
nominations: [Landscape, Fauna]
criteria:
  - { id: originality, name: Originality }
submission_deadline: 2025-02-15T23:59:59Z
rating_deadline: 2025-03-01T23:59:59Z
"#;
        let draft: ContestDraft = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(draft.nominations.len(), 2);
        assert_eq!(draft.criteria[0].id, "originality");
        assert!(draft.description.is_empty());
        assert!(validate_contest(&draft).is_ok());
    }

    #[test]
    fn test_patch_keeps_untouched_fields() {
        let draft = valid_draft();
        let contest = Contest {
            id: "1".to_string(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            nominations: draft.nominations.clone(),
            criteria: draft.criteria.clone(),
            submission_deadline: draft.submission_deadline.unwrap(),
            rating_deadline: draft.rating_deadline.unwrap(),
            jury: vec!["jury-1".to_string()],
            admin_id: "user-1".to_string(),
        };
        let patch = ContestPatch {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let merged = patch.apply_to(&contest);
        assert_eq!(merged.name, "Renamed");
        assert_eq!(merged.nominations, contest.nominations);
        assert_eq!(merged.rating_deadline, Some(contest.rating_deadline));
        assert_eq!(merged.jury, vec!["jury-1".to_string()]);
    }

    #[test]
    fn test_submission_with_unknown_nomination() {
        let draft = valid_draft();
        let contest = Contest {
            id: "1".to_string(),
            name: draft.name,
            description: String::new(),
            nominations: draft.nominations,
            criteria: draft.criteria,
            submission_deadline: draft.submission_deadline.unwrap(),
            rating_deadline: draft.rating_deadline.unwrap(),
            jury: vec![],
            admin_id: "user-1".to_string(),
        };
        let submission = EntrySubmission {
            title: "Deer".to_string(),
            nomination: "Aerial".to_string(),
            url: "https://example.com/deer.jpg".to_string(),
            author: Author {
                full_name: "Elena K".to_string(),
                email: String::new(),
                phone: None,
            },
        };
        let errors = validate_submission(&contest, &submission).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], "author.email: required");
        assert!(errors[1].contains("'Aerial' is not one of Landscape, Fauna"));
    }
}
