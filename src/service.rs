use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

use crate::contest::{
    contest_status, validate_contest, validate_submission, Contest, ContestDraft, ContestPatch,
    ContestStatus, Criterion, Entry, EntrySubmission, RatingSet, User,
};
use crate::error::{ContestError, Resource, Result};
use crate::rating::{
    first_unrated, next_unrated, validate_criterion, validate_rating_value, JuryProgress,
};
use crate::scoring::{filter_nomination, rank_entries, RankedEntry};
use crate::store::Repository;

/// An entry as a juror sees it: no author details, plus the juror's own rating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JuryEntry {
    pub id: String,
    pub title: String,
    pub url: String,
    pub nomination: String,
    pub my_ratings: Option<RatingSet>,
}

/// An entry the juror has rated, with the juror's average per declared criterion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: String,
    pub title: String,
    pub url: String,
    pub nomination: String,
    pub my_ratings: RatingSet,
    /// Sum of the juror's values over the number of declared criteria.
    pub average: f64,
}

impl HistoryEntry {
    fn new(entry: Entry, my_ratings: RatingSet, criteria: &[Criterion]) -> Self {
        let average = if criteria.is_empty() {
            0.0
        } else {
            f64::from(my_ratings.total()) / criteria.len() as f64
        };
        Self {
            id: entry.id,
            title: entry.title,
            url: entry.url,
            nomination: entry.nomination,
            my_ratings,
            average,
        }
    }
}

/// Dashboard line for a contest.
#[derive(Debug, Clone, PartialEq)]
pub struct ContestSummary {
    pub contest: Contest,
    pub status: ContestStatus,
    pub total_entries: usize,
    /// Entries with at least one value from any juror.
    pub rated_entries: usize,
}

impl ContestSummary {
    pub fn jury_size(&self) -> usize {
        self.contest.jury.len()
    }

    pub fn is_active(&self) -> bool {
        !self.status.finished
    }
}

/// Contest data needed to rank it. Ranking borrows from here.
#[derive(Debug, Clone)]
pub struct ContestResults {
    pub contest: Contest,
    pub entries: Vec<Entry>,
}

impl ContestResults {
    pub fn ranked(&self, nomination: Option<&str>) -> Vec<RankedEntry<'_>> {
        filter_nomination(rank_entries(&self.contest, &self.entries), nomination)
    }
}

pub struct ContestService<R> {
    repo: R,
}

impl<R: Repository> ContestService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn contest(&self, contest_id: &str) -> Result<Contest> {
        self.repo.get_contest(contest_id)
    }

    pub fn status(&self, contest_id: &str, now: DateTime<Utc>) -> Result<ContestStatus> {
        let contest = self.repo.get_contest(contest_id)?;
        Ok(contest_status(&contest, now))
    }

    pub fn entries(&self, contest_id: &str) -> Result<Vec<Entry>> {
        self.repo.get_contest(contest_id)?;
        self.repo.list_entries(contest_id)
    }

    pub fn results(&self, contest_id: &str) -> Result<ContestResults> {
        let contest = self.repo.get_contest(contest_id)?;
        let entries = self.repo.list_entries(contest_id)?;
        Ok(ContestResults { contest, entries })
    }

    /// Record one criterion value from a juror and return the juror's merged
    /// rating-set for the entry.
    pub fn record_rating(
        &self,
        acting_juror_id: &str,
        contest_id: &str,
        entry_id: &str,
        criterion_id: &str,
        value: i64,
    ) -> Result<RatingSet> {
        let contest = self.repo.get_contest(contest_id)?;
        self.repo.get_user(acting_juror_id)?;
        self.repo.get_entry(contest_id, entry_id)?;
        validate_criterion(&contest, criterion_id)?;
        let value = validate_rating_value(value)?;

        let ratings = self
            .repo
            .merge_rating(contest_id, entry_id, acting_juror_id, criterion_id, value)?;

        tracing::info!(
            contest_id,
            entry_id,
            juror_id = acting_juror_id,
            criterion_id,
            value,
            complete = ratings.is_complete(&contest.criteria),
            "rating recorded"
        );
        Ok(ratings)
    }

    pub fn jury_entries(&self, contest_id: &str, juror_id: &str) -> Result<Vec<JuryEntry>> {
        Ok(self
            .entries(contest_id)?
            .into_iter()
            .map(|e| JuryEntry {
                my_ratings: e.ratings.get(juror_id).cloned(),
                id: e.id,
                title: e.title,
                url: e.url,
                nomination: e.nomination,
            })
            .collect())
    }

    /// Entries the juror has put at least one value on, in submission order.
    pub fn jury_history(&self, contest_id: &str, juror_id: &str) -> Result<Vec<HistoryEntry>> {
        let contest = self.repo.get_contest(contest_id)?;
        let entries = self.repo.list_entries(contest_id)?;
        Ok(entries
            .into_iter()
            .filter_map(|mut e| {
                let mine = e.ratings.remove(juror_id).filter(|r| !r.is_empty())?;
                Some(HistoryEntry::new(e, mine, &contest.criteria))
            })
            .collect())
    }

    pub fn jury_progress(&self, contest_id: &str, juror_id: &str) -> Result<JuryProgress> {
        let contest = self.repo.get_contest(contest_id)?;
        let entries = self.repo.list_entries(contest_id)?;
        Ok(JuryProgress::of(&entries, &contest.criteria, juror_id))
    }

    /// Entry a juror should rate next. With `after_entry_id`, only entries
    /// after that one are considered; otherwise the search starts at the top.
    pub fn next_for_juror(
        &self,
        contest_id: &str,
        juror_id: &str,
        after_entry_id: Option<&str>,
    ) -> Result<Option<Entry>> {
        let contest = self.repo.get_contest(contest_id)?;
        let mut entries = self.repo.list_entries(contest_id)?;

        let index = match after_entry_id {
            None => first_unrated(&entries, &contest.criteria, juror_id),
            Some(after) => {
                let position = entries
                    .iter()
                    .position(|e| e.id == after)
                    .ok_or_else(|| ContestError::not_found(Resource::Entry, after))?;
                next_unrated(&entries, &contest.criteria, juror_id, position)
            }
        };

        Ok(index.map(|i| entries.swap_remove(i)))
    }

    pub fn create_contest(&self, acting_user_id: &str, draft: ContestDraft) -> Result<Contest> {
        self.repo.get_user(acting_user_id)?;

        let mut errors = validate_contest(&draft).err().unwrap_or_default();
        errors.extend(self.unknown_jurors(&draft.jury)?);
        if !errors.is_empty() {
            return Err(ContestError::ValidationFailed(errors));
        }

        let (Some(submission_deadline), Some(rating_deadline)) =
            (draft.submission_deadline, draft.rating_deadline)
        else {
            return Err(ContestError::ValidationFailed(vec![
                "deadlines: both deadlines are required".to_string(),
            ]));
        };

        let contest = Contest {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name,
            description: draft.description,
            nominations: draft.nominations,
            criteria: draft.criteria,
            submission_deadline,
            rating_deadline,
            jury: draft.jury,
            admin_id: acting_user_id.to_string(),
        };
        self.repo.upsert_contest(contest.clone())?;

        tracing::info!(contest_id = %contest.id, admin_id = acting_user_id, "contest created");
        Ok(contest)
    }

    pub fn update_contest(
        &self,
        acting_user_id: &str,
        contest_id: &str,
        patch: ContestPatch,
    ) -> Result<Contest> {
        self.repo.get_user(acting_user_id)?;
        let existing = self.repo.get_contest(contest_id)?;
        let draft = patch.apply_to(&existing);

        let mut errors = validate_contest(&draft).err().unwrap_or_default();
        let entries = self.repo.list_entries(contest_id)?;
        errors.extend(removed_in_use(&draft, &entries));
        if !errors.is_empty() {
            return Err(ContestError::ValidationFailed(errors));
        }

        let contest = Contest {
            id: existing.id,
            name: draft.name,
            description: draft.description,
            nominations: draft.nominations,
            criteria: draft.criteria,
            submission_deadline: draft
                .submission_deadline
                .unwrap_or(existing.submission_deadline),
            rating_deadline: draft.rating_deadline.unwrap_or(existing.rating_deadline),
            jury: existing.jury,
            admin_id: existing.admin_id,
        };
        self.repo.upsert_contest(contest.clone())?;

        tracing::info!(contest_id, acting_user_id, "contest updated");
        Ok(contest)
    }

    pub fn add_jury_member(
        &self,
        acting_user_id: &str,
        contest_id: &str,
        user_id: &str,
    ) -> Result<Contest> {
        self.repo.get_user(acting_user_id)?;
        let mut contest = self.repo.get_contest(contest_id)?;
        self.repo.get_user(user_id)?;

        if !contest.is_jury_member(user_id) {
            contest.jury.push(user_id.to_string());
            self.repo.upsert_contest(contest.clone())?;
            tracing::info!(contest_id, user_id, acting_user_id, "jury member added");
        }
        Ok(contest)
    }

    pub fn remove_jury_member(
        &self,
        acting_user_id: &str,
        contest_id: &str,
        user_id: &str,
    ) -> Result<Contest> {
        self.repo.get_user(acting_user_id)?;
        let mut contest = self.repo.get_contest(contest_id)?;

        let before = contest.jury.len();
        contest.jury.retain(|j| j != user_id);
        if contest.jury.len() != before {
            self.repo.upsert_contest(contest.clone())?;
            tracing::info!(contest_id, user_id, acting_user_id, "jury member removed");
        }
        Ok(contest)
    }

    /// Accept a participant's entry while submissions are open.
    pub fn submit_entry(
        &self,
        contest_id: &str,
        submission: EntrySubmission,
        now: DateTime<Utc>,
    ) -> Result<Entry> {
        let contest = self.repo.get_contest(contest_id)?;

        let mut errors = Vec::new();
        if !contest_status(&contest, now).submission_open {
            errors.push("submission deadline has passed".to_string());
        }
        if let Err(problems) = validate_submission(&contest, &submission) {
            errors.extend(problems);
        }
        if !errors.is_empty() {
            return Err(ContestError::ValidationFailed(errors));
        }

        let entry = Entry {
            id: uuid::Uuid::new_v4().to_string(),
            contest_id: contest.id,
            title: submission.title,
            nomination: submission.nomination,
            url: submission.url,
            author: Some(submission.author),
            ratings: Default::default(),
        };
        self.repo.upsert_entry(entry.clone())?;

        tracing::info!(contest_id, entry_id = %entry.id, "entry submitted");
        Ok(entry)
    }

    /// Register a user. Ids are unique; name and email are required.
    pub fn add_user(&self, user: User) -> Result<User> {
        let mut errors = Vec::new();
        if user.id.trim().is_empty() {
            errors.push("id: required".to_string());
        } else {
            match self.repo.get_user(&user.id) {
                Ok(_) => errors.push(format!("id: '{}' is already taken", user.id)),
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
        }
        if user.name.trim().is_empty() {
            errors.push("name: required".to_string());
        }
        if !user.email.contains('@') {
            errors.push(format!("email: '{}' is not an email address", user.email));
        }
        if !errors.is_empty() {
            return Err(ContestError::ValidationFailed(errors));
        }

        self.repo.upsert_user(user.clone())?;
        tracing::info!(user_id = %user.id, role = ?user.role, "user added");
        Ok(user)
    }

    /// Entry counts and status for each contest, keeping the input order.
    pub fn contest_summaries(
        &self,
        contests: Vec<Contest>,
        now: DateTime<Utc>,
    ) -> Result<Vec<ContestSummary>> {
        contests
            .into_iter()
            .map(|contest| {
                let entries = self.repo.list_entries(&contest.id)?;
                let rated_entries = entries
                    .iter()
                    .filter(|e| e.ratings.values().any(|r| !r.is_empty()))
                    .count();
                Ok(ContestSummary {
                    status: contest_status(&contest, now),
                    total_entries: entries.len(),
                    rated_entries,
                    contest,
                })
            })
            .collect()
    }

    fn unknown_jurors(&self, jury: &[String]) -> Result<Vec<String>> {
        let mut unknown = Vec::new();
        for user_id in jury {
            match self.repo.get_user(user_id) {
                Ok(_) => {}
                Err(e) if e.is_not_found() => {
                    unknown.push(format!("jury: unknown user '{}'", user_id));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(unknown)
    }

    pub fn admin_contests(&self, user_id: &str) -> Result<Vec<Contest>> {
        Ok(self
            .repo
            .list_contests()?
            .into_iter()
            .filter(|c| c.admin_id == user_id)
            .collect())
    }

    pub fn jury_contests(&self, user_id: &str) -> Result<Vec<Contest>> {
        Ok(self
            .repo
            .list_contests()?
            .into_iter()
            .filter(|c| c.is_jury_member(user_id))
            .collect())
    }

    /// Case-insensitive match on name or email.
    pub fn search_users(&self, query: &str) -> Result<Vec<User>> {
        let query = query.to_lowercase();
        Ok(self
            .repo
            .list_users()?
            .into_iter()
            .filter(|u| {
                u.email.to_lowercase().contains(&query) || u.name.to_lowercase().contains(&query)
            })
            .collect())
    }
}

/// Nominations and criteria a patch drops while entries still depend on them.
fn removed_in_use(draft: &ContestDraft, entries: &[Entry]) -> Vec<String> {
    let nominations: HashSet<&str> = draft.nominations.iter().map(String::as_str).collect();
    let criteria: HashSet<&str> = draft.criteria.iter().map(|c| c.id.as_str()).collect();

    let mut used_nominations: Vec<&str> = Vec::new();
    let mut rated_criteria: Vec<&str> = Vec::new();
    for entry in entries {
        let nomination = entry.nomination.as_str();
        if !nominations.contains(nomination) && !used_nominations.contains(&nomination) {
            used_nominations.push(nomination);
        }
        for ratings in entry.ratings.values() {
            for criterion in ratings.criterion_ids() {
                if !criteria.contains(criterion) && !rated_criteria.contains(&criterion) {
                    rated_criteria.push(criterion);
                }
            }
        }
    }

    used_nominations
        .into_iter()
        .map(|n| format!("nominations: '{}' is still used by entries", n))
        .chain(
            rated_criteria
                .into_iter()
                .map(|c| format!("criteria: '{}' already has ratings", c)),
        )
        .collect()
}
