use chrono::{DateTime, Utc};

use super::types::Contest;

/// Deadline-derived state of a contest. Recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContestStatus {
    pub submission_open: bool,
    pub rating_open: bool,
    pub finished: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Participants can still submit entries.
    Submission,
    /// Submissions closed, jury still rating.
    RatingOnly,
    Finished,
}

impl ContestStatus {
    pub fn phase(&self) -> Phase {
        if self.finished {
            Phase::Finished
        } else if self.submission_open {
            Phase::Submission
        } else {
            Phase::RatingOnly
        }
    }
}

pub fn contest_status(contest: &Contest, now: DateTime<Utc>) -> ContestStatus {
    let rating_open = now < contest.rating_deadline;
    ContestStatus {
        submission_open: now < contest.submission_deadline,
        rating_open,
        finished: !rating_open,
    }
}
