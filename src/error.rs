use std::fmt;

use thiserror::Error;

/// Kind of record a lookup failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Contest,
    Entry,
    User,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Contest => f.write_str("contest"),
            Resource::Entry => f.write_str("entry"),
            Resource::User => f.write_str("user"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContestError {
    #[error("{resource} not found: {id}")]
    NotFound { resource: Resource, id: String },

    #[error("criterion '{criterion_id}' is not declared by contest {contest_id}")]
    InvalidCriterion {
        contest_id: String,
        criterion_id: String,
    },

    #[error("rating value {0} is outside the 1-10 range")]
    OutOfRange(i64),

    #[error("validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),
}

pub type Result<T> = std::result::Result<T, ContestError>;

impl ContestError {
    pub fn not_found(resource: Resource, id: impl Into<String>) -> Self {
        ContestError::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ContestError::NotFound { .. })
    }
}
