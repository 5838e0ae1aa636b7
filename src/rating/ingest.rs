use crate::contest::{Contest, RatingSet, MAX_RATING, MIN_RATING};
use crate::error::{ContestError, Result};

/// Check that a raw value is a valid rating.
pub fn validate_rating_value(value: i64) -> Result<u8> {
    if (i64::from(MIN_RATING)..=i64::from(MAX_RATING)).contains(&value) {
        Ok(value as u8)
    } else {
        Err(ContestError::OutOfRange(value))
    }
}

/// Check that the contest declares `criterion_id`.
pub fn validate_criterion(contest: &Contest, criterion_id: &str) -> Result<()> {
    if contest.criterion(criterion_id).is_some() {
        Ok(())
    } else {
        Err(ContestError::InvalidCriterion {
            contest_id: contest.id.clone(),
            criterion_id: criterion_id.to_string(),
        })
    }
}

/// Upsert one criterion value into a rating-set.
///
/// Other criteria already in `ratings` are left as they are. Nothing is
/// written when validation fails.
pub fn apply_rating(
    contest: &Contest,
    ratings: &mut RatingSet,
    criterion_id: &str,
    value: i64,
) -> Result<()> {
    validate_criterion(contest, criterion_id)?;
    let value = validate_rating_value(value)?;
    ratings.set(criterion_id, value);
    Ok(())
}
