use crate::contest::{Criterion, Entry, RatingSet};

#[derive(Debug, Clone, PartialEq)]
pub struct JurorContribution {
    pub juror_id: String,
    /// Sum of the juror's values.
    pub total: u32,
    /// How many criteria the juror filled.
    pub criteria_rated: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub jurors: Vec<JurorContribution>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub score: f64,
    /// At least one contributing juror left criteria unrated.
    pub incomplete: bool,
    pub breakdown: ScoreBreakdown,
}

/// Sum of every value in one juror's rating-set.
pub fn juror_total(ratings: &RatingSet) -> u32 {
    ratings.total()
}

/// Aggregate score of an entry: the mean, over jurors who rated anything, of
/// each juror's summed values. Zero when nobody rated.
///
/// The sum is not divided by the number of criteria, so entries of contests
/// with different criteria counts are not on the same scale. This matches how
/// results have always been computed and is kept on purpose.
pub fn compute_score(entry: &Entry) -> f64 {
    let (sum, count) = entry
        .ratings
        .values()
        .filter(|r| !r.is_empty())
        .fold((0u64, 0u32), |(sum, count), r| {
            (sum + u64::from(juror_total(r)), count + 1)
        });

    if count == 0 {
        0.0
    } else {
        sum as f64 / f64::from(count)
    }
}

/// Score an entry and explain where the number came from.
pub fn calculate_score(entry: &Entry, criteria: &[Criterion]) -> ScoreResult {
    let mut jurors = Vec::new();
    let mut incomplete = false;

    for (juror_id, ratings) in &entry.ratings {
        if ratings.is_empty() {
            continue;
        }
        if !ratings.is_complete(criteria) {
            incomplete = true;
        }
        jurors.push(JurorContribution {
            juror_id: juror_id.clone(),
            total: juror_total(ratings),
            criteria_rated: ratings.len(),
        });
    }

    ScoreResult {
        score: compute_score(entry),
        incomplete,
        breakdown: ScoreBreakdown { jurors },
    }
}
