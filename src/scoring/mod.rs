pub mod engine;
pub mod ranking;

pub use engine::{
    calculate_score, compute_score, juror_total, JurorContribution, ScoreBreakdown, ScoreResult,
};
pub use ranking::{filter_nomination, rank_entries, RankedEntry};
