pub mod ingest;
pub mod progress;

pub use ingest::{apply_rating, validate_criterion, validate_rating_value};
pub use progress::{first_unrated, next_unrated, JuryProgress};
