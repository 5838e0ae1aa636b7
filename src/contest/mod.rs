pub mod status;
pub mod types;
pub mod validation;

pub use status::{contest_status, ContestStatus, Phase};
pub use types::*;
pub use validation::{
    validate_contest, validate_submission, ContestDraft, ContestPatch, EntrySubmission,
};
