pub mod config;
pub mod contest;
pub mod error;
pub mod logging;
pub mod output;
pub mod rating;
pub mod scoring;
pub mod service;
pub mod store;

pub use error::{ContestError, Resource, Result};
pub use service::{ContestResults, ContestService, ContestSummary, HistoryEntry, JuryEntry};
