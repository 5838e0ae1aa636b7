pub mod memory;
pub mod storage;

pub use memory::MemoryStore;
pub use storage::{get_data_path, load_snapshot, save_snapshot, Snapshot};

use crate::contest::{Contest, Entry, RatingSet, User};
use crate::error::Result;

pub trait ContestRepository {
    fn get_contest(&self, contest_id: &str) -> Result<Contest>;
    fn list_contests(&self) -> Result<Vec<Contest>>;
    fn upsert_contest(&self, contest: Contest) -> Result<()>;
}

pub trait EntryRepository {
    /// Fails with `NotFound` when the entry is missing or belongs to another contest.
    fn get_entry(&self, contest_id: &str, entry_id: &str) -> Result<Entry>;
    /// Entries of a contest in submission order.
    fn list_entries(&self, contest_id: &str) -> Result<Vec<Entry>>;
    fn upsert_entry(&self, entry: Entry) -> Result<()>;
    /// Replace a juror's whole rating-set on an entry.
    fn upsert_rating(
        &self,
        contest_id: &str,
        entry_id: &str,
        juror_id: &str,
        ratings: RatingSet,
    ) -> Result<()>;
    /// Set one criterion in a juror's rating-set and return the merged set.
    ///
    /// Implementations must serialize concurrent merges on the same
    /// (juror, entry) pair.
    fn merge_rating(
        &self,
        contest_id: &str,
        entry_id: &str,
        juror_id: &str,
        criterion_id: &str,
        value: u8,
    ) -> Result<RatingSet>;
}

pub trait UserRepository {
    fn get_user(&self, user_id: &str) -> Result<User>;
    fn list_users(&self) -> Result<Vec<User>>;
    fn upsert_user(&self, user: User) -> Result<()>;
}

/// Everything the contest service needs from storage.
pub trait Repository: ContestRepository + EntryRepository + UserRepository {}

impl<T: ContestRepository + EntryRepository + UserRepository> Repository for T {}
