use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::storage::Snapshot;
use super::{ContestRepository, EntryRepository, UserRepository};
use crate::contest::{Contest, Entry, RatingSet, User};
use crate::error::{ContestError, Resource, Result};

/// Repository held entirely in memory, shareable between threads.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    /// Copy of the current state, e.g. for writing back to disk.
    pub fn snapshot(&self) -> Snapshot {
        self.read().clone()
    }

    // Poisoned locks are recovered; the state is plain data.
    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn find_entry_mut<'a>(
    state: &'a mut Snapshot,
    contest_id: &str,
    entry_id: &str,
) -> Result<&'a mut Entry> {
    state
        .entries
        .iter_mut()
        .find(|e| e.id == entry_id && e.contest_id == contest_id)
        .ok_or_else(|| ContestError::not_found(Resource::Entry, entry_id))
}

impl ContestRepository for MemoryStore {
    fn get_contest(&self, contest_id: &str) -> Result<Contest> {
        self.read()
            .contests
            .iter()
            .find(|c| c.id == contest_id)
            .cloned()
            .ok_or_else(|| ContestError::not_found(Resource::Contest, contest_id))
    }

    fn list_contests(&self) -> Result<Vec<Contest>> {
        Ok(self.read().contests.clone())
    }

    fn upsert_contest(&self, contest: Contest) -> Result<()> {
        let mut state = self.write();
        match state.contests.iter_mut().find(|c| c.id == contest.id) {
            Some(existing) => *existing = contest,
            None => state.contests.push(contest),
        }
        Ok(())
    }
}

impl EntryRepository for MemoryStore {
    fn get_entry(&self, contest_id: &str, entry_id: &str) -> Result<Entry> {
        self.read()
            .entries
            .iter()
            .find(|e| e.id == entry_id && e.contest_id == contest_id)
            .cloned()
            .ok_or_else(|| ContestError::not_found(Resource::Entry, entry_id))
    }

    fn list_entries(&self, contest_id: &str) -> Result<Vec<Entry>> {
        Ok(self
            .read()
            .entries
            .iter()
            .filter(|e| e.contest_id == contest_id)
            .cloned()
            .collect())
    }

    fn upsert_entry(&self, entry: Entry) -> Result<()> {
        let mut state = self.write();
        match state
            .entries
            .iter_mut()
            .find(|e| e.id == entry.id && e.contest_id == entry.contest_id)
        {
            Some(existing) => *existing = entry,
            None => state.entries.push(entry),
        }
        Ok(())
    }

    fn upsert_rating(
        &self,
        contest_id: &str,
        entry_id: &str,
        juror_id: &str,
        ratings: RatingSet,
    ) -> Result<()> {
        let mut state = self.write();
        let entry = find_entry_mut(&mut state, contest_id, entry_id)?;
        entry.ratings.insert(juror_id.to_string(), ratings);
        Ok(())
    }

    fn merge_rating(
        &self,
        contest_id: &str,
        entry_id: &str,
        juror_id: &str,
        criterion_id: &str,
        value: u8,
    ) -> Result<RatingSet> {
        // Read-modify-write under one write guard.
        let mut state = self.write();
        let entry = find_entry_mut(&mut state, contest_id, entry_id)?;
        let ratings = entry.ratings.entry(juror_id.to_string()).or_default();
        ratings.set(criterion_id, value);
        Ok(ratings.clone())
    }
}

impl UserRepository for MemoryStore {
    fn get_user(&self, user_id: &str) -> Result<User> {
        self.read()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| ContestError::not_found(Resource::User, user_id))
    }

    fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.read().users.clone())
    }

    fn upsert_user(&self, user: User) -> Result<()> {
        let mut state = self.write();
        match state.users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user,
            None => state.users.push(user),
        }
        Ok(())
    }
}
