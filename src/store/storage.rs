use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::contest::{Contest, Entry, User};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Serialized repository state. Entry order is submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub contests: Vec<Contest>,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshot {
    pub fn new() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            users: Vec::new(),
            contests: Vec::new(),
            entries: Vec::new(),
        }
    }
}

/// Get the default data file path (~/.config/photo-jury/contests.json)
pub fn get_data_path() -> PathBuf {
    crate::config::get_config_dir().join("contests.json")
}

/// Load a snapshot from a JSON file
///
/// If the file doesn't exist, returns an empty snapshot.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no data file, starting empty");
        return Ok(Snapshot::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open data file at {}", path.display()))?;

    let snapshot: Snapshot = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse data file at {}", path.display()))?;

    if snapshot.version != SNAPSHOT_VERSION {
        anyhow::bail!("Unsupported data file version: {}", snapshot.version);
    }

    tracing::debug!(
        contests = snapshot.contests.len(),
        entries = snapshot.entries.len(),
        users = snapshot.users.len(),
        "loaded data file"
    );
    Ok(snapshot)
}

/// Save a snapshot to a JSON file atomically
///
/// The file is either fully replaced or left untouched.
pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, snapshot).context("Failed to serialize data")?;

    file.commit()
        .with_context(|| format!("Failed to save data file at {}", path.display()))?;

    tracing::debug!(path = %path.display(), "saved data file");
    Ok(())
}
