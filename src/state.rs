//! Sync State Store
//!
//! Remembers, per source log file, the byte offset up to which it has been ingested. Loaded once
//! at the start of a run and written once at the end.

use crate::storage::{load_or_default, save_snapshot};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// `{"files": {<path>: <offset>}, "sessions": {}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncState {
    #[serde(default)]
    pub files: BTreeMap<String, u64>,
    /// Reserved; carried through untouched.
    #[serde(default)]
    pub sessions: BTreeMap<String, Value>,
}

impl SyncState {
    pub fn offset(&self, file: &str) -> u64 {
        self.files.get(file).copied().unwrap_or(0)
    }

    /// Record a new offset for `file`. Offsets never move backwards.
    pub fn advance(&mut self, file: &str, offset: u64) {
        let current = self.files.entry(file.to_string()).or_insert(0);
        if offset < *current {
            warn!(
                file,
                saved = *current,
                offered = offset,
                "Ignoring offset behind the saved one"
            );
            return;
        }
        *current = offset;
    }
}

pub struct SyncStateStore {
    path: PathBuf,
}

impl SyncStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> SyncState {
        let state: SyncState = load_or_default(&self.path);
        debug!(path = %self.path.display(), files = state.files.len(), "Loaded sync state");
        state
    }

    pub fn save(&self, state: &SyncState) -> Result<()> {
        save_snapshot(&self.path, state)?;
        debug!(path = %self.path.display(), files = state.files.len(), "Saved sync state");
        Ok(())
    }

    /// Forget every offset so the next run reads all files from the start.
    pub fn reset(&self) -> Result<SyncState> {
        let state = SyncState::default();
        self.save(&state)?;
        info!(path = %self.path.display(), "Reset sync state");
        Ok(state)
    }
}
