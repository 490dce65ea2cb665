use anyhow::{Context, Result};
use glob::{glob, Pattern};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Finds the native session logs under a Claude `projects/` directory.
pub struct FileDiscovery {
    projects_dir: PathBuf,
}

impl FileDiscovery {
    /// A relative `projects_dir` is resolved against the current directory here, so discovered
    /// paths (and the sync state keyed by them) are always absolute.
    pub fn new(projects_dir: impl Into<PathBuf>) -> Self {
        let projects_dir = projects_dir.into();
        let projects_dir = match std::path::absolute(&projects_dir) {
            Ok(absolute) => absolute,
            Err(err) => {
                warn!(dir = %projects_dir.display(), error = %err, "Cannot resolve projects directory");
                projects_dir
            }
        };
        Self { projects_dir }
    }

    pub fn projects_dir(&self) -> &Path {
        &self.projects_dir
    }

    /// Every `*.jsonl` file at any depth, sorted by path. A missing directory yields nothing.
    pub fn find_log_files(&self) -> Result<Vec<PathBuf>> {
        if !self.projects_dir.is_dir() {
            debug!(dir = %self.projects_dir.display(), "Projects directory not found");
            return Ok(Vec::new());
        }

        let pattern = format!(
            "{}/**/*.jsonl",
            Pattern::escape(&self.projects_dir.to_string_lossy())
        );
        let mut files = Vec::new();
        for entry in glob(&pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))? {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(err) => warn!(error = %err, "Skipping unreadable path"),
            }
        }
        files.sort();
        debug!(dir = %self.projects_dir.display(), files = files.len(), "Discovered log files");
        Ok(files)
    }
}
