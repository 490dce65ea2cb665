//! Event Sink
//!
//! Appends classified events to one newline-delimited JSON file per date (`YYYY-MM-DD.jsonl`).
//! Existing lines are never rewritten or deduplicated. Appends are not transactional across dates.

use crate::models::ActivityEvent;
use anyhow::{Context, Result};
use glob::{glob, Pattern};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

const PARTITION_GLOB: &str = "[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9].jsonl";

pub struct EventSink {
    dir: PathBuf,
}

impl EventSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn partition_path(&self, date: &str) -> PathBuf {
        self.dir.join(format!("{}.jsonl", date))
    }

    /// Append `events` to their date partitions. Returns how many lines each date received.
    pub fn append(&self, events: &[ActivityEvent]) -> Result<BTreeMap<String, usize>> {
        let mut by_date: BTreeMap<&str, Vec<&ActivityEvent>> = BTreeMap::new();
        for event in events {
            by_date.entry(event.date.as_str()).or_default().push(event);
        }
        if by_date.is_empty() {
            return Ok(BTreeMap::new());
        }

        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create events directory: {}", self.dir.display()))?;

        let mut written = BTreeMap::new();
        for (date, date_events) in by_date {
            let path = self.partition_path(date);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open partition: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            for event in &date_events {
                serde_json::to_writer(&mut writer, event)
                    .with_context(|| format!("Failed to encode event for {}", date))?;
                writer.write_all(b"\n")?;
            }
            writer
                .flush()
                .with_context(|| format!("Failed to write partition: {}", path.display()))?;
            debug!(date, events = date_events.len(), "Appended events");
            written.insert(date.to_string(), date_events.len());
        }
        Ok(written)
    }

    /// All existing date partitions, sorted by date.
    pub fn partitions(&self) -> Result<Vec<PathBuf>> {
        let pattern = format!(
            "{}/{}",
            Pattern::escape(&self.dir.to_string_lossy()),
            PARTITION_GLOB
        );
        let mut paths: Vec<PathBuf> = glob(&pattern)
            .with_context(|| format!("Invalid partition pattern: {}", pattern))?
            .flatten()
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// Delete every date partition. Returns how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let partitions = self.partitions()?;
        for path in &partitions {
            fs::remove_file(path)
                .with_context(|| format!("Failed to remove partition: {}", path.display()))?;
        }
        info!(dir = %self.dir.display(), removed = partitions.len(), "Cleared event partitions");
        Ok(partitions.len())
    }

    /// Read one date's events back, skipping lines that do not decode.
    pub fn read_date(&self, date: &str) -> Result<Vec<ActivityEvent>> {
        let path = self.partition_path(date);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file =
            File::open(&path).with_context(|| format!("Failed to open partition: {}", path.display()))?;
        let mut events = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ActivityEvent>(&line) {
                Ok(mut event) => {
                    event.date = date.to_string();
                    events.push(event);
                }
                Err(err) => trace!(date, error = %err, "Skipping undecodable event line"),
            }
        }
        Ok(events)
    }
}
