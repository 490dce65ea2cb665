//! Sync run orchestration
//!
//! One run: discover the native logs, read each from its saved offset, classify every new line,
//! then append the events, fold the usage into the aggregates and persist, in that order:
//!
//! 1. event partitions
//! 2. aggregate snapshot
//! 3. sync state
//!
//! A crash after step 1 or 2 but before step 3 leaves the old offsets in place, so the next run
//! re-reads those lines and counts them again. Nothing here deduplicates that case.

use crate::aggregates::{AggregateStore, Aggregates, UsageBucket};
use crate::classifier::Classifier;
use crate::config::Config;
use crate::file_discovery::FileDiscovery;
use crate::reader::LogTail;
use crate::sink::EventSink;
use crate::state::{SyncState, SyncStateStore};
use anyhow::Result;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Forget all offsets and clear previous output before syncing.
    pub reset: bool,
}

/// What one run did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub run_id: String,
    pub reset: bool,
    pub files_found: usize,
    pub files_with_events: usize,
    pub lines_read: usize,
    pub malformed_lines: usize,
    pub events_written: usize,
    pub events_by_date: BTreeMap<String, usize>,
    /// Usage folded into the aggregates by this run alone.
    pub usage: UsageBucket,
    pub duration_ms: u128,
}

pub struct SyncEngine {
    discovery: FileDiscovery,
    classifier: Classifier,
    sink: EventSink,
    state_store: SyncStateStore,
    aggregate_store: AggregateStore,
}

impl SyncEngine {
    pub fn new(
        discovery: FileDiscovery,
        classifier: Classifier,
        sink: EventSink,
        state_store: SyncStateStore,
        aggregate_store: AggregateStore,
    ) -> Self {
        Self {
            discovery,
            classifier,
            sink,
            state_store,
            aggregate_store,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let paths = &config.paths;
        Ok(Self::new(
            FileDiscovery::new(paths.projects_dir()),
            Classifier::new(config.pricing_table()?),
            EventSink::new(paths.events_dir()),
            SyncStateStore::new(paths.state_file()),
            AggregateStore::new(paths.aggregates_file()),
        ))
    }

    pub fn sink(&self) -> &EventSink {
        &self.sink
    }

    pub fn state_store(&self) -> &SyncStateStore {
        &self.state_store
    }

    pub fn aggregate_store(&self) -> &AggregateStore {
        &self.aggregate_store
    }

    /// Current cumulative totals, without syncing.
    pub fn stats(&self) -> Aggregates {
        self.aggregate_store.load()
    }

    pub fn run(&self, options: &SyncOptions) -> Result<SyncReport> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("sync_run", run_id = %run_id, reset = options.reset);
        let _enter = span.enter();
        let started = Instant::now();

        let (mut state, mut aggregates) = if options.reset {
            self.reset()?
        } else {
            (self.state_store.load(), self.aggregate_store.load())
        };

        let files = self.discovery.find_log_files()?;
        info!(
            files = files.len(),
            dir = %self.discovery.projects_dir().display(),
            "Found native log files"
        );

        let mut report = SyncReport {
            run_id,
            reset: options.reset,
            files_found: files.len(),
            ..SyncReport::default()
        };
        let mut events = Vec::new();
        let mut unknown_models = HashSet::new();

        for path in &files {
            let key = path.to_string_lossy();
            let mut tail = LogTail::open(path, state.offset(&key));
            let before = events.len();

            for line in tail.by_ref() {
                report.lines_read += 1;
                let Some(classified) = self.classifier.classify_line(&line) else {
                    report.malformed_lines += 1;
                    continue;
                };
                events.extend(classified.events);
                if let Some(record) = classified.usage {
                    if self.classifier.pricing().get(&record.model).is_none()
                        && unknown_models.insert(record.model.clone())
                    {
                        warn!(model = %record.model, "No pricing for model, using default tier");
                    }
                    aggregates.fold(&record);
                    report.usage.add(&record);
                }
            }

            let new_events = events.len() - before;
            if new_events > 0 {
                report.files_with_events += 1;
            }
            debug!(
                file = %path.display(),
                bytes = tail.bytes_read(),
                events = new_events,
                "Processed log file"
            );
            state.advance(&key, tail.offset());
        }

        report.events_written = events.len();
        report.events_by_date = self.sink.append(&events)?;
        self.aggregate_store.save(&aggregates)?;
        self.state_store.save(&state)?;

        report.duration_ms = started.elapsed().as_millis();
        info!(
            events = report.events_written,
            usage_records = report.usage.requests,
            malformed_lines = report.malformed_lines,
            duration_ms = report.duration_ms as u64,
            "Sync complete"
        );
        Ok(report)
    }

    /// State goes first so an interrupted reset still re-reads everything next time.
    fn reset(&self) -> Result<(SyncState, Aggregates)> {
        let state = self.state_store.reset()?;
        self.sink.clear()?;
        let aggregates = self.aggregate_store.reset()?;
        Ok((state, aggregates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn engine(root: &TempDir) -> SyncEngine {
        let data = root.path().join("data");
        SyncEngine::new(
            FileDiscovery::new(root.path().join("projects")),
            Classifier::default(),
            EventSink::new(data.join("logs")),
            SyncStateStore::new(data.join(".sync-state.json")),
            AggregateStore::new(data.join(".usage-aggregates.json")),
        )
    }

    #[test]
    fn test_empty_install_still_persists() {
        let root = TempDir::new().unwrap();
        let engine = engine(&root);
        let report = engine.run(&SyncOptions::default()).unwrap();
        assert_eq!(report.files_found, 0);
        assert_eq!(report.events_written, 0);
        assert!(engine.state_store().path().exists());
        assert!(engine.aggregate_store().path().exists());
    }

    #[test]
    fn test_unknown_model_priced_at_default() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("projects").join("-home-me-app");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("s.jsonl"),
            concat!(
                r#"{"type":"assistant","timestamp":"2025-01-15T10:00:00Z","cwd":"/home/me/app","message":{"model":"mystery-1","usage":{"input_tokens":1000000,"output_tokens":0}}}"#,
                "\n"
            ),
        )
        .unwrap();

        let engine = engine(&root);
        let report = engine.run(&SyncOptions::default()).unwrap();
        assert_eq!(report.usage.requests, 1);
        assert!((report.usage.cost - 3.0).abs() < 1e-9);
        assert_eq!(engine.stats().by_model["mystery-1"].input, 1_000_000);
    }
}
