//! Claude Code Native Log Sync
//!
//! Incrementally ingests the session logs Claude Code appends under `~/.claude/projects/` and
//! turns them into two durable outputs: a per-date activity journal (one JSON line per event)
//! and cumulative token and cost aggregates. Every log file is read from the byte offset the
//! previous run stopped at, so a run only ever does work proportional to what was appended.
//!
//! ## Architecture Overview
//!
//! - [`file_discovery`] - finds the native `*.jsonl` logs
//! - [`reader`] - resumes a log at a byte offset and yields complete lines
//! - [`classifier`] - maps one log entry to activity events and an optional usage record
//! - [`pricing`] / [`cost`] - per-model prices and the cost of one turn
//! - [`sink`] - appends events to `YYYY-MM-DD.jsonl` partitions
//! - [`aggregates`] - cumulative totals by date, model and project
//! - [`state`] - per-file offsets between runs
//! - [`sync`] - one end-to-end run
//! - [`config`] / [`logging`] / [`display`] - ambient plumbing for the `cc-sync` binary
//!
//! ## Example
//!
//! ```no_run
//! use cc_sync::{config::Config, SyncEngine, SyncOptions};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::load(None)?;
//! let engine = SyncEngine::from_config(&config)?;
//! let report = engine.run(&SyncOptions::default())?;
//! println!("{} new events", report.events_written);
//! # Ok(())
//! # }
//! ```

pub mod aggregates;
pub mod classifier;
pub mod config;
pub mod cost;
pub mod display;
pub mod file_discovery;
pub mod logging;
pub mod models;
pub mod pricing;
pub mod reader;
pub mod sink;
pub mod state;
pub mod storage;
pub mod sync;
pub mod timestamp_parser;

pub use aggregates::{AggregateStore, Aggregates};
pub use classifier::Classifier;
pub use models::*;
pub use pricing::{ModelPricing, PricingTable};
pub use sync::{SyncEngine, SyncOptions, SyncReport};
