//! Aggregate Store
//!
//! Cumulative token and cost counters kept four ways: one global total plus a bucket per date,
//! per model and per project. Buckets only ever grow, by folding in [`TokenUsageRecord`]s, so the
//! global total always equals the sum of any one breakdown.
//!
//! Persisted as a single JSON snapshot:
//!
//! ```json
//! {
//!   "total_tokens": {"input": 0, "output": 0, "cache_read": 0, "cache_write": 0},
//!   "total_cost": 0.0,
//!   "total_cost_without_cache": 0.0,
//!   "total_cache_savings": 0.0,
//!   "total_requests": 0,
//!   "by_date": {"2025-01-15": {"input": 0, "output": 0, "cost": 0.0, "...": "..."}},
//!   "by_model": {},
//!   "by_project": {}
//! }
//! ```

use crate::models::TokenUsageRecord;
use crate::storage::{load_or_default, save_snapshot};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTotals {
    #[serde(default)]
    pub input: u64,
    #[serde(default)]
    pub output: u64,
    #[serde(default)]
    pub cache_read: u64,
    #[serde(default)]
    pub cache_write: u64,
}

impl TokenTotals {
    pub fn total(&self) -> u64 {
        self.input + self.output + self.cache_read + self.cache_write
    }
}

/// One breakdown bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageBucket {
    pub input: u64,
    pub output: u64,
    pub cache_read: u64,
    pub cache_write: u64,
    pub cost: f64,
    pub cost_without_cache: f64,
    pub cache_savings: f64,
    pub requests: u64,
}

impl UsageBucket {
    pub fn add(&mut self, record: &TokenUsageRecord) {
        self.input += record.input_tokens;
        self.output += record.output_tokens;
        self.cache_read += record.cache_read_tokens;
        self.cache_write += record.cache_write_tokens;
        self.cost += record.cost.actual;
        self.cost_without_cache += record.cost.without_cache;
        self.cache_savings += record.cost.savings;
        self.requests += 1;
    }

    pub fn tokens(&self) -> TokenTotals {
        TokenTotals {
            input: self.input,
            output: self.output,
            cache_read: self.cache_read,
            cache_write: self.cache_write,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Aggregates {
    pub total_tokens: TokenTotals,
    pub total_cost: f64,
    pub total_cost_without_cache: f64,
    pub total_cache_savings: f64,
    pub total_requests: u64,
    pub by_date: BTreeMap<String, UsageBucket>,
    pub by_model: BTreeMap<String, UsageBucket>,
    pub by_project: BTreeMap<String, UsageBucket>,
}

impl Aggregates {
    /// Fold one usage record into the global total and all three breakdowns.
    pub fn fold(&mut self, record: &TokenUsageRecord) {
        self.total_tokens.input += record.input_tokens;
        self.total_tokens.output += record.output_tokens;
        self.total_tokens.cache_read += record.cache_read_tokens;
        self.total_tokens.cache_write += record.cache_write_tokens;
        self.total_cost += record.cost.actual;
        self.total_cost_without_cache += record.cost.without_cache;
        self.total_cache_savings += record.cost.savings;
        self.total_requests += 1;

        self.by_date
            .entry(record.date.clone())
            .or_default()
            .add(record);
        self.by_model
            .entry(record.model.clone())
            .or_default()
            .add(record);
        self.by_project
            .entry(record.project.clone())
            .or_default()
            .add(record);
    }

    pub fn fold_all<'a>(&mut self, records: impl IntoIterator<Item = &'a TokenUsageRecord>) {
        for record in records {
            self.fold(record);
        }
    }

    /// The global counters as a bucket.
    pub fn totals(&self) -> UsageBucket {
        UsageBucket {
            input: self.total_tokens.input,
            output: self.total_tokens.output,
            cache_read: self.total_tokens.cache_read,
            cache_write: self.total_tokens.cache_write,
            cost: self.total_cost,
            cost_without_cache: self.total_cost_without_cache,
            cache_savings: self.total_cache_savings,
            requests: self.total_requests,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_requests == 0
    }
}

pub struct AggregateStore {
    path: PathBuf,
}

impl AggregateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Aggregates {
        let aggregates: Aggregates = load_or_default(&self.path);
        debug!(
            path = %self.path.display(),
            requests = aggregates.total_requests,
            "Loaded usage aggregates"
        );
        aggregates
    }

    pub fn save(&self, aggregates: &Aggregates) -> Result<()> {
        save_snapshot(&self.path, aggregates)
    }

    /// Zero every counter.
    pub fn reset(&self) -> Result<Aggregates> {
        let aggregates = Aggregates::default();
        self.save(&aggregates)?;
        info!(path = %self.path.display(), "Reset usage aggregates");
        Ok(aggregates)
    }
}
