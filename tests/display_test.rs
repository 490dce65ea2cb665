//! Tests for the display module
//!
//! Renderings are checked with colors disabled so assertions see plain text.

use cc_sync::aggregates::{Aggregates, UsageBucket};
use cc_sync::display::DisplayManager;
use cc_sync::models::{CostBreakdown, TokenUsageRecord};
use cc_sync::sync::SyncReport;
use std::collections::BTreeMap;
use std::path::Path;

fn plain() {
    colored::control::set_override(false);
}

fn record(date: &str, model: &str, project: &str, cost: f64) -> TokenUsageRecord {
    TokenUsageRecord {
        date: date.to_string(),
        project: project.to_string(),
        model: model.to_string(),
        input_tokens: 1000,
        output_tokens: 500,
        cache_read_tokens: 0,
        cache_write_tokens: 0,
        cost: CostBreakdown {
            actual: cost,
            without_cache: cost,
            savings: 0.0,
        },
    }
}

fn create_test_report() -> SyncReport {
    let mut events_by_date = BTreeMap::new();
    events_by_date.insert("2025-01-15".to_string(), 3);
    events_by_date.insert("2025-01-16".to_string(), 1);
    let mut usage = UsageBucket::default();
    usage.add(&record("2025-01-15", "claude-sonnet-4-20250514", "app", 0.0105));
    SyncReport {
        run_id: "run".to_string(),
        files_found: 2,
        files_with_events: 1,
        lines_read: 6,
        malformed_lines: 1,
        events_written: 4,
        events_by_date,
        usage,
        ..SyncReport::default()
    }
}

#[test]
fn test_sync_report_text() {
    plain();
    let text = DisplayManager::new(false).render_sync_report(&create_test_report(), Path::new("/data"));
    assert!(text.contains("Found 2 log files"));
    assert!(text.contains("Synced 4 events from 1 files"));
    assert!(text.contains("2025-01-15: 3 events"));
    assert!(text.contains("2025-01-16: 1 events"));
    assert!(text.contains("1 usage records"));
    assert!(text.contains("$0.0105"));
    assert!(text.contains("Skipped 1 malformed lines"));
    assert!(text.contains("State saved to /data"));
}

#[test]
fn test_up_to_date_report() {
    plain();
    let report = SyncReport {
        files_found: 3,
        ..SyncReport::default()
    };
    let text = DisplayManager::new(false).render_sync_report(&report, Path::new("/data"));
    assert!(text.contains("Already up to date"));
    assert!(!text.contains("usage records"));
}

#[test]
fn test_sync_report_json() {
    let json = DisplayManager::new(true).render_sync_report(&create_test_report(), Path::new("/data"));
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["events_written"], 4);
    assert_eq!(value["usage"]["input"], 1000);
}

#[test]
fn test_stats_ordering_and_limit() {
    plain();
    let mut aggregates = Aggregates::default();
    aggregates.fold(&record("2025-01-14", "claude-opus-4-20250514", "api", 0.5));
    aggregates.fold(&record("2025-01-15", "claude-sonnet-4-20250514", "app", 0.1));
    aggregates.fold(&record("2025-01-16", "claude-sonnet-4-20250514", "app", 0.1));

    let text = DisplayManager::new(false).render_stats(&aggregates, Some(2));
    assert!(text.contains("3 requests"));
    assert!(text.contains("$0.7000 total"));

    // Highest cost first within a breakdown.
    let opus = text.find("claude-opus-4-20250514").unwrap();
    let sonnet = text.find("claude-sonnet-4-20250514").unwrap();
    assert!(opus < sonnet);

    assert!(!text.contains("2025-01-14:"));
    let day_15 = text.find("2025-01-15:").unwrap();
    let day_16 = text.find("2025-01-16:").unwrap();
    assert!(day_15 < day_16);
}

#[test]
fn test_empty_stats() {
    plain();
    let text = DisplayManager::new(false).render_stats(&Aggregates::default(), None);
    assert!(text.contains("No usage recorded yet"));
}
