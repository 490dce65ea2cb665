//! Terminal and JSON output for sync runs and cumulative stats.
//!
//! Every report is rendered to a `String` first so it can be tested without a terminal; the
//! `display_*` methods just print the rendering.

use crate::aggregates::{Aggregates, UsageBucket};
use crate::sync::SyncReport;
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::Path;

const DEFAULT_DATE_LIMIT: usize = 14;

pub struct DisplayManager {
    json_output: bool,
}

impl DisplayManager {
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }

    pub fn display_sync_report(&self, report: &SyncReport, data_dir: &Path) {
        println!("{}", self.render_sync_report(report, data_dir));
    }

    pub fn display_stats(&self, aggregates: &Aggregates, limit: Option<usize>) {
        println!("{}", self.render_stats(aggregates, limit));
    }

    pub fn render_sync_report(&self, report: &SyncReport, data_dir: &Path) -> String {
        if self.json_output {
            return to_json(report);
        }

        let mut lines = vec![
            format!("🔄 {}", "Claude Code Native Log Sync".bright_white().bold()),
            "=".repeat(50).bright_cyan().to_string(),
        ];
        if report.reset {
            lines.push(format!("{}  Reset sync state", "♻️".bright_yellow()));
        }
        lines.push(format!(
            "{} Found {} log files",
            "📁".bright_blue(),
            report.files_found.to_string().bright_white().bold()
        ));

        if report.events_written == 0 {
            lines.push(format!("\n{} Already up to date", "✅".bright_green()));
        } else {
            lines.push(format!(
                "\n{} Synced {} events from {} files",
                "✅".bright_green(),
                report.events_written.to_string().bright_white().bold(),
                report.files_with_events.to_string().bright_white().bold()
            ));
            for (date, count) in &report.events_by_date {
                lines.push(format!("   {}: {} events", date.bright_white(), count));
            }
        }

        if report.usage.requests > 0 {
            lines.push(format!(
                "\n{} {} usage records • {} tokens • {} ({} saved by cache)",
                "💰".bright_yellow(),
                report.usage.requests.to_string().bright_white().bold(),
                format_tokens(report.usage.tokens().total()).bright_white(),
                format_cost(report.usage.cost).bright_green().bold(),
                format_cost(report.usage.cache_savings).bright_green()
            ));
        }
        if report.malformed_lines > 0 {
            lines.push(format!(
                "{} Skipped {} malformed lines",
                "⚠️".bright_yellow(),
                report.malformed_lines
            ));
        }

        lines.push(format!(
            "\n{} State saved to {}",
            "💾".bright_blue(),
            data_dir.display().to_string().bright_cyan()
        ));
        lines.join("\n")
    }

    pub fn render_stats(&self, aggregates: &Aggregates, limit: Option<usize>) -> String {
        if self.json_output {
            return to_json(aggregates);
        }

        let rule = "=".repeat(80).bright_cyan().to_string();
        let mut lines = vec![
            rule.clone(),
            "Claude Code Usage Totals".bright_white().bold().to_string(),
            rule,
        ];

        if aggregates.is_empty() {
            lines.push(format!("\n{} No usage recorded yet", "📊".bright_yellow()));
            return lines.join("\n");
        }

        let totals = aggregates.totals();
        let tokens = totals.tokens();
        lines.push(format!(
            "\n{} {} requests • {} tokens • {} total",
            "📊".bright_yellow(),
            totals.requests.to_string().bright_white().bold(),
            format_tokens(tokens.total()).bright_white().bold(),
            format_cost(totals.cost).bright_green().bold()
        ));
        lines.push(format!(
            "   input {} • output {} • cache read {} • cache write {}",
            format_tokens(tokens.input),
            format_tokens(tokens.output),
            format_tokens(tokens.cache_read),
            format_tokens(tokens.cache_write)
        ));
        lines.push(format!(
            "   without cache {} • saved {}",
            format_cost(totals.cost_without_cache),
            format_cost(totals.cache_savings).bright_green()
        ));

        lines.push(format!("\n{} By model:", "🤖".bright_blue()));
        lines.extend(breakdown_rows(&aggregates.by_model, totals.cost, true));

        lines.push(format!("\n{} By project:", "📁".bright_blue()));
        lines.extend(breakdown_rows(&aggregates.by_project, totals.cost, true));

        let limit = limit.unwrap_or(DEFAULT_DATE_LIMIT);
        lines.push(format!("\n{} Recent days (last {}):", "📅".bright_blue(), limit));
        let recent: BTreeMap<_, _> = aggregates
            .by_date
            .iter()
            .rev()
            .take(limit)
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        lines.extend(breakdown_rows(&recent, totals.cost, false));
        lines.join("\n")
    }
}

/// With `by_cost`, rows go highest cost first; otherwise they keep key order.
fn breakdown_rows(
    buckets: &BTreeMap<String, UsageBucket>,
    total_cost: f64,
    by_cost: bool,
) -> Vec<String> {
    let mut rows: Vec<_> = buckets.iter().collect();
    if by_cost {
        rows.sort_by(|a, b| b.1.cost.total_cmp(&a.1.cost).then_with(|| a.0.cmp(b.0)));
    }
    rows.into_iter()
        .map(|(name, bucket)| {
            let share = if total_cost > 0.0 {
                bucket.cost / total_cost * 100.0
            } else {
                0.0
            };
            format!(
                "   {}: {} ({}%, {} requests, {} tokens)",
                name.bright_cyan(),
                format_cost(bucket.cost).bright_green(),
                format!("{:.0}", share).bright_yellow(),
                bucket.requests,
                format_tokens(bucket.tokens().total())
            )
        })
        .collect()
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize output: {}\"}}", e))
}

pub fn format_cost(cost: f64) -> String {
    format!("${:.4}", cost)
}

/// `1234567` → `1,234,567`
pub fn format_tokens(tokens: u64) -> String {
    let digits = tokens.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
