//! Structured logging
//!
//! Diagnostics go through `tracing`: pretty or JSON, to stderr, to a daily rolling file under the
//! log directory, or both. `RUST_LOG` wins over the configured level when set.

use crate::config::LoggingConfig;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_FILE_PREFIX: &str = "cc-sync.log";

/// Install the global subscriber. Hold the returned guard until exit so buffered file output
/// gets flushed.
pub fn init_logging(config: &LoggingConfig, log_dir: &Path) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let json = config.format.eq_ignore_ascii_case("json");

    match config.output.to_lowercase().as_str() {
        "file" => Some(init_file_logging(env_filter, json, log_dir)),
        "both" => Some(init_combined_logging(env_filter, json, log_dir)),
        _ => {
            init_console_logging(env_filter, json);
            None
        }
    }
}

fn init_console_logging(filter: EnvFilter, json: bool) {
    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true),
            )
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_ansi(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .pretty(),
            )
            .init();
    }
}

fn init_file_logging(filter: EnvFilter, json: bool, log_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
            .init();
    }
    guard
}

fn init_combined_logging(filter: EnvFilter, json: bool, log_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(fmt::layer().json().with_writer(non_blocking))
            .init();
    } else {
        subscriber
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .init();
    }
    guard
}
