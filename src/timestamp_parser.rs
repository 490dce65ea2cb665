use anyhow::Result;
use chrono::{DateTime, FixedOffset, NaiveDateTime};

/// Handles parsing the ISO-8601 timestamps Claude Code writes on every log line
pub struct TimestampParser;

/// Calendar date and wall-clock time of an entry, as written in its own offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryTime {
    /// `YYYY-MM-DD`, the partition key
    pub date: String,
    /// `HH:MM:SS`
    pub time: String,
}

impl TimestampParser {
    /// Parse a timestamp string, keeping its own offset.
    /// Handles both Z suffix and timezone info; naive timestamps are kept as written.
    pub fn parse(timestamp_str: &str) -> Result<EntryTime> {
        let timestamp = match timestamp_str.strip_suffix('Z') {
            Some(stripped) => format!("{}+00:00", stripped),
            None => timestamp_str.to_string(),
        };

        if let Ok(dt) = DateTime::<FixedOffset>::parse_from_rfc3339(&timestamp) {
            return Ok(EntryTime {
                date: dt.format("%Y-%m-%d").to_string(),
                time: dt.format("%H:%M:%S").to_string(),
            });
        }

        if let Ok(naive) = NaiveDateTime::parse_from_str(&timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(EntryTime {
                date: naive.format("%Y-%m-%d").to_string(),
                time: naive.format("%H:%M:%S").to_string(),
            });
        }

        anyhow::bail!("Failed to parse timestamp: {}", timestamp_str)
    }
}
