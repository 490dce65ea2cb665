//! Core Data Models
//!
//! This module defines the records that flow through the sync pipeline, from the raw lines
//! Claude Code appends to its native logs to the classified output the journal consumes.
//!
//! ## Data Flow
//!
//! 1. **Raw Data**: [`RawEntry`] - one decoded JSON line from a native log file
//! 2. **Classification**: [`ActivityEvent`] and [`TokenUsageRecord`] - produced per entry
//! 3. **Output**: events are appended to per-date partitions, usage records are folded into
//!    the aggregate snapshot and then dropped
//!
//! ## Core Types
//!
//! ### Raw Entries
//! - [`RawEntry`] - tagged by the `type` field (`user` / `assistant`), anything else is
//!   [`RawEntry::Other`]
//! - [`EntryMeta`] - timestamp, working directory, session id and branch shared by both kinds
//! - [`Usage`] - token counts reported on an assistant turn
//! - [`ContentBlock`] / [`ToolInput`] - tool invocations carried by assistant turns
//!
//! ### Classified Output
//! - [`ActivityEvent`] - one unit of engineering activity with an [`Action`] payload
//! - [`TokenUsageRecord`] - token counts plus the derived [`CostBreakdown`]
//!
//! Tool inputs and content blocks are decoded leniently: a block or field with an unexpected
//! shape is dropped on its own instead of failing the whole entry, so a token-usage block is
//! never lost because one tool call carried odd input.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum RawEntry {
    #[serde(rename = "user")]
    User(UserEntry),
    #[serde(rename = "assistant")]
    Assistant(AssistantEntry),
    #[serde(other)]
    Other,
}

/// Fields every user/assistant line carries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryMeta {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
    #[serde(rename = "gitBranch", default)]
    pub git_branch: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    #[serde(flatten)]
    pub meta: EntryMeta,
    #[serde(default)]
    pub message: UserMessage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMessage {
    #[serde(default)]
    pub content: UserContent,
}

/// User content is either the typed prompt or structured tool results.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserContent {
    Text(String),
    Structured(Value),
}

impl Default for UserContent {
    fn default() -> Self {
        UserContent::Structured(Value::Null)
    }
}

impl UserContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            UserContent::Text(text) => Some(text),
            UserContent::Structured(_) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantEntry {
    #[serde(flatten)]
    pub meta: EntryMeta,
    #[serde(default)]
    pub message: AssistantMessage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
    #[serde(default, deserialize_with = "lenient_blocks")]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    #[serde(default, deserialize_with = "zero_if_null")]
    pub input_tokens: u64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub output_tokens: u64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub cache_read_input_tokens: u64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub cache_creation_input_tokens: u64,
}

impl Usage {
    /// Only turns that actually billed input or output count as usage.
    pub fn is_billable(&self) -> bool {
        self.input_tokens > 0 || self.output_tokens > 0
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "tool_use")]
    ToolUse(ToolUse),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolUse {
    pub name: String,
    #[serde(default)]
    pub input: ToolInput,
}

/// Union of the tool input fields the classifier reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolInput {
    #[serde(default, deserialize_with = "lenient_string")]
    pub file_path: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub command: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub prompt: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subagent_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(rename = "taskId", default, deserialize_with = "lenient_string")]
    pub task_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pattern: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub query: Option<String>,
}

/// One classified unit of activity, written as a single JSON line into its date partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Partition key (`YYYY-MM-DD`); not part of the written line.
    #[serde(skip)]
    pub date: String,
    pub project: String,
    pub ts: String,
    pub cwd: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    UserPrompt {
        prompt: String,
    },
    CreatedFile {
        file: String,
        path: String,
        category: FileCategory,
    },
    ModifiedFile {
        file: String,
        path: String,
        category: FileCategory,
    },
    Command {
        command: String,
        description: String,
    },
    GitOperation {
        command: String,
        description: String,
    },
    Delegated {
        agent: String,
        task: String,
    },
    TaskPlanned {
        task: String,
    },
    TaskCompleted {
        task_id: String,
    },
    Research {
        tool: String,
        target: String,
    },
    WebResearch {
        tool: String,
        target: String,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::UserPrompt { .. } => "user_prompt",
            Action::CreatedFile { .. } => "created_file",
            Action::ModifiedFile { .. } => "modified_file",
            Action::Command { .. } => "command",
            Action::GitOperation { .. } => "git_operation",
            Action::Delegated { .. } => "delegated",
            Action::TaskPlanned { .. } => "task_planned",
            Action::TaskCompleted { .. } => "task_completed",
            Action::Research { .. } => "research",
            Action::WebResearch { .. } => "web_research",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Test,
    Docs,
    Config,
    Style,
    Component,
    Route,
    Database,
    Code,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Test => "test",
            FileCategory::Docs => "docs",
            FileCategory::Config => "config",
            FileCategory::Style => "style",
            FileCategory::Component => "component",
            FileCategory::Route => "route",
            FileCategory::Database => "database",
            FileCategory::Code => "code",
        }
    }
}

/// Actual cost, what the same turn would have cost without prompt caching, and the difference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub actual: f64,
    pub without_cache: f64,
    pub savings: f64,
}

/// Token usage of one assistant turn. Folded into the aggregates once, never stored on its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenUsageRecord {
    pub date: String,
    pub project: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_write_tokens: u64,
    pub cost: CostBreakdown,
}

/// Everything one raw entry classifies into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classified {
    pub events: Vec<ActivityEvent>,
    pub usage: Option<TokenUsageRecord>,
}

impl Classified {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.usage.is_none()
    }
}

fn zero_if_null<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_blocks<'de, D>(deserializer: D) -> Result<Vec<ContentBlock>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
