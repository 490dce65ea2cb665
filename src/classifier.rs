//! Record Classifier
//!
//! Turns one decoded [`RawEntry`] into the activity events and the optional token-usage record
//! it represents.
//!
//! ## Rules
//!
//! - An entry whose timestamp is missing or unparseable yields nothing; the date is the
//!   partition key.
//! - A user entry with non-blank text content yields one `user_prompt` event (500 characters max).
//! - An assistant entry yields a [`TokenUsageRecord`] when its usage block billed input or output
//!   tokens, and one event per recognised `tool_use` block (see [`classify_tool`]).
//!
//! The tool table and the file category table are ordered, exact, case-sensitive lookups. Order
//! matters for file categories: the first matching rule wins.

use crate::cost::{calculate_cost, TokenCounts};
use crate::models::{
    Action, ActivityEvent, AssistantEntry, Classified, ContentBlock, EntryMeta, FileCategory,
    RawEntry, TokenUsageRecord, ToolUse, UserEntry,
};
use crate::pricing::PricingTable;
use crate::timestamp_parser::{EntryTime, TimestampParser};
use tracing::trace;

const PROMPT_LIMIT: usize = 500;
const COMMAND_LIMIT: usize = 200;
const TASK_LIMIT: usize = 200;

/// Path segments that never name a project.
const GENERIC_SEGMENTS: &[&str] = &[
    "Users",
    "home",
    "Desktop",
    "Documents",
    "Projects",
    "Code",
    "dev",
    "Volumes",
];

/// Folders that hold projects; the segment right below the deepest one is the project root.
const WORKSPACE_SEGMENTS: &[&str] = &["Desktop", "Documents", "Projects", "Code", "dev"];

const FILE_CATEGORY_RULES: &[(&[&str], FileCategory)] = &[
    (&["test", "spec", "__test__"], FileCategory::Test),
    (&[".md", "readme", "docs/"], FileCategory::Docs),
    (
        &[".json", ".yaml", ".yml", ".toml", "config"],
        FileCategory::Config,
    ),
    (&[".css", ".scss", ".less", "style"], FileCategory::Style),
    (
        &[".svelte", ".vue", ".jsx", ".tsx", "component"],
        FileCategory::Component,
    ),
    (&["route", "page", "endpoint", "api/"], FileCategory::Route),
    (
        &["schema", "model", "db/", "database"],
        FileCategory::Database,
    ),
];

const MODEL_FAMILIES: &[&str] = &["opus", "sonnet", "haiku"];

pub struct Classifier {
    pricing: PricingTable,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(PricingTable::builtin())
    }
}

impl Classifier {
    pub fn new(pricing: PricingTable) -> Self {
        Self { pricing }
    }

    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    /// Decode and classify one log line. `None` means the line is not valid JSON for a log entry.
    pub fn classify_line(&self, line: &str) -> Option<Classified> {
        match serde_json::from_str::<RawEntry>(line) {
            Ok(entry) => Some(self.classify(&entry)),
            Err(err) => {
                trace!(error = %err, "Skipping malformed line");
                None
            }
        }
    }

    pub fn classify(&self, entry: &RawEntry) -> Classified {
        match entry {
            RawEntry::User(user) => self.classify_user(user),
            RawEntry::Assistant(assistant) => self.classify_assistant(assistant),
            RawEntry::Other => Classified::default(),
        }
    }

    fn classify_user(&self, user: &UserEntry) -> Classified {
        let Some(context) = EntryContext::from_meta(&user.meta) else {
            return Classified::default();
        };
        let mut classified = Classified::default();
        if let Some(text) = user.message.content.as_text() {
            if !text.trim().is_empty() {
                classified.events.push(context.event(
                    None,
                    Action::UserPrompt {
                        prompt: truncate_chars(text, PROMPT_LIMIT),
                    },
                ));
            }
        }
        classified
    }

    fn classify_assistant(&self, assistant: &AssistantEntry) -> Classified {
        let Some(context) = EntryContext::from_meta(&assistant.meta) else {
            return Classified::default();
        };
        let message = &assistant.message;
        let model = message.model.as_deref().unwrap_or("unknown");
        let mut classified = Classified::default();

        if let Some(usage) = message.usage.as_ref().filter(|usage| usage.is_billable()) {
            let tokens = TokenCounts::from(usage);
            classified.usage = Some(TokenUsageRecord {
                date: context.time.date.clone(),
                project: context.project.clone(),
                model: model.to_string(),
                input_tokens: tokens.input,
                output_tokens: tokens.output,
                cache_read_tokens: tokens.cache_read,
                cache_write_tokens: tokens.cache_write,
                cost: calculate_cost(&self.pricing, model, tokens),
            });
        }

        let short_model = short_model_name(model);
        for block in &message.content {
            if let ContentBlock::ToolUse(tool) = block {
                if let Some(action) = classify_tool(tool) {
                    classified
                        .events
                        .push(context.event(Some(short_model.clone()), action));
                }
            }
        }
        classified
    }
}

/// Per-entry fields shared by every event the entry produces.
struct EntryContext<'a> {
    meta: &'a EntryMeta,
    time: EntryTime,
    project: String,
}

impl<'a> EntryContext<'a> {
    fn from_meta(meta: &'a EntryMeta) -> Option<Self> {
        let time = TimestampParser::parse(meta.timestamp.as_deref()?).ok()?;
        Some(Self {
            meta,
            time,
            project: extract_project_name(meta.cwd.as_deref().unwrap_or("")),
        })
    }

    fn event(&self, model: Option<String>, action: Action) -> ActivityEvent {
        ActivityEvent {
            date: self.time.date.clone(),
            project: self.project.clone(),
            ts: self.time.time.clone(),
            cwd: self.meta.cwd.clone().unwrap_or_default(),
            session: self.meta.session_id.clone(),
            branch: self.meta.git_branch.clone(),
            model,
            action,
        }
    }
}

/// Map one tool invocation to its action, if the tool is one we track.
pub fn classify_tool(tool: &ToolUse) -> Option<Action> {
    let input = &tool.input;
    let text = |value: &Option<String>| value.clone().unwrap_or_default();

    match tool.name.as_str() {
        "Write" | "Edit" => {
            let path = input.file_path.as_deref().filter(|p| !p.is_empty())?;
            let file = file_name(path);
            let category = categorize_file(path);
            let path = path.to_string();
            Some(if tool.name == "Write" {
                Action::CreatedFile {
                    file,
                    path,
                    category,
                }
            } else {
                Action::ModifiedFile {
                    file,
                    path,
                    category,
                }
            })
        }
        "Bash" => {
            let raw = input.command.as_deref().filter(|c| !c.is_empty())?;
            let command = truncate_chars(raw, COMMAND_LIMIT);
            let description = text(&input.description);
            Some(if is_git_operation(raw) {
                Action::GitOperation {
                    command,
                    description,
                }
            } else {
                Action::Command {
                    command,
                    description,
                }
            })
        }
        "Task" => Some(Action::Delegated {
            agent: text(&input.subagent_type),
            task: truncate_chars(input.prompt.as_deref().unwrap_or(""), TASK_LIMIT),
        }),
        "TaskCreate" => Some(Action::TaskPlanned {
            task: text(&input.subject),
        }),
        "TaskUpdate" => match input.status.as_deref() {
            Some("completed") => Some(Action::TaskCompleted {
                task_id: text(&input.task_id),
            }),
            _ => None,
        },
        "Read" | "Glob" | "Grep" => Some(Action::Research {
            tool: tool.name.clone(),
            target: first_present(&[&input.file_path, &input.pattern, &input.path]),
        }),
        "WebFetch" | "WebSearch" => Some(Action::WebResearch {
            tool: tool.name.clone(),
            target: first_present(&[&input.url, &input.query]),
        }),
        _ => None,
    }
}

fn is_git_operation(command: &str) -> bool {
    command.contains("git commit") || command.contains("git push")
}

fn first_present(candidates: &[&Option<String>]) -> String {
    candidates
        .iter()
        .filter_map(|value| value.as_deref())
        .find(|value| !value.is_empty())
        .unwrap_or("")
        .to_string()
}

/// Derive a project name from a working directory.
///
/// This is not a plain walk up from the leaf. When the path runs through a workspace folder
/// (`Desktop`, `Code`, ...), the first meaningful segment below the deepest one is the project
/// root, so `/Users/a/Code/app/src` gives `app` where a leaf walk would give `src`.
///
/// Without a workspace folder, the segment closest to the leaf that is neither generic nor hidden
/// wins (`/srv/app/.venv` gives `app`). Falls back to the final segment, and to `unknown` for an
/// empty path.
pub fn extract_project_name(cwd: &str) -> String {
    let segments: Vec<&str> = cwd.split('/').filter(|s| !s.is_empty()).collect();
    let Some(last) = segments.last() else {
        return "unknown".to_string();
    };

    let below_workspace = segments
        .iter()
        .rposition(|segment| WORKSPACE_SEGMENTS.contains(segment))
        .and_then(|idx| segments[idx + 1..].iter().find(|s| is_meaningful(s)));

    below_workspace
        .or_else(|| segments.iter().rev().find(|s| is_meaningful(s)))
        .unwrap_or(last)
        .to_string()
}

fn is_meaningful(segment: &str) -> bool {
    !GENERIC_SEGMENTS.contains(&segment) && !segment.starts_with('.')
}

/// Categorize a file by substring rules against its lowercased path.
pub fn categorize_file(path: &str) -> FileCategory {
    let lowered = path.to_lowercase();
    FILE_CATEGORY_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| lowered.contains(needle)))
        .map(|(_, category)| *category)
        .unwrap_or(FileCategory::Code)
}

/// `opus`, `sonnet` or `haiku` when the model id names one, else its first hyphen token.
pub fn short_model_name(model: &str) -> String {
    let lowered = model.to_lowercase();
    if let Some(family) = MODEL_FAMILIES.iter().find(|family| lowered.contains(*family)) {
        return family.to_string();
    }
    match model.split('-').next() {
        Some(token) if !token.is_empty() => token.to_string(),
        _ => "unknown".to_string(),
    }
}

fn file_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
