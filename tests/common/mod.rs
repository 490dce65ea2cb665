#![allow(dead_code)]

use cc_sync::config::{Config, PathsConfig};
use cc_sync::sync::SyncEngine;
use serde_json::json;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const SONNET: &str = "claude-sonnet-4-20250514";

/// A throwaway Claude home plus journal data directory.
pub struct TestHome {
    root: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join(".claude").join("projects")).unwrap();
        Self { root }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn claude_home(&self) -> PathBuf {
        self.root.path().join(".claude")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.path().join("journal")
    }

    pub fn config(&self) -> Config {
        Config {
            paths: PathsConfig {
                claude_home: self.claude_home(),
                data_dir: self.data_dir(),
                log_directory: None,
            },
            ..Config::default()
        }
    }

    pub fn engine(&self) -> SyncEngine {
        SyncEngine::from_config(&self.config()).unwrap()
    }

    /// Path of a session log under `projects/<project_dir>/`.
    pub fn log_path(&self, project_dir: &str, file: &str) -> PathBuf {
        self.claude_home().join("projects").join(project_dir).join(file)
    }

    /// Append raw lines (each gets a trailing newline) to a session log, creating it if needed.
    pub fn append_lines(&self, project_dir: &str, file: &str, lines: &[String]) -> PathBuf {
        let path = self.log_path(project_dir, file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .unwrap();
        for line in lines {
            writeln!(out, "{}", line).unwrap();
        }
        path
    }

    pub fn append_raw(&self, project_dir: &str, file: &str, bytes: &str) -> PathBuf {
        let path = self.log_path(project_dir, file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .unwrap();
        out.write_all(bytes.as_bytes()).unwrap();
        path
    }

    pub fn read_data_file(&self, name: &str) -> String {
        fs::read_to_string(self.data_dir().join(name)).unwrap()
    }
}

pub fn user_line(ts: &str, cwd: &str, prompt: &str) -> String {
    json!({
        "type": "user",
        "timestamp": ts,
        "cwd": cwd,
        "sessionId": "session-1",
        "message": {"role": "user", "content": prompt},
    })
    .to_string()
}

pub fn tool_line(ts: &str, cwd: &str, model: &str, name: &str, input: serde_json::Value) -> String {
    json!({
        "type": "assistant",
        "timestamp": ts,
        "cwd": cwd,
        "sessionId": "session-1",
        "message": {
            "model": model,
            "content": [{"type": "tool_use", "id": "toolu_1", "name": name, "input": input}],
        },
    })
    .to_string()
}

pub fn usage_line(ts: &str, cwd: &str, model: &str, input: u64, output: u64) -> String {
    usage_line_with_cache(ts, cwd, model, input, output, 0, 0)
}

pub fn usage_line_with_cache(
    ts: &str,
    cwd: &str,
    model: &str,
    input: u64,
    output: u64,
    cache_read: u64,
    cache_write: u64,
) -> String {
    json!({
        "type": "assistant",
        "timestamp": ts,
        "cwd": cwd,
        "sessionId": "session-1",
        "message": {
            "model": model,
            "content": [{"type": "text", "text": "done"}],
            "usage": {
                "input_tokens": input,
                "output_tokens": output,
                "cache_read_input_tokens": cache_read,
                "cache_creation_input_tokens": cache_write,
            },
        },
    })
    .to_string()
}
