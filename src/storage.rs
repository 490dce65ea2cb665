//! JSON snapshot persistence shared by the sync state and aggregate stores.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Read a snapshot, starting fresh when it is missing or unreadable.
pub fn load_or_default<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return T::default(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Cannot read snapshot, starting fresh");
            return T::default();
        }
    };
    match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Corrupt snapshot, starting fresh");
            T::default()
        }
    }
}

/// Overwrite a snapshot wholesale. Written to a sibling temp file first, then renamed over.
pub fn save_snapshot<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let mut content =
        serde_json::to_string_pretty(value).context("Failed to serialize snapshot")?;
    content.push('\n');

    let tmp = temp_path(path);
    fs::write(&tmp, content)
        .with_context(|| format!("Failed to write snapshot: {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace snapshot: {}", path.display()))?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
