//! Configuration
//!
//! Settings come from, in increasing precedence:
//! - built-in defaults
//! - a TOML file (`--config`, `cc-sync.toml`, `.cc-sync.toml`, or `<config dir>/cc-sync/config.toml`)
//! - environment variables
//!
//! ```toml
//! [logging]
//! level = "WARN"
//! format = "pretty"     # or "json"
//! output = "console"    # or "file", "both"
//!
//! [paths]
//! claude_home = "~/.claude"
//! data_dir = "~/Desktop/cc-config"
//!
//! [pricing]
//! default_model = "claude-sonnet-4-20250514"
//!
//! [pricing.models."my-model"]
//! input = 1.0
//! output = 2.0
//! cache_read = 0.1
//! cache_write = 1.25
//! ```

use crate::pricing::{ModelPricing, PricingTable, DEFAULT_MODEL};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const LOG_FORMATS: &[&str] = &["pretty", "json"];
const LOG_OUTPUTS: &[&str] = &["console", "file", "both"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub paths: PathsConfig,
    pub pricing: PricingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "WARN".to_string(),
            format: "pretty".to_string(),
            output: "console".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of the Claude Code installation; native logs live under `projects/`.
    pub claude_home: PathBuf,
    /// Where event partitions, sync state and aggregates are written.
    pub data_dir: PathBuf,
    /// Rolling log files when logging to a file. Defaults to `<data_dir>/.sync-logs`.
    pub log_directory: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            claude_home: home.join(".claude"),
            data_dir: home.join("Desktop").join("cc-config"),
            log_directory: None,
        }
    }
}

impl PathsConfig {
    pub fn projects_dir(&self) -> PathBuf {
        self.claude_home.join("projects")
    }

    pub fn events_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn state_file(&self) -> PathBuf {
        self.data_dir.join(".sync-state.json")
    }

    pub fn aggregates_file(&self) -> PathBuf {
        self.data_dir.join(".usage-aggregates.json")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_directory
            .clone()
            .unwrap_or_else(|| self.data_dir.join(".sync-logs"))
    }

    /// Replace a leading `~` with the home directory in every configured path.
    pub fn expand_home(&mut self) {
        self.claude_home = expand_tilde(&self.claude_home);
        self.data_dir = expand_tilde(&self.data_dir);
        if let Some(dir) = &self.log_directory {
            self.log_directory = Some(expand_tilde(dir));
        }
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => {
            warn!(path = %path.display(), "No home directory, leaving path unexpanded");
            path.to_path_buf()
        }
    }
}

/// Extra or overriding model prices, plus the tier unknown models fall back to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub default_model: String,
    pub models: HashMap<String, ModelPricing>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL.to_string(),
            models: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file, or the first default location that exists,
    /// then apply environment overrides and validate.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                info!(config_file = %path.display(), "Loading configuration from file");
                Self::load_from_file(path)?
            }
            None => match Self::default_paths().into_iter().find(|p| p.is_file()) {
                Some(path) => {
                    info!(config_file = %path.display(), "Loading configuration from file");
                    Self::load_from_file(&path)?
                }
                None => Config::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("cc-sync.toml"), PathBuf::from(".cc-sync.toml")];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("cc-sync").join("config.toml"));
        }
        paths
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.paths.expand_home();

        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        if let Ok(val) = env::var("CLAUDE_HOME") {
            self.paths.claude_home = PathBuf::from(val);
        }
        if let Ok(val) = env::var("CC_SYNC_DATA_DIR") {
            self.paths.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = env::var("CC_SYNC_LOG_DIR") {
            self.paths.log_directory = Some(PathBuf::from(val));
        }

        if let Ok(val) = env::var("CC_SYNC_DEFAULT_MODEL") {
            self.pricing.default_model = val;
        }

        self.paths.expand_home();
    }

    pub fn validate(&self) -> Result<()> {
        let format = self.logging.format.to_lowercase();
        if !LOG_FORMATS.contains(&format.as_str()) {
            anyhow::bail!(
                "Unknown log format '{}', expected one of: {}",
                self.logging.format,
                LOG_FORMATS.join(", ")
            );
        }
        let output = self.logging.output.to_lowercase();
        if !LOG_OUTPUTS.contains(&output.as_str()) {
            anyhow::bail!(
                "Unknown log output '{}', expected one of: {}",
                self.logging.output,
                LOG_OUTPUTS.join(", ")
            );
        }

        PricingTable::from_config(&self.pricing).context("Invalid [pricing] configuration")?;
        Ok(())
    }

    /// Build the pricing table this configuration describes.
    pub fn pricing_table(&self) -> Result<PricingTable> {
        PricingTable::from_config(&self.pricing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "WARN");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.pricing.default_model, DEFAULT_MODEL);
        assert!(config.paths.claude_home.ends_with(".claude"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_derived_paths() {
        let paths = PathsConfig {
            claude_home: PathBuf::from("/h/.claude"),
            data_dir: PathBuf::from("/data"),
            log_directory: None,
        };
        assert_eq!(paths.projects_dir(), PathBuf::from("/h/.claude/projects"));
        assert_eq!(paths.events_dir(), PathBuf::from("/data/logs"));
        assert_eq!(paths.state_file(), PathBuf::from("/data/.sync-state.json"));
        assert_eq!(
            paths.aggregates_file(),
            PathBuf::from("/data/.usage-aggregates.json")
        );
        assert_eq!(paths.log_dir(), PathBuf::from("/data/.sync-logs"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cc-sync.toml");
        fs::write(
            &path,
            r#"
[paths]
data_dir = "/tmp/journal"

[pricing.models."local-llm"]
input = 1.0
output = 2.0
cache_read = 0.1
cache_write = 1.25
"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.paths.data_dir, PathBuf::from("/tmp/journal"));
        assert!(config.paths.claude_home.ends_with(".claude"));
        assert_eq!(config.logging.level, "WARN");
        assert_eq!(config.pricing.models["local-llm"].output, 2.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tilde_expansion() {
        let home = dirs::home_dir().unwrap();
        let mut paths = PathsConfig {
            claude_home: PathBuf::from("~/.claude"),
            data_dir: PathBuf::from("~"),
            log_directory: Some(PathBuf::from("/var/log/cc-sync")),
        };
        paths.expand_home();
        assert_eq!(paths.claude_home, home.join(".claude"));
        assert_eq!(paths.data_dir, home);
        assert_eq!(paths.log_dir(), PathBuf::from("/var/log/cc-sync"));
        assert_eq!(expand_tilde(Path::new("~user/x")), PathBuf::from("~user/x"));
    }

    #[test]
    fn test_env_override() {
        env::set_var("CC_SYNC_LOG_DIR", "/tmp/cc-sync-test-logs");
        let mut config = Config::default();
        config.apply_env_overrides();
        env::remove_var("CC_SYNC_LOG_DIR");
        assert_eq!(
            config.paths.log_dir(),
            PathBuf::from("/tmp/cc-sync-test-logs")
        );
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.output = "syslog".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pricing.default_model = "nobody-knows".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config
            .pricing
            .models
            .insert("bad".to_string(), ModelPricing::new(-1.0, 1.0, 0.1, 1.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
