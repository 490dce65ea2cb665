use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[cfg(test)]
mod config_tests {
    use super::*;
    use cc_sync::config::Config;
    use cc_sync::sync::SyncEngine;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();

        assert_eq!(config.logging.level, "WARN");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.logging.output, "console");

        assert!(config.paths.data_dir.ends_with("Desktop/cc-config"));
        assert!(config.paths.log_directory.is_none());
        assert_eq!(config.pricing.default_model, "claude-sonnet-4-20250514");
        assert!(config.pricing.models.is_empty());
    }

    #[test]
    fn test_config_file_loading() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("test-config.toml");

        let test_config = r#"
[logging]
level = "DEBUG"
format = "json"
output = "both"

[paths]
claude_home = "/custom/claude"
data_dir = "/custom/journal"
log_directory = "/custom/logs"

[pricing]
default_model = "house-model"

[pricing.models."house-model"]
input = 2.0
output = 8.0
cache_read = 0.2
cache_write = 2.5
        "#;
        fs::write(&config_path, test_config).expect("Failed to write test config");

        let config = Config::load_from_file(&config_path).expect("Failed to load config");
        assert_eq!(config.logging.level, "DEBUG");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.output, "both");
        assert_eq!(config.paths.projects_dir(), PathBuf::from("/custom/claude/projects"));
        assert_eq!(config.paths.events_dir(), PathBuf::from("/custom/journal/logs"));
        assert_eq!(config.paths.log_dir(), PathBuf::from("/custom/logs"));
        assert!(config.validate().is_ok());

        let table = config.pricing_table().unwrap();
        assert_eq!(table.lookup("never-heard-of-it").output, 8.0);
        assert_eq!(table.lookup("claude-opus-4-20250514").output, 75.0);
    }

    #[test]
    fn test_home_relative_paths_are_expanded() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("home.toml");
        fs::write(
            &config_path,
            "[paths]\nclaude_home = \"~/.claude\"\ndata_dir = \"~/Desktop/cc-config\"\n",
        )
        .unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        let home = dirs::home_dir().unwrap();
        assert_eq!(config.paths.projects_dir(), home.join(".claude").join("projects"));
        assert_eq!(
            config.paths.state_file(),
            home.join("Desktop").join("cc-config").join(".sync-state.json")
        );
        assert!(config.paths.projects_dir().is_absolute());
        assert!(config.paths.aggregates_file().is_absolute());
        assert!(config.paths.log_dir().is_absolute());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "[logging\nlevel = ").unwrap();
        assert!(Config::load_from_file(&config_path).is_err());
    }

    #[test]
    fn test_bad_pricing_rejected_before_sync() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("pricing.toml");
        fs::write(
            &config_path,
            "[pricing.models.cheap]\ninput = 1.0\noutput = -2.0\ncache_read = 0.1\ncache_write = 1.0\n",
        )
        .unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert!(config.validate().is_err());
        assert!(SyncEngine::from_config(&config).is_err());
    }
}
