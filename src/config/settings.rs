use anyhow::Result;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use super::ViewerConfig;

const APP_NAME: &str = "RepoTree";
const CONFIG_FILE: &str = "config.json";

/// Returns the platform-specific configuration directory for the application.
pub fn get_config_directory() -> Option<PathBuf> {
    ProjectDirs::from("com", "repotree", APP_NAME)
        .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
}

/// Returns the full path to the configuration file, inside `config_dir` when
/// given, otherwise inside the platform directory.
pub fn get_config_file_path(config_dir: Option<&Path>) -> Option<PathBuf> {
    match config_dir {
        Some(dir) => Some(dir.join(CONFIG_FILE)),
        None => get_config_directory().map(|dir| dir.join(CONFIG_FILE)),
    }
}

/// Loads the configuration file.
/// If the file doesn't exist, it creates a default one.
/// If the file cannot be parsed, it logs a warning and falls back to the
/// default configuration instead of failing.
pub fn load_config(config_dir: Option<&Path>) -> Result<ViewerConfig> {
    let config_path = get_config_file_path(config_dir)
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    if !config_path.exists() {
        tracing::info!(
            "Config file not found, creating default config at {:?}",
            config_path
        );
        let default_config = ViewerConfig::default();
        save_config(&default_config, config_dir)?;
        return Ok(default_config);
    }

    let config_content = fs::read_to_string(&config_path)?;

    match serde_json::from_str::<ViewerConfig>(&config_content) {
        Ok(config) => {
            tracing::info!("Loaded config from {:?}", config_path);
            Ok(config)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse config file at {:?}: {}. Falling back to default config.",
                config_path,
                e
            );
            Ok(ViewerConfig::default())
        }
    }
}

/// Saves the provided configuration to the config file.
pub fn save_config(config: &ViewerConfig, config_dir: Option<&Path>) -> Result<()> {
    let config_path = get_config_file_path(config_dir)
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    if let Some(dir) = config_path.parent() {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
            tracing::info!("Created config directory: {:?}", dir);
        }
    }

    let config_json = serde_json::to_string_pretty(config)?;
    fs::write(&config_path, config_json)?;
    tracing::info!("Saved config to {:?}", config_path);

    Ok(())
}

// Platform-specific configuration paths for reference:
// macOS:   ~/Library/Application Support/com.repotree.RepoTree/
// Linux:   ~/.config/repotree/
// Windows: %APPDATA%/repotree/RepoTree/config/

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_creates_default() {
        let dir = tempdir().unwrap();
        let config_dir = dir.path().join("nested");

        let config = load_config(Some(&config_dir)).unwrap();

        assert_eq!(config, ViewerConfig::default());
        assert!(config_dir.join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let config = ViewerConfig {
            default_owner: "tokio-rs".to_string(),
            default_repo: "tokio".to_string(),
            directory_marker: "+".to_string(),
            ..Default::default()
        };

        save_config(&config, Some(dir.path())).unwrap();
        let loaded = load_config(Some(dir.path())).unwrap();
        assert_eq!(loaded, config);
    }

    #[tracing_test::traced_test]
    #[test]
    fn test_corrupted_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();

        let config = load_config(Some(dir.path())).unwrap();

        assert_eq!(config, ViewerConfig::default());
        assert!(logs_contain("Falling back to default config"));
    }
}
