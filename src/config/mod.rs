pub mod settings;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::core::SerializeOptions;

/// User-facing settings. Missing fields in a stored file fall back to their
/// defaults, so older files keep loading as fields are added.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    pub api_base_url: String,
    /// Name of the environment variable holding the API token. The token
    /// itself is never written to disk.
    pub token_env_var: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub indent_width: usize,
    pub directory_marker: String,
    pub default_owner: String,
    pub default_repo: String,
}

impl ViewerConfig {
    /// Loads the settings from `config_dir`, or from the platform config
    /// directory when none is given.
    pub fn load(config_dir: Option<&Path>) -> Result<Self> {
        settings::load_config(config_dir)
    }

    /// Reads the API token from the configured environment variable.
    /// Blank values count as absent.
    pub fn access_token(&self) -> Option<String> {
        std::env::var(&self.token_env_var)
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions {
            indent_width: self.indent_width,
            directory_marker: self.directory_marker.clone(),
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            token_env_var: "GITHUB_TOKEN".to_string(),
            user_agent: concat!("repo-tree/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 30,
            indent_width: 2,
            directory_marker: String::new(),
            default_owner: "facebook".to_string(),
            default_repo: "react".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_partial_config_uses_defaults_for_missing_fields() {
        let config: ViewerConfig =
            serde_json::from_str(r#"{"default_owner": "rust-lang", "indent_width": 4}"#).unwrap();
        assert_eq!(config.default_owner, "rust-lang");
        assert_eq!(config.indent_width, 4);
        assert_eq!(config.default_repo, "react");
        assert_eq!(config.api_base_url, "https://api.github.com");
    }

    #[test]
    fn test_load_from_explicit_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"default_owner": "tokio-rs", "default_repo": "tokio"}"#,
        )
        .unwrap();

        let config = ViewerConfig::load(Some(dir.path())).unwrap();
        assert_eq!(config.default_owner, "tokio-rs");
        assert_eq!(config.default_repo, "tokio");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_serialize_options_follow_config() {
        let config = ViewerConfig {
            indent_width: 3,
            directory_marker: ">".to_string(),
            ..Default::default()
        };
        let options = config.serialize_options();
        assert_eq!(options.indent_width, 3);
        assert_eq!(options.directory_marker, ">");
    }

    #[test]
    #[serial]
    fn test_access_token_reads_configured_variable() {
        let config = ViewerConfig {
            token_env_var: "REPO_TREE_TEST_TOKEN".to_string(),
            ..Default::default()
        };

        std::env::set_var("REPO_TREE_TEST_TOKEN", "  ghp_example  ");
        assert_eq!(config.access_token().as_deref(), Some("ghp_example"));

        std::env::set_var("REPO_TREE_TEST_TOKEN", "   ");
        assert_eq!(config.access_token(), None);

        std::env::remove_var("REPO_TREE_TEST_TOKEN");
        assert_eq!(config.access_token(), None);
    }
}
