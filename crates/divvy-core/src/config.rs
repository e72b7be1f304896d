//! Configuration management for Divvy.
//!
//! Loads configuration from ${DIVVY_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Returns the default config template with comments.
///
/// Embedded from default_config.toml at compile time; edit that file to
/// change the template.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Optional API base URL (for staging or mock servers).
    pub api_base_url: Option<String>,
}

impl Config {
    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Returns the configured base URL if set and non-empty.
    pub fn effective_api_base_url(&self) -> Option<&str> {
        self.api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

pub mod paths {
    //! Path resolution for Divvy configuration and data directories.
    //!
    //! DIVVY_HOME resolution order:
    //! 1. DIVVY_HOME environment variable (if set)
    //! 2. ~/.config/divvy (default)

    use std::path::PathBuf;

    /// Returns the Divvy home directory.
    ///
    /// Checks DIVVY_HOME env var first, falls back to ~/.config/divvy
    pub fn divvy_home() -> PathBuf {
        if let Ok(home) = std::env::var("DIVVY_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("divvy"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        divvy_home().join("config.toml")
    }

    /// Returns the path to the credentials.json file.
    pub fn credentials_path() -> PathBuf {
        divvy_home().join("credentials.json")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    /// Config loading: missing file returns defaults.
    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.api_base_url, None);
    }

    /// Config loading: file value is picked up.
    #[test]
    fn test_load_reads_api_base_url() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            "api_base_url = \"https://staging.divvy.app\"\n",
        )
        .unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(
            config.effective_api_base_url(),
            Some("https://staging.divvy.app")
        );
    }

    /// Base URL: empty/whitespace treated as unset.
    #[test]
    fn test_api_base_url_empty_is_none() {
        let config = Config {
            api_base_url: Some("   ".to_string()),
        };
        assert_eq!(config.effective_api_base_url(), None);
    }

    /// Config loading: malformed TOML is an error, not a silent default.
    #[test]
    fn test_load_malformed_config_errors() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "api_base_url = [not toml\n").unwrap();

        assert!(Config::load_from(&config_path).is_err());
    }

    /// Config init: creates file with template, creates parent dirs.
    #[test]
    fn test_init_creates_config_with_template() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        assert!(config_path.exists());
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# Divvy Configuration"));
        assert!(contents.contains("# api_base_url ="));
    }

    /// Config init: fails if file exists (no silent overwrite).
    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "").unwrap();

        let result = Config::init(&config_path);
        assert!(result.is_err());
    }

    /// Paths: DIVVY_HOME env var wins over the home-dir default.
    #[test]
    fn test_divvy_home_env_override() {
        // Env mutation is process-wide; keep this the only test touching it.
        unsafe { std::env::set_var("DIVVY_HOME", "/tmp/divvy-test-home") };
        let home = paths::divvy_home();
        unsafe { std::env::remove_var("DIVVY_HOME") };

        assert_eq!(home, std::path::PathBuf::from("/tmp/divvy-test-home"));
        assert!(
            paths::config_path()
                .to_string_lossy()
                .ends_with("config.toml")
        );
    }
}
