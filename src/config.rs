//! Configuration loading and management
//!
//! Handles parsing of `.projectpro.toml` configuration files. Lookup order:
//! the store root, then the per-user config directory, then defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::calendar::WeekStart;
use crate::error::{Error, Result};
use crate::model::Priority;

/// File name of the root-level configuration
pub const CONFIG_FILE: &str = ".projectpro.toml";

/// File name inside the per-user config directory
const USER_CONFIG_FILE: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Session identity
    #[serde(default)]
    pub session: SessionConfig,

    /// Task defaults
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Calendar rendering
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Agenda and upcoming listings
    #[serde(default)]
    pub agenda: AgendaConfig,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Owner id used when no `--user` is given
    #[serde(default = "default_user")]
    pub user: String,
}

fn default_user() -> String {
    "local".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
        }
    }
}

/// Task configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Priority for new projects and tasks when none is given
    #[serde(default = "default_priority")]
    pub default_priority: Priority,
}

fn default_priority() -> Priority {
    Priority::Medium
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_priority: default_priority(),
        }
    }
}

/// Calendar configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// First day of the week in month grids
    #[serde(default)]
    pub week_start: WeekStart,
}

/// Agenda configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgendaConfig {
    /// Days covered by `upcoming` when `--days` is not given
    #[serde(default = "default_upcoming_days")]
    pub upcoming_days: u32,
}

fn default_upcoming_days() -> u32 {
    7
}

impl Default for AgendaConfig {
    fn default() -> Self {
        Self {
            upcoming_days: default_upcoming_days(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration for a store root, or fall back to defaults.
    ///
    /// Invalid files are skipped with a warning.
    pub fn discover(root: &Path) -> Self {
        let candidates = [Some(root.join(CONFIG_FILE)), user_config_path()];
        for path in candidates.into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            match Self::load(&path) {
                Ok(config) => {
                    tracing::debug!(path = %path.display(), "loaded config");
                    return config;
                }
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "ignoring invalid config"
                    );
                }
            }
        }
        Self::default()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.session.user.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "session.user cannot be empty".to_string(),
            ));
        }
        if self.agenda.upcoming_days == 0 || self.agenda.upcoming_days > 366 {
            return Err(Error::InvalidConfig(
                "agenda.upcoming_days must be between 1 and 366".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-user config file, when the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "projectpro")
        .map(|dirs| dirs.config_dir().join(USER_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.session.user, "local");
        assert_eq!(cfg.tasks.default_priority, Priority::Medium);
        assert_eq!(cfg.calendar.week_start, WeekStart::Sunday);
        assert_eq!(cfg.agenda.upcoming_days, 7);
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        let content = r#"
[session]
user = "alice"

[tasks]
default_priority = "urgent"

[calendar]
week_start = "monday"

[agenda]
upcoming_days = 14
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.session.user, "alice");
        assert_eq!(cfg.tasks.default_priority, Priority::Urgent);
        assert_eq!(cfg.calendar.week_start, WeekStart::Monday);
        assert_eq!(cfg.agenda.upcoming_days, 14);
    }

    #[test]
    fn invalid_values_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[agenda]\nupcoming_days = 0").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            Error::InvalidConfig(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_priority_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[tasks]\ndefault_priority = \"someday\"").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        assert!(matches!(err, Error::TomlParse(_)));
    }

    #[test]
    fn save_writes_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.toml");
        Config::default().save(&path).expect("save config");

        let written = fs::read_to_string(&path).expect("read config");
        assert!(written.contains("user = \"local\""));
        assert!(written.contains("week_start = \"sunday\""));
    }
}
