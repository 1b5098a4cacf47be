//! Configuration file support for waitloops.
//!
//! Loads defaults from `waitloops.toml` in the working directory, falling
//! back to the user config at `~/.config/waitloops/config.toml`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use waitloops_core::{Mode, PolicyOption};
use waitloops_logging::LogFormat;

/// Wait settings loaded from a config file. Every field is optional.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WaitConfig {
    pub mode: Option<Mode>,
    /// e.g. `"3s"`, `"1m 30s"`
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    pub attempts: Option<u32>,
    #[serde(default, with = "humantime_serde")]
    pub gap: Option<Duration>,
    pub log_format: Option<LogFormat>,
    #[serde(default)]
    pub command: CommandConfig,
}

/// How the probed command is launched
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CommandConfig {
    /// Shell used to run the command line, e.g. `"sh -c"`
    pub shell: Option<String>,
}

/// The project config file name
pub const CONFIG_FILE_NAME: &str = "waitloops.toml";

/// Directory under the user config dir holding the global config
pub const GLOBAL_CONFIG_DIR: &str = "waitloops";
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";

impl WaitConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        Self::load_from(&config_path).map(Some)
    }

    /// Load the user-level config, if there is one.
    pub fn load_global() -> Result<Option<Self>> {
        let Some(path) = Self::global_path() else {
            return Ok(None);
        };

        if !path.exists() {
            return Ok(None);
        }

        Self::load_from(&path).map(Some)
    }

    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE))
    }

    /// Load an explicit config file. A missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: WaitConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if config.timeout.is_some() && config.attempts.is_some() {
            anyhow::bail!(
                "{}: `timeout` and `attempts` are mutually exclusive",
                path.display()
            );
        }

        Ok(config)
    }

    /// Fill unset fields of `self` from `fallback`.
    ///
    /// A budget set in `self` (timeout or attempts) shadows both budget
    /// fields of `fallback`.
    pub fn or(self, fallback: WaitConfig) -> WaitConfig {
        let has_budget = self.timeout.is_some() || self.attempts.is_some();
        WaitConfig {
            mode: self.mode.or(fallback.mode),
            timeout: if has_budget { self.timeout } else { fallback.timeout },
            attempts: if has_budget { self.attempts } else { fallback.attempts },
            gap: self.gap.or(fallback.gap),
            log_format: self.log_format.or(fallback.log_format),
            command: CommandConfig {
                shell: self.command.shell.or(fallback.command.shell),
            },
        }
    }

    /// Policy options in the order they should be applied
    pub fn policy_options(&self) -> Vec<PolicyOption> {
        let mut options = Vec::new();
        if let Some(timeout) = self.timeout {
            options.push(PolicyOption::Timeout(timeout));
        }
        if let Some(attempts) = self.attempts {
            options.push(PolicyOption::Attempts(attempts));
        }
        if let Some(gap) = self.gap {
            options.push(PolicyOption::Gap(gap));
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(content: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), content).unwrap();
        dir
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(WaitConfig::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_full_config() {
        let dir = write_config(
            r#"
mode = "continual-success"
timeout = "1m 30s"
gap = "100ms"
log_format = "compact"

[command]
shell = "sh -c"
"#,
        );
        let config = WaitConfig::load(dir.path()).unwrap().unwrap();
        assert_eq!(config.mode, Some(Mode::ContinualSuccess));
        assert_eq!(config.timeout, Some(Duration::from_secs(90)));
        assert_eq!(config.gap, Some(Duration::from_millis(100)));
        assert_eq!(config.log_format, Some(LogFormat::Compact));
        assert_eq!(config.command.shell.as_deref(), Some("sh -c"));
        assert_eq!(
            config.policy_options(),
            vec![
                PolicyOption::Timeout(Duration::from_secs(90)),
                PolicyOption::Gap(Duration::from_millis(100)),
            ]
        );
    }

    #[test]
    fn test_unknown_key_is_error() {
        let dir = write_config("retries = 3\n");
        let err = WaitConfig::load(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse"));
    }

    #[test]
    fn test_budget_conflict_is_error() {
        let dir = write_config("timeout = \"2s\"\nattempts = 4\n");
        let err = WaitConfig::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn test_bad_duration_is_error() {
        let dir = write_config("gap = \"soon\"\n");
        assert!(WaitConfig::load(dir.path()).is_err());
    }

    #[test]
    fn test_or_prefers_self() {
        let project = WaitConfig {
            attempts: Some(5),
            ..Default::default()
        };
        let global = WaitConfig {
            mode: Some(Mode::ContinualSuccess),
            timeout: Some(Duration::from_secs(10)),
            gap: Some(Duration::from_millis(50)),
            ..Default::default()
        };

        let merged = project.or(global);
        assert_eq!(merged.attempts, Some(5));
        // the project budget shadows the global timeout
        assert_eq!(merged.timeout, None);
        assert_eq!(merged.mode, Some(Mode::ContinualSuccess));
        assert_eq!(merged.gap, Some(Duration::from_millis(50)));
    }
}
