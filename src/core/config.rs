//! Runner configuration.
//!
//! Settings come from `config.json` in `~/.config/bashful-runner/` (or the
//! file named by `BASHFUL_RUNNER_CONFIG`), then the `BASHFUL_SERIAL_MODE`
//! environment variable, then CLI flags. A missing file means built-in
//! defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::paths;
use crate::utils::io;

/// Environment variable that forces serial mode when set to `1` or `true`.
pub const SERIAL_MODE_ENV: &str = "BASHFUL_SERIAL_MODE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Compile pipelines to bash instead of delegating to bashful.
    #[serde(default)]
    pub serial_mode: bool,

    /// Skip the PATH lookup and only use the binary in `third_party_dir`.
    #[serde(default)]
    pub force_local: bool,

    #[serde(default = "default_binary_name")]
    pub binary_name: String,

    /// Directory holding a locally installed binary. Relative paths resolve
    /// against the working directory; `~` is expanded.
    #[serde(default = "default_third_party_dir")]
    pub third_party_dir: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            serial_mode: false,
            force_local: false,
            binary_name: default_binary_name(),
            third_party_dir: default_third_party_dir(),
        }
    }
}

fn default_binary_name() -> String {
    "bashful".to_string()
}

fn default_third_party_dir() -> String {
    "third-party".to_string()
}

impl RunnerConfig {
    /// Path of the locally installed binary for a given working directory.
    pub fn local_binary(&self, cwd: &Path) -> PathBuf {
        let dir = PathBuf::from(shellexpand::tilde(&self.third_party_dir).into_owned());
        let dir = if dir.is_absolute() { dir } else { cwd.join(dir) };
        dir.join(&self.binary_name)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(SERIAL_MODE_ENV) {
            if matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes") {
                self.serial_mode = true;
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.binary_name.trim().is_empty() {
            return Err(Error::config_invalid_value(
                "binary_name",
                Some(self.binary_name.clone()),
                "must not be empty",
            ));
        }
        if self.binary_name.contains(['/', '\\']) {
            return Err(Error::config_invalid_value(
                "binary_name",
                Some(self.binary_name.clone()),
                "must be a file name, not a path; use third_party_dir for the location",
            ));
        }
        Ok(())
    }
}

/// Load the effective configuration: file, then process environment.
pub fn load() -> Result<RunnerConfig> {
    load_with(None)
}

/// Like [`load`], reading `path` instead of the default config file.
pub fn load_with(path: Option<&Path>) -> Result<RunnerConfig> {
    let path = config_path_with(path)?;
    let config = load_from(&path)?.with_env(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

/// Path of the config file `load` reads.
pub fn config_path() -> Result<PathBuf> {
    config_path_with(None)
}

/// `path` when given, otherwise the default config file.
pub fn config_path_with(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())),
        None => paths::config_json(),
    }
}

/// Load configuration from a specific file; a missing file yields defaults.
pub fn load_from(path: &Path) -> Result<RunnerConfig> {
    if !path.exists() {
        return Ok(RunnerConfig::default());
    }

    let content = io::read_file(path, "read runner config")?;
    serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn explicit_path_overrides_default_location() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{"binary_name": "bashful-dev"}"#).unwrap();

        assert_eq!(config_path_with(Some(path.as_path())).unwrap(), path);
        assert_eq!(load_with(Some(path.as_path())).unwrap().binary_name, "bashful-dev");
    }

    #[test]
    fn explicit_path_is_validated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{"binary_name": "bin/bashful"}"#).unwrap();

        let err = load_with(Some(path.as_path())).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, RunnerConfig::default());
        assert_eq!(config.binary_name, "bashful");
    }

    #[test]
    fn partial_file_keeps_defaults_for_absent_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"serial_mode": true}"#).unwrap();

        let config = load_from(&path).unwrap();
        assert!(config.serial_mode);
        assert!(!config.force_local);
        assert_eq!(config.third_party_dir, "third-party");
    }

    #[test]
    fn invalid_json_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = load_from(&path).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_json");
    }

    #[test]
    fn env_enables_serial_mode() {
        let config = RunnerConfig::default().with_env(|key| {
            (key == SERIAL_MODE_ENV).then(|| "true".to_string())
        });
        assert!(config.serial_mode);
    }

    #[test]
    fn env_false_leaves_serial_mode_alone() {
        let config = RunnerConfig::default().with_env(|_| Some("0".to_string()));
        assert!(!config.serial_mode);
    }

    #[test]
    fn relative_third_party_dir_resolves_against_cwd() {
        let config = RunnerConfig::default();
        assert_eq!(
            config.local_binary(Path::new("/work")),
            PathBuf::from("/work/third-party/bashful")
        );
    }

    #[test]
    fn absolute_third_party_dir_is_used_as_is() {
        let config = RunnerConfig {
            third_party_dir: "/opt/tools".to_string(),
            ..RunnerConfig::default()
        };
        assert_eq!(
            config.local_binary(Path::new("/work")),
            PathBuf::from("/opt/tools/bashful")
        );
    }

    #[test]
    fn binary_name_with_separator_is_rejected() {
        let config = RunnerConfig {
            binary_name: "bin/bashful".to_string(),
            ..RunnerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
    }
}
