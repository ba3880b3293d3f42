use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV: &str = "BASHFUL_RUNNER_CONFIG";

/// Base config directory (~/.config/bashful-runner/, %APPDATA% on Windows)
pub fn config_dir() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("bashful-runner"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("bashful-runner"))
    }
}

/// Runner config file path, honoring `BASHFUL_RUNNER_CONFIG`.
pub fn config_json() -> Result<PathBuf> {
    match env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(config_dir()?.join("config.json")),
    }
}
