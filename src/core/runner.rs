//! Executes pipelines, either through the bashful binary or serially.
//!
//! The resolved binary path is memoized per [`Runner`], so repeated runs
//! resolve it once.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use serde::Serialize;

use crate::config::RunnerConfig;
use crate::error::{Error, Result};
use crate::serial::SerialInvocation;
use crate::utils::shell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Serial,
    Delegated,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub mode: RunMode,
    pub program: String,
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<usize>,
    pub exit_code: i32,
}

pub struct Runner {
    config: RunnerConfig,
    cwd: PathBuf,
    search_path: Option<OsString>,
    binary: OnceLock<PathBuf>,
}

impl Runner {
    /// Create a runner using the process working directory and `PATH`.
    pub fn new(config: RunnerConfig) -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| Error::internal_io(e.to_string(), Some("resolve cwd".to_string())))?;
        Ok(Self::with_environment(config, cwd, std::env::var_os("PATH")))
    }

    /// Create a runner with an explicit working directory and search path.
    pub fn with_environment(
        config: RunnerConfig,
        cwd: PathBuf,
        search_path: Option<OsString>,
    ) -> Self {
        Self {
            config,
            cwd,
            search_path,
            binary: OnceLock::new(),
        }
    }

    /// Run bashful with `args`, or compile and run serially in serial mode.
    /// Child processes start in the runner's working directory.
    ///
    /// `extra_env` is added to the inherited environment of the delegated
    /// binary. A non-zero exit is an `execution.failed` error.
    pub fn run(&self, args: &[String], extra_env: &[(String, String)]) -> Result<RunOutcome> {
        if self.config.serial_mode {
            return self.run_serial(args);
        }

        let binary = self.binary()?;
        let program = binary.display().to_string();
        log_status!("run", "{}", shell::command_line(&program, args));

        let status = Command::new(binary)
            .args(args)
            .current_dir(&self.cwd)
            .envs(extra_env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .status()
            .map_err(|e| {
                Error::internal_io(e.to_string(), Some(format!("spawn {}", program)))
            })?;

        if !status.success() {
            return Err(Error::execution_failed(
                program,
                args.to_vec(),
                status.code(),
            ));
        }

        Ok(RunOutcome {
            mode: RunMode::Delegated,
            program,
            args: args.to_vec(),
            script_path: None,
            steps: None,
            exit_code: status.code().unwrap_or(0),
        })
    }

    fn run_serial(&self, args: &[String]) -> Result<RunOutcome> {
        let invocation = SerialInvocation::parse(args)?;
        let pipeline = if invocation.pipeline.is_absolute() {
            invocation.pipeline.clone()
        } else {
            self.cwd.join(&invocation.pipeline)
        };
        let invocation = SerialInvocation {
            pipeline,
            ..invocation
        };

        let execution = invocation.execute_in(&self.cwd)?;
        Ok(RunOutcome {
            mode: RunMode::Serial,
            program: "bash".to_string(),
            args: vec![execution.script_path.display().to_string()],
            script_path: Some(execution.script_path),
            steps: Some(execution.steps),
            exit_code: 0,
        })
    }

    /// Resolve the bashful binary, memoizing the first successful lookup.
    pub fn binary(&self) -> Result<&Path> {
        if let Some(path) = self.binary.get() {
            return Ok(path);
        }

        let resolved = self.resolve_binary()?;
        log_status!("run", "Using {}", resolved.display());
        Ok(self.binary.get_or_init(|| resolved))
    }

    fn resolve_binary(&self) -> Result<PathBuf> {
        let local = self.config.local_binary(&self.cwd);
        let mut tried = Vec::new();

        if !self.config.force_local {
            if let Some(found) = self.find_on_path(&mut tried) {
                return Ok(found);
            }
        }

        tried.push(local.display().to_string());
        if is_executable(&local) {
            return Ok(local);
        }

        Err(Error::runner_not_found(&self.config.binary_name, tried))
    }

    fn find_on_path(&self, tried: &mut Vec<String>) -> Option<PathBuf> {
        let search_path = self.search_path.as_ref()?;
        for dir in std::env::split_paths(search_path) {
            if dir.as_os_str().is_empty() {
                continue;
            }
            let candidate = dir.join(&self.config.binary_name);
            if is_executable(&candidate) {
                return Some(candidate);
            }
            tried.push(candidate.display().to_string());
        }
        None
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
