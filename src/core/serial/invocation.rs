use std::path::{Path, PathBuf};
use std::process::Command;

use clap::Parser;
use serde::Serialize;

use super::compiler::{self, Step};
use super::tags::TagFilter;
use crate::error::{Error, Result};
use crate::pipeline;
use crate::utils::io;

/// Arguments accepted after the `run` verb, mirroring `bashful run`.
#[derive(Parser, Debug)]
#[command(name = "run", no_binary_name = true, disable_help_flag = true)]
struct RunArgs {
    /// Only run tasks carrying one of these tags (comma separated, repeatable)
    #[arg(long, num_args = 0..)]
    tags: Vec<String>,

    /// Pipeline file
    pipeline: PathBuf,
}

/// A parsed `run` request for serial mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialInvocation {
    pub pipeline: PathBuf,
    pub tags: TagFilter,
}

/// A compiled pipeline ready to be written and executed.
#[derive(Debug, Clone, Serialize)]
pub struct SerialScript {
    pub steps: Vec<Step>,
    pub script: String,
}

impl SerialInvocation {
    /// Parse raw bashful arguments. Only `run` is supported; any other verb
    /// fails before the pipeline file is touched.
    pub fn parse(args: &[String]) -> Result<Self> {
        let (verb, rest) = match args.split_first() {
            Some((verb, rest)) if verb == "run" => (verb, rest),
            Some((verb, _)) => return Err(Error::serial_unsupported_operation(Some(verb.clone()))),
            None => return Err(Error::serial_unsupported_operation(None)),
        };

        let parsed = RunArgs::try_parse_from(rest).map_err(|e| {
            Error::validation_invalid_argument(
                verb.as_str(),
                e.to_string().trim().to_string(),
                None,
                Some(vec!["run [--tags TAG,...] <pipeline>".to_string()]),
            )
        })?;

        Ok(Self {
            pipeline: parsed.pipeline,
            tags: TagFilter::from_raw(&parsed.tags),
        })
    }

    /// Where the compiled script is written: next to the pipeline, with
    /// `.serial.sh` appended to the full file name.
    pub fn script_path(&self) -> PathBuf {
        script_path_for(&self.pipeline)
    }

    pub fn compile(&self) -> Result<SerialScript> {
        let pipeline = pipeline::load(&self.pipeline)?;
        let steps = compiler::compile(&pipeline.tasks, &self.tags);
        let script = compiler::render(&steps);

        log_status!(
            "serial",
            "Compiled {} step(s) from {}",
            steps.len(),
            self.pipeline.display()
        );

        Ok(SerialScript { steps, script })
    }

    /// Compile and persist the script, returning its path.
    pub fn write(&self) -> Result<(SerialScript, PathBuf)> {
        let compiled = self.compile()?;
        let path = self.script_path();
        io::write_script(&path, &compiled.script, "write serial script")?;
        log_status!("serial", "Wrote {}", path.display());
        Ok((compiled, path))
    }

    /// Compile, persist, and run the script with bash in the current
    /// directory.
    pub fn execute(&self) -> Result<SerialExecution> {
        self.run_script(None)
    }

    /// Like [`execute`](Self::execute), with bash started in `cwd`.
    pub fn execute_in(&self, cwd: &Path) -> Result<SerialExecution> {
        self.run_script(Some(cwd))
    }

    fn run_script(&self, cwd: Option<&Path>) -> Result<SerialExecution> {
        let (compiled, path) = self.write()?;
        let path_arg = path.display().to_string();

        let mut command = Command::new("bash");
        command.arg(&path);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        let status = command
            .status()
            .map_err(|e| Error::internal_io(e.to_string(), Some("spawn bash".to_string())))?;

        if !status.success() {
            return Err(Error::execution_failed(
                "bash",
                vec![path_arg],
                status.code(),
            ));
        }

        Ok(SerialExecution {
            script_path: path,
            steps: compiled.steps.len(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerialExecution {
    pub script_path: PathBuf,
    pub steps: usize,
}

pub fn script_path_for(pipeline: &Path) -> PathBuf {
    let mut name = pipeline.as_os_str().to_os_string();
    name.push(".serial.sh");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn parse_run_with_tags() {
        let inv = SerialInvocation::parse(&args(&["run", "--tags", "a,b", "c", "--", "ci.yml"]))
            .unwrap();
        assert_eq!(inv.pipeline, PathBuf::from("ci.yml"));
        assert_eq!(inv.tags, TagFilter::from_raw(&["a", "b", "c"]));
    }

    #[test]
    fn parse_run_without_tags() {
        let inv = SerialInvocation::parse(&args(&["run", "ci.yml"])).unwrap();
        assert!(inv.tags.is_empty());
    }

    #[test]
    fn parse_repeated_tags_accumulate() {
        let inv = SerialInvocation::parse(&args(&["run", "ci.yml", "--tags", "a", "--tags", "b"]))
            .unwrap();
        assert_eq!(inv.tags, TagFilter::from_raw(&["a", "b"]));
    }

    #[test]
    fn other_verbs_are_unsupported() {
        let err = SerialInvocation::parse(&args(&["bundle", "/nonexistent/ci.yml"])).unwrap_err();
        assert_eq!(err.code, ErrorCode::SerialUnsupportedOperation);
    }

    #[test]
    fn no_arguments_is_unsupported() {
        let err = SerialInvocation::parse(&[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::SerialUnsupportedOperation);
    }

    #[test]
    fn bare_tags_flag_is_empty_filter() {
        let inv = SerialInvocation::parse(&args(&["run", "--tags", "--", "p.yml"])).unwrap();
        assert_eq!(inv.pipeline, PathBuf::from("p.yml"));
        assert!(inv.tags.is_empty());
    }

    #[test]
    fn run_without_pipeline_is_invalid_argument() {
        let err = SerialInvocation::parse(&args(&["run"])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationInvalidArgument);
    }

    #[test]
    fn script_path_appends_suffix() {
        assert_eq!(
            script_path_for(Path::new("ci/pipeline.yml")),
            PathBuf::from("ci/pipeline.yml.serial.sh")
        );
    }

    #[test]
    fn malformed_pipeline_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = dir.path().join("bad.yml");
        std::fs::write(&pipeline, "steps: []\n").unwrap();

        let inv = SerialInvocation {
            pipeline: pipeline.clone(),
            tags: TagFilter::new(),
        };
        let err = inv.execute().unwrap_err();

        assert_eq!(err.code, ErrorCode::PipelineMalformed);
        assert!(!script_path_for(&pipeline).exists());
    }
}
