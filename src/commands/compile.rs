use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use bashful_runner::serial::{SerialInvocation, Step, TagFilter};

use super::CmdResult;

#[derive(Args)]
pub struct CompileArgs {
    /// Pipeline file
    pub pipeline: PathBuf,

    /// Only include tasks carrying one of these tags (comma separated, repeatable)
    #[arg(long, num_args = 0..)]
    pub tags: Vec<String>,

    /// Also write the script next to the pipeline as <pipeline>.serial.sh
    #[arg(long)]
    pub write: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOutput {
    command: String,
    pipeline: String,
    #[serde(skip_serializing_if = "TagFilter::is_empty")]
    tags: TagFilter,
    steps: Vec<Step>,
    script: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    script_path: Option<String>,
}

pub fn run(args: CompileArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<CompileOutput> {
    let invocation = SerialInvocation {
        pipeline: args.pipeline,
        tags: TagFilter::from_raw(&args.tags),
    };

    let (compiled, script_path) = if args.write {
        let (compiled, path) = invocation.write()?;
        (compiled, Some(path.display().to_string()))
    } else {
        (invocation.compile()?, None)
    };

    Ok((
        CompileOutput {
            command: "compile".to_string(),
            pipeline: invocation.pipeline.display().to_string(),
            tags: invocation.tags,
            steps: compiled.steps,
            script: compiled.script,
            script_path,
        },
        0,
    ))
}
