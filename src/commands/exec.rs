use clap::Args;

use bashful_runner::config;
use bashful_runner::runner::{RunOutcome, Runner};

use super::CmdResult;

#[derive(Args)]
pub struct ExecArgs {
    /// Compile the pipeline to bash and run it instead of calling bashful
    #[arg(long)]
    pub serial: bool,

    /// Only use the bashful binary from the third-party directory
    #[arg(long)]
    pub force_local: bool,

    /// Extra environment variable for bashful (KEY=VALUE, repeatable)
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Arguments forwarded to bashful (e.g. run --tags ci pipeline.yml)
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

pub fn run(args: ExecArgs, global: &crate::commands::GlobalArgs) -> CmdResult<RunOutcome> {
    let mut config = config::load_with(global.config.as_deref())?;
    if args.serial {
        config.serial_mode = true;
    }
    if args.force_local {
        config.force_local = true;
    }

    let env = parse_env_pairs(&args.env)?;
    let runner = Runner::new(config)?;
    let outcome = runner.run(&args.args, &env)?;

    Ok((outcome, 0))
}

/// Parse `KEY=VALUE` pairs. The value may itself contain `=`.
fn parse_env_pairs(raw: &[String]) -> bashful_runner::Result<Vec<(String, String)>> {
    raw.iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
            _ => Err(bashful_runner::Error::validation_invalid_argument(
                "env",
                format!("Expected KEY=VALUE, got '{}'", pair),
                None,
                None,
            )),
        })
        .collect()
}
