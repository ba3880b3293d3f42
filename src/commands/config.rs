use std::path::Path;

use clap::{Args, Subcommand};
use serde::Serialize;

use bashful_runner::config::{self, RunnerConfig};

use super::CmdResult;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Display the effective configuration (file + environment)
    Show {
        /// Show only built-in defaults (ignore config.json)
        #[arg(long)]
        builtin: bool,
    },
    /// Show the path to config.json
    Path,
}

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<RunnerConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
}

pub fn run(args: ConfigArgs, global: &crate::commands::GlobalArgs) -> CmdResult<ConfigOutput> {
    let file = global.config.as_deref();
    match args.command {
        ConfigCommand::Show { builtin } => show(builtin, file),
        ConfigCommand::Path => path(file),
    }
}

fn show(builtin: bool, file: Option<&Path>) -> CmdResult<ConfigOutput> {
    let config = if builtin {
        RunnerConfig::default()
    } else {
        config::load_with(file)?
    };

    Ok((
        ConfigOutput {
            command: "config.show".to_string(),
            config: Some(config),
            path: None,
            exists: None,
        },
        0,
    ))
}

fn path(file: Option<&Path>) -> CmdResult<ConfigOutput> {
    let path = config::config_path_with(file)?;

    Ok((
        ConfigOutput {
            command: "config.path".to_string(),
            config: None,
            exists: Some(path.exists()),
            path: Some(path.display().to_string()),
        },
        0,
    ))
}
