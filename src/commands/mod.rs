use std::path::PathBuf;

pub type CmdResult<T> = bashful_runner::Result<(T, i32)>;

pub(crate) struct GlobalArgs {
    /// Config file to read instead of the default location.
    pub(crate) config: Option<PathBuf>,
}

pub mod compile;
pub mod config;
pub mod exec;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (bashful_runner::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Exec(args) => dispatch!(args, global, exec),
        crate::Commands::Compile(args) => dispatch!(args, global, compile),
        crate::Commands::Config(args) => dispatch!(args, global, config),
    }
}
