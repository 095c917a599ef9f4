pub type CmdResult<T> = dashclone::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

pub mod clone;
pub mod config;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (dashclone::Result<serde_json::Value>, i32) {
    crate::tty::status("dashclone is working...");

    match command {
        crate::Commands::Clone(args) => dispatch!(args, global, clone),
        crate::Commands::Config(args) => dispatch!(args, global, config),
    }
}
