//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod resource;
pub mod util;

use crease_core::League;

use crate::cli::{Command, OutputFormat};
use crate::error::CliError;

/// Per-invocation settings shared by every handler.
pub struct Context {
    pub profile: String,
    pub output: OutputFormat,
    pub quiet: bool,
    pub yes: bool,
}

/// Dispatch a backend-bound command to the resource handler.
pub async fn dispatch(cmd: Command, league: &League, ctx: &Context) -> Result<(), CliError> {
    let target = cmd.resource();
    match (cmd, target) {
        (
            Command::Teams(args)
            | Command::Tournaments(args)
            | Command::Players(args)
            | Command::Fixtures(args)
            | Command::Sponsors(args)
            | Command::Voting(args)
            | Command::Users(args),
            Some(target),
        ) => resource::handle(league, target, args, ctx).await,
        // Config and Completions are handled before dispatch
        _ => Err(CliError::Internal(
            "command does not target a league resource".into(),
        )),
    }
}
