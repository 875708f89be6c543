//! Command handlers.

pub mod config_cmd;
pub mod notifications;
pub mod watch;

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;

/// Route a platform command to its handler.
pub async fn dispatch(cmd: Command, resolved: Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::List(args) => notifications::list(args, &resolved, global).await,
        Command::Unread => notifications::unread(&resolved, global).await,
        Command::Read(args) => notifications::read(args, &resolved, global).await,
        Command::ReadAll => notifications::read_all(&resolved, global).await,
        Command::Delete(args) => notifications::delete(args, &resolved, global).await,
        Command::Open(args) => notifications::open(args, &resolved, global).await,
        Command::Watch(args) => watch::handle(args, resolved, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "local commands are handled before dispatch".into(),
        )),
    }
}
