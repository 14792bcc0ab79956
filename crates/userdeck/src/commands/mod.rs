//! Command dispatch: bridges CLI args -> directory calls -> output formatting.

pub mod config_cmd;
pub mod profiles;
pub mod users;
pub mod util;

use userdeck_core::{HttpUserService, UserDirectory};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// The directory every API-bound command runs against.
pub type Directory = UserDirectory<HttpUserService>;

/// Dispatch an API-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    directory: &Directory,
    page_size: u32,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Users(args) => users::handle(directory, args, page_size, global).await,
        Command::Profiles(args) => profiles::handle(directory, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command does not use the API".into(),
        )),
    }
}
