//! Profile command handlers.

use tabled::Tabled;
use userdeck_core::Profile;

use crate::cli::{GlobalOpts, ProfilesArgs, ProfilesCommand};
use crate::error::CliError;
use crate::output;

use super::Directory;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&Profile> for ProfileRow {
    fn from(p: &Profile) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    directory: &Directory,
    args: ProfilesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ProfilesCommand::List => {
            let profiles = directory.profiles().await?;
            let out = output::render_list(
                output::format(global),
                profiles.as_slice(),
                |p| ProfileRow::from(p),
                |p| p.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
