//! Shared helpers for command handlers.

use std::io::IsTerminal;

use userdeck_core::{Profile, ProfileId};

use crate::error::CliError;

/// Resolve `--profile` given as a name (case-insensitive) or an id.
pub fn resolve_profile_id(profiles: &[Profile], needle: &str) -> Result<ProfileId, CliError> {
    profiles
        .iter()
        .find(|p| p.id.as_str() == needle)
        .or_else(|| profiles.iter().find(|p| p.name_matches(needle)))
        .map(|p| p.id.clone())
        .ok_or_else(|| CliError::NotFound {
            message: format!("profile '{needle}' not found"),
            list_command: "profiles list".into(),
        })
}

/// Display name for a profile id, falling back to the raw id.
pub fn profile_label(profiles: &[Profile], id: Option<&ProfileId>) -> String {
    let Some(id) = id else {
        return String::new();
    };
    profiles
        .iter()
        .find(|p| &p.id == id)
        .map_or_else(|| id.to_string(), |p| p.name.clone())
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
