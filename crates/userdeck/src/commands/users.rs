//! User command handlers.

use std::fmt::Write as _;
use std::sync::Arc;

use tabled::Tabled;
use tracing::warn;
use userdeck_core::{FilterSelection, NewUser, Page, Profile, User, UserId, UserPatch};

use crate::cli::{GlobalOpts, OutputFormat, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::{Directory, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Profile")]
    profile: String,
    #[tabled(rename = "Active")]
    active: &'static str,
}

impl UserRow {
    fn new(user: &User, profiles: &[Profile]) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.full_name(),
            email: user.email.clone(),
            profile: util::profile_label(profiles, user.profile_id.as_ref()),
            active: yes_no(user.is_active),
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn detail(user: &User, profiles: &[Profile]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:       {}", user.id);
    let _ = writeln!(out, "Name:     {}", user.full_name());
    let _ = writeln!(out, "Email:    {}", user.email);
    let _ = writeln!(
        out,
        "Profile:  {}",
        util::profile_label(profiles, user.profile_id.as_ref())
    );
    let _ = write!(out, "Active:   {}", yes_no(user.is_active));
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    directory: &Directory,
    args: UsersArgs,
    page_size: u32,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        UsersCommand::List {
            page,
            limit,
            profile,
        } => {
            let selection = profile
                .as_deref()
                .map_or(FilterSelection::All, |name| name.parse().unwrap_or_default());
            let page = Page::new(page, limit.unwrap_or(page_size));
            list(directory, &selection, page, global).await
        }

        UsersCommand::Get { id } => {
            let id = UserId::from(id);
            let (user, profiles) = tokio::join!(directory.user(&id), labels(directory));
            print_user(global, &user?, &profiles)
        }

        UsersCommand::Create {
            first_name,
            last_name,
            email,
            profile,
            inactive,
        } => {
            let profiles = directory.profiles().await?;
            let profile_id = profile
                .as_deref()
                .map(|p| util::resolve_profile_id(&profiles, p))
                .transpose()?;
            let new_user = NewUser {
                first_name,
                last_name,
                email,
                profile_id,
                is_active: !inactive,
            };
            let created = directory.create_user(&new_user).await?;
            output::print_status(global, &format!("User {} created", created.id));
            print_user(global, &created, &profiles)
        }

        UsersCommand::Update {
            id,
            first_name,
            last_name,
            email,
            profile,
        } => {
            let profiles = directory.profiles().await?;
            let patch = UserPatch {
                first_name,
                last_name,
                email,
                profile_id: profile
                    .as_deref()
                    .map(|p| util::resolve_profile_id(&profiles, p))
                    .transpose()?,
                is_active: None,
            };
            if patch.is_empty() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "nothing to change; pass at least one field flag".into(),
                });
            }
            let updated = directory.update_user(&UserId::from(id), &patch).await?;
            output::print_status(global, &format!("User {} updated", updated.id));
            print_user(global, &updated, &profiles)
        }

        UsersCommand::Delete { id } => {
            if !util::confirm(
                &format!("Delete user '{id}'? This cannot be undone."),
                "users delete",
                global.yes,
            )? {
                return Ok(());
            }
            directory.delete_user(&UserId::from(id.as_str())).await?;
            output::print_status(global, &format!("User {id} deleted"));
            Ok(())
        }

        UsersCommand::Activate { id } => set_active(directory, &id, true, global).await,
        UsersCommand::Deactivate { id } => set_active(directory, &id, false, global).await,
    }
}

async fn list(
    directory: &Directory,
    selection: &FilterSelection,
    page: Page,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let profiles = match selection {
        // Labels only: a failing profiles endpoint must not hide the list.
        FilterSelection::All => labels(directory).await,
        FilterSelection::Profile(_) => directory.profiles().await?,
    };
    let filter = selection
        .resolve(&profiles)
        .ok_or_else(|| CliError::NotFound {
            message: format!("no profile named '{selection}'"),
            list_command: "profiles list".into(),
        })?;

    let users = directory.users_page(&filter, page).await?;
    let format = output::format(global);
    let out = output::render_list(
        format,
        users.as_slice(),
        |u| UserRow::new(u, &profiles),
        |u| u.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);

    if format == OutputFormat::Table && !global.quiet {
        let more = if u32::try_from(users.len()).is_ok_and(|n| n == page.size()) {
            ", more may follow (--page N)"
        } else {
            ""
        };
        eprintln!(
            "page {} · {} user(s) · filter: {selection}{more}",
            page.number(),
            users.len()
        );
    }
    Ok(())
}

async fn set_active(
    directory: &Directory,
    id: &str,
    is_active: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    directory.set_user_active(&UserId::from(id), is_active).await?;
    let verb = if is_active { "activated" } else { "deactivated" };
    output::print_status(global, &format!("User {id} {verb}"));
    Ok(())
}

/// Profiles for display labels; empty when the endpoint fails.
async fn labels(directory: &Directory) -> Arc<Vec<Profile>> {
    directory.profiles().await.unwrap_or_else(|err| {
        warn!(error = %err, "could not load profiles; showing raw ids");
        Arc::default()
    })
}

fn print_user(global: &GlobalOpts, user: &User, profiles: &[Profile]) -> Result<(), CliError> {
    let out = output::render_single(
        output::format(global),
        user,
        |u| detail(u, profiles),
        |u| u.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
