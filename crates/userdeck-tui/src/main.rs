//! `userdeck-tui`: terminal UI for browsing and editing users.
//!
//! Built on [ratatui](https://ratatui.rs) over `userdeck-core`'s
//! [`UserListViewModel`]. One screen lists a page of users with a profile
//! filter; overlays create, edit and delete them.
//!
//! Logs go to a file (default `<temp dir>/userdeck-tui.log`) so they never
//! corrupt the terminal.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screens;
mod theme;
mod tui;

use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use userdeck_core::{UserDirectory, UserListViewModel};

use crate::app::App;

/// Terminal UI for browsing and editing users.
#[derive(Parser, Debug)]
#[command(name = "userdeck-tui", version, about)]
struct Cli {
    /// Server entry from the config file
    #[arg(short = 'S', long, env = "USERDECK_SERVER")]
    server: Option<String>,

    /// API base URL, overriding the config file
    #[arg(short = 'u', long, env = "USERDECK_API_URL")]
    url: Option<String>,

    /// Log file path (defaults to userdeck-tui.log in the temp dir)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-only tracing; stdout and stderr belong to the terminal UI.
/// Hold the returned guard until exit so buffered lines are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("userdeck_tui={log_level},userdeck_core={log_level}"))
    });

    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("userdeck-tui.log"));
    let temp_dir = std::env::temp_dir();
    let log_dir = log_file.parent().unwrap_or(temp_dir.as_path());
    let log_name = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("userdeck-tui.log"));

    let appender = tracing_appender::rolling::never(dir_or_cwd(log_dir), log_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

/// A bare file name has an empty parent.
fn dir_or_cwd(dir: &Path) -> &Path {
    if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Before entering the terminal, so early panics print cleanly
    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli);

    let cfg = userdeck_config::load_config().wrap_err("failed to load configuration")?;
    let api = userdeck_config::resolve_api_config(&cfg, cli.server.as_deref(), cli.url.as_deref())
        .wrap_err("no usable API server; pass --url or add one with `userdeck config init`")?;

    info!(url = %api.base_url, page_size = api.page_size, "starting userdeck-tui");

    let label = api.base_url.to_string();
    let directory = UserDirectory::connect(&api)?;
    let view_model = UserListViewModel::new(directory, api.page_size);

    let mut app = App::new(view_model, label);
    app.run().await
}
