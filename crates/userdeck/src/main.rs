mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use userdeck_core::UserDirectory;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let mut cli = Cli::parse();

    init_tracing(cli.global.verbose);

    let cfg = config::load_config_or_default();
    config::apply_defaults(&mut cli.global, &cfg.defaults);

    if let Err(err) = run(cli, &cfg).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli, cfg: &config::Config) -> Result<(), CliError> {
    match cli.command {
        // Config commands never talk to the API
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "userdeck", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let api = config::resolve_api_config(&cli.global, cfg)?;
            tracing::debug!(url = %api.base_url, timeout = ?api.timeout, "resolved API config");
            let page_size = api.page_size;
            let directory = UserDirectory::connect(&api)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &directory, page_size, &cli.global).await
        }
    }
}
