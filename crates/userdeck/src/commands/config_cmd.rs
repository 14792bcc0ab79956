//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::Input;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Defaults, Server};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display in TOML layout.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_server {
        let _ = writeln!(out, "default_server = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "page_size = {}", cfg.defaults.page_size);
    if let Some(stale) = cfg.defaults.stale_after {
        let _ = writeln!(out, "stale_after = {stale}");
    }

    for (name, server) in &cfg.servers {
        let _ = writeln!(out);
        let _ = writeln!(out, "[servers.{name}]");
        let _ = writeln!(out, "url = \"{}\"", server.url);
        if let Some(insecure) = server.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = server.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(page_size) = server.page_size {
            let _ = writeln!(out, "page_size = {page_size}");
        }
    }

    out.trim_end().to_owned()
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("userdeck configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let server_name: String = Input::new()
                .with_prompt("Server name")
                .default("local".into())
                .interact_text()
                .map_err(prompt_err)?;

            let url: String = Input::new()
                .with_prompt("API URL")
                .default("http://localhost:3333".into())
                .validate_with(|input: &String| -> Result<(), String> {
                    url::Url::parse(input)
                        .map(|_| ())
                        .map_err(|e| format!("not a valid URL: {e}"))
                })
                .interact_text()
                .map_err(prompt_err)?;

            let page_size: u32 = Input::new()
                .with_prompt("Users per page")
                .default(Defaults::default().page_size)
                .interact_text()
                .map_err(prompt_err)?;

            // Merge into any existing config rather than clobbering other servers
            let mut cfg = config::load_config_or_default();
            let mut server = Server::new(url);
            if page_size != cfg.defaults.page_size {
                server.page_size = Some(page_size.max(1));
            }
            cfg.servers.insert(server_name.clone(), server);
            cfg.default_server = Some(server_name.clone());

            let path = config::save_config(&cfg)?;
            output::print_status(global, &format!("Configuration written to {}", path.display()));
            if !global.quiet {
                eprintln!("  Default server: {server_name}");
                eprintln!("\n  Test it: userdeck users list");
            }
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(output::format(global), &cfg, format_config, |_| {
                config::config_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Servers ─────────────────────────────────────────────────
        ConfigCommand::Servers => {
            let cfg = config::load_config_or_default();
            if cfg.servers.is_empty() {
                eprintln!("No servers configured. Run: userdeck config init");
                return Ok(());
            }
            let default = cfg.default_server.as_deref().unwrap_or_default();
            for (name, server) in &cfg.servers {
                let marker = if name == default { " *" } else { "" };
                println!("{name}{marker}\t{}", server.url);
            }
            Ok(())
        }

        // ── Use <name> ──────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.servers.contains_key(&name) {
                return Err(CliError::ServerNotFound {
                    available: config::available_servers(&cfg),
                    name,
                });
            }

            cfg.default_server = Some(name.clone());
            config::save_config(&cfg)?;
            output::print_status(global, &format!("Default server set to '{name}'"));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatted_config_lists_server_overrides() {
        let mut cfg = Config::default();
        let mut server = Server::new("http://localhost:3333");
        server.timeout = Some(5);
        cfg.servers.insert("local".into(), server);

        let text = format_config(&cfg);
        assert!(text.starts_with("default_server = \"local\""));
        assert!(text.contains("[servers.local]\nurl = \"http://localhost:3333\"\ntimeout = 5"));
        assert!(!text.contains("stale_after"));
    }
}
