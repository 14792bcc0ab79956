//! Terminal setup and restoration, including on panic.

use std::io::{Stdout, stdout};

use color_eyre::eyre::Result;
use crossterm::{
    ExecutableCommand, cursor,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{Terminal, backend::CrosstermBackend};

pub type Backend = CrosstermBackend<Stdout>;

pub struct Tui {
    terminal: Terminal<Backend>,
}

impl Tui {
    /// Create the terminal handle without entering raw mode.
    pub fn new() -> Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        Ok(Self { terminal })
    }

    /// Alternate screen, raw mode, hidden cursor.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        stdout().execute(cursor::Hide)?;
        self.terminal.clear()?;
        Ok(())
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut ratatui::Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        restore();
    }
}

/// Best-effort terminal restoration; never fails.
fn restore() {
    let _ = stdout().execute(cursor::Show);
    let _ = stdout().execute(LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

/// Install color-eyre hooks whose panic handler restores the terminal first.
///
/// Call before entering the terminal so early panics print cleanly too.
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;

    let panic_hook = panic_hook.into_panic_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore();
        panic_hook(info);
    }));
    Ok(())
}
