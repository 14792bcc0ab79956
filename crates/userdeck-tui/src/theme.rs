//! Palette and semantic styles for the TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Palette ───────────────────────────────────────────────────────────

pub const ACCENT: Color = Color::Rgb(225, 53, 255); // #e135ff
pub const CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const RED: Color = Color::Rgb(255, 99, 99); // #ff6363
pub const TEXT: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const MUTED: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29

// ── Semantic Styles ───────────────────────────────────────────────────

pub fn title_style() -> Style {
    Style::default().fg(CYAN).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(ACCENT)
}

pub fn table_header() -> Style {
    Style::default()
        .fg(CYAN)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::default().fg(TEXT)
}

/// Deactivated users are listed dimmed.
pub fn table_row_inactive() -> Style {
    Style::default().fg(MUTED).add_modifier(Modifier::ITALIC)
}

pub fn table_selected() -> Style {
    Style::default()
        .fg(ACCENT)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn key_hint() -> Style {
    Style::default().fg(MUTED)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(CYAN).add_modifier(Modifier::BOLD)
}

pub fn notice_success() -> Style {
    Style::default().fg(GREEN)
}

pub fn notice_error() -> Style {
    Style::default().fg(RED)
}

pub fn loading() -> Style {
    Style::default().fg(YELLOW)
}

/// Field label in the form overlay.
pub fn form_label(focused: bool) -> Style {
    if focused {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT)
    }
}

pub fn overlay_background() -> Style {
    Style::default().bg(BG_DARK)
}
