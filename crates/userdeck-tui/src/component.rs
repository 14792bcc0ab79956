//! Component trait implemented by every screen and overlay.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

use crate::action::Action;

/// Lifecycle: (`handle_key_event` | `update` | `render`)*
pub trait Component: Send {
    /// Map a key to an action, or `None` to ignore it.
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// React to a dispatched action. May return a follow-up action.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect);

    /// While true, every key (including `q` and `?`) goes to this component.
    fn captures_input(&self) -> bool {
        false
    }
}
