//! Create/edit form overlay.
//!
//! The form owns only its focus; field values live in the view-model's
//! draft and arrive with each snapshot. Key presses become
//! [`Action::EditField`] and the app applies them with [`apply_create`] /
//! [`apply_edit`].

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use userdeck_core::{EditDraft, ListSnapshot, NoticeKind, Profile, ProfileId, UserDraft};

use crate::action::{Action, FieldEdit, FormField};
use crate::theme;

// ── Draft edits ──────────────────────────────────────────────────────

fn edit_text(value: &mut String, edit: FieldEdit) {
    match edit {
        FieldEdit::Insert(c) => value.push(c),
        FieldEdit::Backspace => {
            value.pop();
        }
        FieldEdit::Cycle(_) | FieldEdit::Toggle => {}
    }
}

/// Step through `(none) -> each profile -> (none)`.
fn cycle_profile(current: &mut Option<ProfileId>, step: i8, profiles: &[Profile]) {
    let slots = profiles.len() + 1;
    let position = current
        .as_ref()
        .and_then(|id| profiles.iter().position(|p| &p.id == id))
        .map_or(0, |i| i + 1);
    let next = if step >= 0 {
        (position + 1) % slots
    } else {
        (position + slots - 1) % slots
    };
    *current = next
        .checked_sub(1)
        .and_then(|i| profiles.get(i))
        .map(|p| p.id.clone());
}

pub fn apply_create(draft: &mut UserDraft, field: FormField, edit: FieldEdit, profiles: &[Profile]) {
    match field {
        FormField::FirstName => edit_text(&mut draft.first_name, edit),
        FormField::LastName => edit_text(&mut draft.last_name, edit),
        FormField::Email => edit_text(&mut draft.email, edit),
        FormField::Profile => match edit {
            FieldEdit::Cycle(step) => cycle_profile(&mut draft.profile_id, step, profiles),
            FieldEdit::Toggle => cycle_profile(&mut draft.profile_id, 1, profiles),
            FieldEdit::Insert(_) | FieldEdit::Backspace => {}
        },
        FormField::Active => {
            if matches!(edit, FieldEdit::Toggle | FieldEdit::Cycle(_)) {
                draft.is_active = !draft.is_active;
            }
        }
    }
}

pub fn apply_edit(draft: &mut EditDraft, field: FormField, edit: FieldEdit, profiles: &[Profile]) {
    match field {
        FormField::FirstName => edit_text(&mut draft.first_name, edit),
        FormField::LastName => edit_text(&mut draft.last_name, edit),
        FormField::Email => edit_text(&mut draft.email, edit),
        FormField::Profile => match edit {
            FieldEdit::Cycle(step) => cycle_profile(&mut draft.profile_id, step, profiles),
            FieldEdit::Toggle => cycle_profile(&mut draft.profile_id, 1, profiles),
            FieldEdit::Insert(_) | FieldEdit::Backspace => {}
        },
        FormField::Active => {}
    }
}

// ── Form state ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

impl FormMode {
    /// The open form in `snapshot`, create taking precedence.
    pub fn of(snapshot: &ListSnapshot) -> Option<Self> {
        if snapshot.create_draft.is_some() {
            Some(Self::Create)
        } else if snapshot.edit_draft.is_some() {
            Some(Self::Edit)
        } else {
            None
        }
    }

    fn fields(self) -> &'static [FormField] {
        match self {
            Self::Create => &FormField::CREATE,
            Self::Edit => &FormField::EDIT,
        }
    }
}

#[derive(Debug, Default)]
pub struct UserForm {
    focus: usize,
}

impl UserForm {
    pub fn reset(&mut self) {
        self.focus = 0;
    }

    pub fn focused_field(&self, mode: FormMode) -> FormField {
        let fields = mode.fields();
        fields
            .get(self.focus.min(fields.len() - 1))
            .copied()
            .unwrap_or(FormField::FirstName)
    }

    fn move_focus(&mut self, mode: FormMode, forward: bool) {
        let len = mode.fields().len();
        self.focus = if forward {
            (self.focus + 1) % len
        } else {
            (self.focus + len - 1) % len
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent, mode: FormMode) -> Option<Action> {
        let field = self.focused_field(mode);
        let edit = |e| Some(Action::EditField(field, e));
        match key.code {
            KeyCode::Esc => Some(Action::CancelForm),
            KeyCode::Enter => Some(Action::SubmitForm),
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(mode, true);
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(mode, false);
                None
            }
            KeyCode::Backspace if field.is_text() => edit(FieldEdit::Backspace),
            KeyCode::Char(c) if field.is_text() => edit(FieldEdit::Insert(c)),
            KeyCode::Left if !field.is_text() => edit(FieldEdit::Cycle(-1)),
            KeyCode::Right if !field.is_text() => edit(FieldEdit::Cycle(1)),
            KeyCode::Char(' ') => edit(FieldEdit::Toggle),
            _ => None,
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect, snapshot: &ListSnapshot) {
        let Some(mode) = FormMode::of(snapshot) else {
            return;
        };
        let fields = mode.fields();
        let height = u16::try_from(fields.len()).unwrap_or(5) + 6;
        let form_area = centered(area, 60, height);

        frame.render_widget(Clear, form_area);
        let title = match (&snapshot.create_draft, &snapshot.edit_draft) {
            (Some(_), _) => " New user ".to_owned(),
            (None, Some(draft)) => format!(" Edit {} ", draft.original().full_name()),
            (None, None) => String::new(),
        };
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(theme::overlay_background());
        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let [body, notice, hints] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let focused = self.focused_field(mode);
        let mut lines = vec![Line::from("")];
        lines.extend(fields.iter().map(|&field| {
            let is_focused = field == focused;
            let value = field_value(snapshot, field);
            let cursor = if is_focused && field.is_text() { "▏" } else { "" };
            Line::from(vec![
                Span::styled(format!("  {:<12}", field.label()), theme::form_label(is_focused)),
                Span::styled(format!("{value}{cursor}"), theme::table_row()),
            ])
        }));
        frame.render_widget(Paragraph::new(lines), body);

        if let Some(n) = &snapshot.notice {
            if n.kind == NoticeKind::Error {
                frame.render_widget(
                    Paragraph::new(Span::styled(format!("  {}", n.message), theme::notice_error())),
                    notice,
                );
            }
        }

        let hint_line = Line::from(vec![
            Span::styled("  Tab ", theme::key_hint_key()),
            Span::styled("next  ", theme::key_hint()),
            Span::styled("←/→ ", theme::key_hint_key()),
            Span::styled("choose  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("save  ", theme::key_hint()),
            Span::styled("Esc ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hint_line), hints);
    }
}

fn profile_label(snapshot: &ListSnapshot, id: Option<&ProfileId>) -> String {
    id.map_or_else(
        || "(none)".to_owned(),
        |id| {
            snapshot
                .profile_name(id)
                .map_or_else(|| id.to_string(), str::to_owned)
        },
    )
}

fn field_value(snapshot: &ListSnapshot, field: FormField) -> String {
    if let Some(d) = &snapshot.create_draft {
        return match field {
            FormField::FirstName => d.first_name.clone(),
            FormField::LastName => d.last_name.clone(),
            FormField::Email => d.email.clone(),
            FormField::Profile => format!("◂ {} ▸", profile_label(snapshot, d.profile_id.as_ref())),
            FormField::Active => (if d.is_active { "[x]" } else { "[ ]" }).to_owned(),
        };
    }
    if let Some(d) = &snapshot.edit_draft {
        return match field {
            FormField::FirstName => d.first_name.clone(),
            FormField::LastName => d.last_name.clone(),
            FormField::Email => d.email.clone(),
            FormField::Profile => format!("◂ {} ▸", profile_label(snapshot, d.profile_id.as_ref())),
            FormField::Active => String::new(),
        };
    }
    String::new()
}

/// A `width` x `height` rect centered in `area`, clamped to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    use super::*;

    fn profiles() -> Vec<Profile> {
        vec![
            Profile {
                id: ProfileId::from("p1"),
                name: "admin".into(),
            },
            Profile {
                id: ProfileId::from("p2"),
                name: "user".into(),
            },
        ]
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_and_backspace_edit_text_fields() {
        let mut draft = UserDraft::default();
        for c in "Anx".chars() {
            apply_create(&mut draft, FormField::FirstName, FieldEdit::Insert(c), &[]);
        }
        apply_create(&mut draft, FormField::FirstName, FieldEdit::Backspace, &[]);
        assert_eq!(draft.first_name, "An");
        assert_eq!(draft.last_name, "");
    }

    #[test]
    fn profile_cycles_through_none_and_wraps() {
        let all = profiles();
        let mut draft = UserDraft::default();
        let mut seen = Vec::new();
        for _ in 0..3 {
            apply_create(&mut draft, FormField::Profile, FieldEdit::Cycle(1), &all);
            seen.push(draft.profile_id.as_ref().map(ToString::to_string));
        }
        assert_eq!(seen, vec![Some("p1".into()), Some("p2".into()), None]);

        apply_create(&mut draft, FormField::Profile, FieldEdit::Cycle(-1), &all);
        assert_eq!(draft.profile_id, Some(ProfileId::from("p2")));
    }

    #[test]
    fn active_toggles_only_on_create() {
        let mut draft = UserDraft::default();
        apply_create(&mut draft, FormField::Active, FieldEdit::Toggle, &[]);
        assert!(!draft.is_active);
        apply_create(&mut draft, FormField::Active, FieldEdit::Insert('x'), &[]);
        assert!(!draft.is_active);
    }

    #[test]
    fn keys_map_to_focused_field() {
        let mut form = UserForm::default();
        assert!(matches!(
            form.handle_key(key(KeyCode::Char('q')), FormMode::Create),
            Some(Action::EditField(FormField::FirstName, FieldEdit::Insert('q')))
        ));

        for _ in 0..3 {
            assert!(form.handle_key(key(KeyCode::Tab), FormMode::Create).is_none());
        }
        assert_eq!(form.focused_field(FormMode::Create), FormField::Profile);
        assert!(matches!(
            form.handle_key(key(KeyCode::Right), FormMode::Create),
            Some(Action::EditField(FormField::Profile, FieldEdit::Cycle(1)))
        ));
        // Letters do nothing on a choice field
        assert!(form.handle_key(key(KeyCode::Char('a')), FormMode::Create).is_none());
    }

    #[test]
    fn edit_form_has_no_active_field_and_wraps_focus() {
        let mut form = UserForm::default();
        form.handle_key(key(KeyCode::BackTab), FormMode::Edit);
        assert_eq!(form.focused_field(FormMode::Edit), FormField::Profile);
        assert!(matches!(
            form.handle_key(key(KeyCode::Enter), FormMode::Edit),
            Some(Action::SubmitForm)
        ));
        assert!(matches!(
            form.handle_key(key(KeyCode::Esc), FormMode::Edit),
            Some(Action::CancelForm)
        ));
    }
}
