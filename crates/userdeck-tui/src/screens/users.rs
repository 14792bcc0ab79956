//! Users screen: one page of users with filter, paging and row actions.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState};

use userdeck_core::{ListSnapshot, ListView, NoticeKind, User};

use super::user_form::{self, FormMode, UserForm};
use crate::action::Action;
use crate::component::Component;
use crate::theme;

pub struct UsersScreen {
    snapshot: Option<ListSnapshot>,
    table_state: TableState,
    form: UserForm,
    /// User awaiting delete confirmation.
    confirm_delete: Option<User>,
}

impl UsersScreen {
    pub fn new() -> Self {
        Self {
            snapshot: None,
            table_state: TableState::default(),
            form: UserForm::default(),
            confirm_delete: None,
        }
    }

    fn users(&self) -> &[User] {
        self.snapshot
            .as_ref()
            .and_then(|s| s.view.users())
            .map(|users| users.as_slice())
            .unwrap_or_default()
    }

    fn form_mode(&self) -> Option<FormMode> {
        self.snapshot.as_ref().and_then(FormMode::of)
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn selected_user(&self) -> Option<&User> {
        self.users().get(self.selected_index())
    }

    fn select(&mut self, idx: usize) {
        let len = self.users().len();
        let clamped = if len == 0 { 0 } else { idx.min(len - 1) };
        self.table_state.select(Some(clamped));
    }

    fn move_selection(&mut self, down: bool) {
        let current = self.selected_index();
        let next = if down {
            current.saturating_add(1)
        } else {
            current.saturating_sub(1)
        };
        self.select(next);
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('y' | 'Y') | KeyCode::Enter => self
                .confirm_delete
                .take()
                .map(|user| Action::Delete(user.id)),
            KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                self.confirm_delete = None;
                None
            }
            _ => None,
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(true);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(false);
                None
            }
            KeyCode::Char('f') => Some(Action::CycleFilter),
            KeyCode::Char('n') | KeyCode::Right => Some(Action::NextPage),
            KeyCode::Char('p') | KeyCode::Left => Some(Action::PrevPage),
            KeyCode::Char('r') => Some(Action::Refresh),
            KeyCode::Char('c') => Some(Action::OpenCreate),
            KeyCode::Char('e') | KeyCode::Enter => self.selected_user().cloned().map(Action::OpenEdit),
            KeyCode::Char('t' | ' ') => self.selected_user().cloned().map(Action::ToggleActive),
            KeyCode::Char('d') => {
                self.confirm_delete = self.selected_user().cloned();
                None
            }
            KeyCode::Esc => Some(Action::DismissNotice),
            _ => None,
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_header(snapshot: &ListSnapshot, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled("  Filter ", theme::key_hint()),
            Span::styled(snapshot.filter.to_string(), theme::title_style()),
            Span::styled("   Page ", theme::key_hint()),
            Span::styled(snapshot.page.to_string(), theme::title_style()),
        ];
        if snapshot.has_next() {
            spans.push(Span::styled(" ▸", theme::key_hint()));
        }
        spans.push(Span::styled(
            format!("   {} per page", snapshot.page_size),
            theme::key_hint(),
        ));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_table(&self, snapshot: &ListSnapshot, users: &[User], frame: &mut Frame, area: Rect) {
        if users.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  No users.", theme::key_hint())),
                area,
            );
            return;
        }

        let header = Row::new(["ID", "Name", "Email", "Profile", "Active"].map(|h| {
            Cell::from(h).style(theme::table_header())
        }));

        let selected = self.selected_index();
        let rows: Vec<Row> = users
            .iter()
            .enumerate()
            .map(|(i, user)| {
                let prefix = if i == selected { "▸" } else { " " };
                let profile = user.profile_id.as_ref().map_or_else(
                    || "─".to_owned(),
                    |id| snapshot.profile_name(id).map_or_else(|| id.to_string(), str::to_owned),
                );
                let style = if user.is_active {
                    theme::table_row()
                } else {
                    theme::table_row_inactive()
                };
                Row::new(vec![
                    Cell::from(format!("{prefix}{}", user.id)),
                    Cell::from(user.full_name()),
                    Cell::from(user.email.clone()),
                    Cell::from(profile),
                    Cell::from(if user.is_active { "●" } else { "○" }),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(10),
            Constraint::Min(16),
            Constraint::Min(20),
            Constraint::Length(12),
            Constraint::Length(6),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());

        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_body(&self, snapshot: &ListSnapshot, frame: &mut Frame, area: Rect) {
        match &snapshot.view {
            ListView::Loading => frame.render_widget(
                Paragraph::new(Span::styled("  Loading users…", theme::loading())),
                area,
            ),
            ListView::Error { message, cause } => frame.render_widget(
                Paragraph::new(vec![
                    Line::from(Span::styled(format!("  {message}"), theme::notice_error())),
                    Line::from(Span::styled(format!("  {cause}"), theme::key_hint())),
                    Line::from(""),
                    Line::from(Span::styled("  Press r to retry.", theme::key_hint())),
                ]),
                area,
            ),
            ListView::Ready { users, .. } => self.render_table(snapshot, users, frame, area),
        }
    }

    fn render_notice(snapshot: &ListSnapshot, frame: &mut Frame, area: Rect) {
        let Some(notice) = &snapshot.notice else {
            return;
        };
        let style = match notice.kind {
            NoticeKind::Success => theme::notice_success(),
            NoticeKind::Error => theme::notice_error(),
        };
        frame.render_widget(
            Paragraph::new(Span::styled(format!("  {}", notice.message), style)),
            area,
        );
    }

    fn render_confirm(user: &User, frame: &mut Frame, area: Rect) {
        let dialog = user_form::centered(area, 50, 5);
        frame.render_widget(Clear, dialog);
        let block = Block::default()
            .title(" Delete user ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::RED))
            .style(theme::overlay_background());
        let text = vec![
            Line::from(format!("  Delete {} ({})?", user.full_name(), user.id)),
            Line::from(vec![
                Span::styled("  y ", theme::key_hint_key()),
                Span::styled("delete  ", theme::key_hint()),
                Span::styled("n ", theme::key_hint_key()),
                Span::styled("keep", theme::key_hint()),
            ]),
        ];
        frame.render_widget(Paragraph::new(text).block(block), dialog);
    }
}

impl Default for UsersScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for UsersScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(mode) = self.form_mode() {
            return Ok(self.form.handle_key(key, mode));
        }
        if self.confirm_delete.is_some() {
            return Ok(self.handle_confirm_key(key));
        }
        Ok(self.handle_list_key(key))
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::SnapshotUpdated(snapshot) = action {
            if FormMode::of(snapshot).is_none() {
                self.form.reset();
            }
            self.snapshot = Some((**snapshot).clone());
            self.select(self.selected_index());
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let count = self.users().len();
        let block = Block::default()
            .title(format!(" Users ({count}) "))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(snapshot) = &self.snapshot else {
            return;
        };

        let [header, body, notice, hints] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        Self::render_header(snapshot, frame, header);
        self.render_body(snapshot, frame, body);
        Self::render_notice(snapshot, frame, notice);

        let hint_line = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("move  ", theme::key_hint()),
            Span::styled("f ", theme::key_hint_key()),
            Span::styled("filter  ", theme::key_hint()),
            Span::styled("n/p ", theme::key_hint_key()),
            Span::styled("page  ", theme::key_hint()),
            Span::styled("c ", theme::key_hint_key()),
            Span::styled("create  ", theme::key_hint()),
            Span::styled("e ", theme::key_hint_key()),
            Span::styled("edit  ", theme::key_hint()),
            Span::styled("d ", theme::key_hint_key()),
            Span::styled("delete  ", theme::key_hint()),
            Span::styled("t ", theme::key_hint_key()),
            Span::styled("toggle", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hint_line), hints);

        if let Some(user) = &self.confirm_delete {
            Self::render_confirm(user, frame, area);
        }
        self.form.render(frame, area, snapshot);
    }

    fn captures_input(&self) -> bool {
        self.form_mode().is_some() || self.confirm_delete.is_some()
    }
}
