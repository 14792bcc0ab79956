//! Application core: event loop, key routing and action dispatch.
//!
//! Screens never touch the view-model directly. They emit [`Action`]s; this
//! module turns them into view-model calls and feeds snapshots back.

use std::future::Future;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use userdeck_core::{CoreError, UserListViewModel, UserService};

use crate::action::Action;
use crate::component::Component;
use crate::data_bridge::spawn_data_bridge;
use crate::event::{Event, EventReader};
use crate::screens::UsersScreen;
use crate::screens::user_form::{apply_create, apply_edit, centered};
use crate::theme;
use crate::tui::Tui;

/// Top-level application state and event loop.
pub struct App<S: UserService> {
    view_model: UserListViewModel<S>,
    screen: UsersScreen,
    running: bool,
    help_visible: bool,
    /// Shown in the status bar (server name or URL).
    server_label: String,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    cancel: CancellationToken,
}

impl<S: UserService> App<S> {
    pub fn new(view_model: UserListViewModel<S>, server_label: impl Into<String>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            view_model,
            screen: UsersScreen::new(),
            running: true,
            help_visible: false,
            server_label: server_label.into(),
            action_tx,
            action_rx,
            cancel: CancellationToken::new(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        let bridge = tokio::spawn(spawn_data_bridge(
            self.view_model.clone(),
            self.action_tx.clone(),
            self.cancel.child_token(),
        ));

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!(server = %self.server_label, "TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        self.cancel.cancel();
        if let Err(e) = bridge.await {
            warn!(error = %e, "data bridge task failed");
        }
        info!("TUI event loop ended");
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?' | 'q') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        // Forms and dialogs see every key, including q and ?
        if !self.screen.captures_input() {
            match key.code {
                KeyCode::Char('q') => return Ok(Some(Action::Quit)),
                KeyCode::Char('?') => return Ok(Some(Action::ToggleHelp)),
                _ => {}
            }
        }

        self.screen.handle_key_event(key)
    }

    /// Run a view-model call in the background. Outcomes reach the screen
    /// as notices in the next snapshot; failures are only logged here.
    fn spawn_vm<F, Fut, T>(&self, what: &'static str, call: F)
    where
        F: FnOnce(UserListViewModel<S>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        let vm = self.view_model.clone();
        tokio::spawn(async move {
            if let Err(e) = call(vm).await {
                warn!(error = %e, "{what} failed");
            }
        });
    }

    /// Like [`Self::spawn_vm`] for calls that report through the snapshot only.
    fn spawn_load<F, Fut>(&self, call: F)
    where
        F: FnOnce(UserListViewModel<S>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(call(self.view_model.clone()));
    }

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,
            Action::ToggleHelp => self.help_visible = !self.help_visible,
            Action::Render | Action::Tick | Action::Resize(..) => {}

            // ── Loading ──────────────────────────────────────────────
            Action::Refresh => self.spawn_load(|vm| async move { vm.refresh().await }),
            Action::CycleFilter => self.spawn_load(|vm| async move {
                let filter = vm.cycle_filter().await;
                debug!(%filter, "filter changed");
            }),
            Action::NextPage => self.spawn_load(|vm| async move {
                vm.next_page().await;
            }),
            Action::PrevPage => self.spawn_load(|vm| async move {
                vm.prev_page().await;
            }),

            // ── Row actions ──────────────────────────────────────────
            Action::ToggleActive(user) => {
                let user = user.clone();
                self.spawn_vm("toggle active", move |vm| async move {
                    vm.toggle_active(&user).await
                });
            }
            Action::Delete(id) => {
                let id = id.clone();
                self.spawn_vm("delete", move |vm| async move { vm.delete(&id).await });
            }
            Action::DismissNotice => self.view_model.dismiss_notice(),

            // ── Form ─────────────────────────────────────────────────
            Action::OpenCreate => self.view_model.open_create(),
            Action::OpenEdit(user) => self.view_model.open_edit(user),
            Action::EditField(field, edit) => {
                let profiles = self.view_model.snapshot().profiles;
                let (field, edit) = (*field, *edit);
                let applied = self
                    .view_model
                    .update_create_draft(|d| apply_create(d, field, edit, &profiles));
                if !applied {
                    self.view_model
                        .update_edit_draft(|d| apply_edit(d, field, edit, &profiles));
                }
            }
            Action::SubmitForm => {
                if self.view_model.snapshot().create_draft.is_some() {
                    self.spawn_vm("create", |vm| async move { vm.submit_create().await });
                } else {
                    self.spawn_vm("update", |vm| async move { vm.submit_edit().await });
                }
            }
            Action::CancelForm => {
                self.view_model.cancel_create();
                self.view_model.cancel_edit();
            }

            Action::SnapshotUpdated(_) => {
                if let Some(follow_up) = self.screen.update(action)? {
                    self.action_tx.send(follow_up)?;
                }
            }
        }
        Ok(())
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let [content, status] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

        self.screen.render(frame, content);
        self.render_status_bar(frame, status);

        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled(" ● ", theme::notice_success()),
            Span::styled(self.server_label.clone(), theme::table_row()),
            Span::styled(" │ ? help  q quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let help_area = centered(area, 52, 18);
        frame.render_widget(Clear, help_area);

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(theme::overlay_background());
        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let row = |keys: &'static str, text: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {keys:<10}"), theme::key_hint_key()),
                Span::styled(text, theme::key_hint()),
            ])
        };
        let heading =
            |text: &'static str| Line::from(Span::styled(format!("  {text}"), theme::title_style()));

        let help_text = vec![
            Line::from(""),
            heading("List"),
            row("j/k ↑/↓", "Move selection"),
            row("n/p ←/→", "Next / previous page"),
            row("f", "Cycle profile filter"),
            row("r", "Refresh"),
            row("c", "Create user"),
            row("e Enter", "Edit selected user"),
            row("t Space", "Activate / deactivate"),
            row("d", "Delete selected user"),
            row("Esc", "Dismiss message"),
            Line::from(""),
            heading("Form"),
            row("Tab", "Next field"),
            row("Enter", "Save"),
            row("Esc", "Cancel"),
        ];
        frame.render_widget(Paragraph::new(help_text), inner);
    }
}
