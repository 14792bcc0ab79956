// ── Published view state ──

use std::sync::Arc;

use crate::model::{Profile, User};

use super::drafts::{EditDraft, UserDraft};
use super::filter::FilterSelection;

/// Generic message shown when a dependent read failed.
pub const LOAD_ERROR_MESSAGE: &str = "Could not load users.";

/// What the list area should render.
#[derive(Debug, Clone)]
pub enum ListView {
    /// A dependent read has no data yet.
    Loading,
    /// A dependent read failed. `cause` is the underlying error text.
    Error { message: String, cause: String },
    Ready {
        users: Arc<Vec<User>>,
        /// Page-size heuristic: a full page suggests another one exists.
        has_next: bool,
    },
}

impl ListView {
    pub fn users(&self) -> Option<&Arc<Vec<User>>> {
        match self {
            Self::Ready { users, .. } => Some(users),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// One-line feedback about the last user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Everything a renderer needs, published after every state change.
#[derive(Debug, Clone)]
pub struct ListSnapshot {
    pub page: u32,
    pub page_size: u32,
    pub filter: FilterSelection,
    pub view: ListView,
    pub profiles: Arc<Vec<Profile>>,
    pub create_draft: Option<UserDraft>,
    pub edit_draft: Option<EditDraft>,
    pub notice: Option<Notice>,
}

impl ListSnapshot {
    pub fn has_next(&self) -> bool {
        matches!(self.view, ListView::Ready { has_next: true, .. })
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Name of the profile with `id`, if loaded.
    pub fn profile_name(&self, id: &crate::model::ProfileId) -> Option<&str> {
        self.profiles
            .iter()
            .find(|p| &p.id == id)
            .map(|p| p.name.as_str())
    }
}
