//! All possible UI actions. Actions are the sole mechanism for state mutation.

use userdeck_core::{ListSnapshot, User, UserId};

/// A field of the create/edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    FirstName,
    LastName,
    Email,
    Profile,
    /// Create form only; existing users toggle with `t` on the list.
    Active,
}

impl FormField {
    pub const CREATE: [Self; 5] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Profile,
        Self::Active,
    ];

    pub const EDIT: [Self; 4] = [Self::FirstName, Self::LastName, Self::Email, Self::Profile];

    pub fn label(self) -> &'static str {
        match self {
            Self::FirstName => "First name",
            Self::LastName => "Last name",
            Self::Email => "Email",
            Self::Profile => "Profile",
            Self::Active => "Active",
        }
    }

    pub fn is_text(self) -> bool {
        matches!(self, Self::FirstName | Self::LastName | Self::Email)
    }
}

/// One keystroke's worth of change to a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEdit {
    Insert(char),
    Backspace,
    /// Step the profile choice forward (+1) or back (-1).
    Cycle(i8),
    Toggle,
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── App lifecycle ────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),
    ToggleHelp,

    // ── Data bridge ──────────────────────────────────────────────────
    SnapshotUpdated(Box<ListSnapshot>),

    // ── List ─────────────────────────────────────────────────────────
    Refresh,
    CycleFilter,
    NextPage,
    PrevPage,
    ToggleActive(User),
    Delete(UserId),
    DismissNotice,

    // ── Form ─────────────────────────────────────────────────────────
    OpenCreate,
    OpenEdit(User),
    EditField(FormField, FieldEdit),
    SubmitForm,
    CancelForm,
}
