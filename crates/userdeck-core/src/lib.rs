// userdeck-core: Query cache, user directory and list view-model between
// userdeck-api and consumers (CLI/TUI).

pub mod cache;
pub mod config;
pub mod convert;
pub mod directory;
pub mod error;
pub mod model;
pub mod service;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::{KeyPrefix, Page, QueryCache, QueryFilter, QueryKey, QueryState, Resource};
pub use config::ApiConfig;
pub use directory::UserDirectory;
pub use error::CoreError;
pub use service::{HttpUserService, UserService};
pub use view::{
    EditDraft, FilterSelection, ListSnapshot, ListView, Notice, NoticeKind, SnapshotStream,
    UserDraft, UserListViewModel,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{NewUser, Profile, ProfileId, User, UserId, UserPatch};
