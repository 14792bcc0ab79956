// ── List/filter/paginate view-model ──
//
// UI-local state for the users screen and the snapshots it publishes.

mod drafts;
mod filter;
mod snapshot;
mod stream;
mod users;

pub use drafts::{EditDraft, UserDraft};
pub use filter::FilterSelection;
pub use snapshot::{ListSnapshot, ListView, LOAD_ERROR_MESSAGE, Notice, NoticeKind};
pub use stream::{SnapshotStream, SnapshotWatchStream};
pub use users::UserListViewModel;
