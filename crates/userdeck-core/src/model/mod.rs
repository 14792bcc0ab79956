// ── Domain model ──
//
// Canonical user/profile types shared by the service, cache and view-model.
// Wire shapes live in `userdeck_api::types`; `crate::convert` bridges them.

pub mod ids;
pub mod profile;
pub mod user;

pub use ids::{ProfileId, UserId};
pub use profile::Profile;
pub use user::{NewUser, User, UserPatch};
