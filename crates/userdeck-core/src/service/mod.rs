// ── Resource service ──
//
// Typed façade over the users API. Every operation maps to exactly one
// request; failures are wrapped with the operation that produced them.

mod http;

#[cfg(test)]
pub(crate) mod fake;

use std::collections::BTreeSet;
use std::future::Future;

use crate::error::CoreError;
use crate::model::{NewUser, Profile, ProfileId, User, UserId, UserPatch};

pub use http::HttpUserService;

/// Domain operations on the remote users resource.
///
/// Implementations must be cheap to share behind an `Arc`; the directory
/// clones that `Arc` into spawned fetch tasks.
pub trait UserService: Send + Sync + 'static {
    /// One page of users, in server order.
    fn list_users(
        &self,
        page: u32,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<User>, CoreError>> + Send;

    /// One page of users holding any of `profile_ids`.
    fn list_users_by_profiles(
        &self,
        profile_ids: &BTreeSet<ProfileId>,
        page: u32,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<User>, CoreError>> + Send;

    fn get_user(&self, id: &UserId) -> impl Future<Output = Result<User, CoreError>> + Send;

    fn list_profiles(&self) -> impl Future<Output = Result<Vec<Profile>, CoreError>> + Send;

    fn create_user(&self, user: &NewUser)
    -> impl Future<Output = Result<User, CoreError>> + Send;

    fn update_user(
        &self,
        id: &UserId,
        patch: &UserPatch,
    ) -> impl Future<Output = Result<User, CoreError>> + Send;

    fn delete_user(&self, id: &UserId) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn set_user_active(
        &self,
        id: &UserId,
        is_active: bool,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}
