// Users and profiles endpoints, implemented as inherent methods on `ApiClient`.

use tracing::debug;

use crate::ApiClient;
use crate::Error;
use crate::types::{
    CreateUserBody, ProfileResponse, UpdateUserBody, UserResponse, UserStatusBody,
};

impl ApiClient {
    // ── Users ────────────────────────────────────────────────────────

    /// List one page of users: `GET /users?page={page}&limit={limit}`.
    pub async fn list_users(&self, page: u32, limit: u32) -> Result<Vec<UserResponse>, Error> {
        self.get_with_params(
            &["users"],
            &[("page", page.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    /// List one page of users holding any of the given profiles.
    ///
    /// `GET /users/filter/by-profiles?profiles={csv}&page={page}&limit={limit}`.
    /// Ids are sent in the order given; callers sort them for stable keys.
    pub async fn list_users_by_profiles(
        &self,
        profile_ids: &[String],
        page: u32,
        limit: u32,
    ) -> Result<Vec<UserResponse>, Error> {
        let profiles = profile_ids.join(",");
        debug!(profiles = %profiles, "filtering users by profile");
        self.get_with_params(
            &["users", "filter", "by-profiles"],
            &[
                ("profiles", profiles),
                ("page", page.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    /// Fetch one user: `GET /users/{id}`.
    pub async fn get_user(&self, id: &str) -> Result<UserResponse, Error> {
        self.get(&["users", id]).await
    }

    /// Create a user: `POST /users`. The server assigns the id.
    pub async fn create_user(&self, body: &CreateUserBody) -> Result<UserResponse, Error> {
        self.post(&["users"], body).await
    }

    /// Partially update a user: `PATCH /users/{id}`.
    pub async fn update_user(
        &self,
        id: &str,
        body: &UpdateUserBody,
    ) -> Result<UserResponse, Error> {
        self.patch(&["users", id], body).await
    }

    /// Delete a user: `DELETE /users/{id}`.
    pub async fn delete_user(&self, id: &str) -> Result<(), Error> {
        self.delete(&["users", id]).await
    }

    /// Switch a user's active flag: `PATCH /users/{id}/status`.
    pub async fn set_user_status(&self, id: &str, is_active: bool) -> Result<(), Error> {
        self.patch_no_response(&["users", id, "status"], &UserStatusBody { is_active })
            .await
    }

    // ── Profiles ─────────────────────────────────────────────────────

    /// List every profile: `GET /profiles` (unpaginated).
    pub async fn list_profiles(&self) -> Result<Vec<ProfileResponse>, Error> {
        self.get(&["profiles"]).await
    }
}
