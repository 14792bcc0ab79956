// Production `UserService` over the REST client.

use std::collections::BTreeSet;

use tracing::debug;
use userdeck_api::ApiClient;
use userdeck_api::types::{CreateUserBody, UpdateUserBody};

use super::UserService;
use crate::config::ApiConfig;
use crate::error::CoreError;
use crate::model::{NewUser, Profile, ProfileId, User, UserId, UserPatch};

/// `UserService` backed by [`ApiClient`].
#[derive(Debug, Clone)]
pub struct HttpUserService {
    client: ApiClient,
}

impl HttpUserService {
    pub fn new(config: &ApiConfig) -> Result<Self, CoreError> {
        let client = ApiClient::new(config.base_url.as_str(), &config.transport())?;
        Ok(Self { client })
    }

    pub fn from_client(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

impl UserService for HttpUserService {
    async fn list_users(&self, page: u32, limit: u32) -> Result<Vec<User>, CoreError> {
        let raw = self
            .client
            .list_users(page, limit)
            .await
            .map_err(|e| CoreError::from(e).in_operation("failed to list users"))?;
        Ok(raw.into_iter().map(User::from).collect())
    }

    async fn list_users_by_profiles(
        &self,
        profile_ids: &BTreeSet<ProfileId>,
        page: u32,
        limit: u32,
    ) -> Result<Vec<User>, CoreError> {
        // BTreeSet iteration is sorted, so equal sets produce equal URLs.
        let ids: Vec<String> = profile_ids.iter().map(|p| p.as_str().to_owned()).collect();
        let raw = self
            .client
            .list_users_by_profiles(&ids, page, limit)
            .await
            .map_err(|e| CoreError::from(e).in_operation("failed to list users by profile"))?;
        Ok(raw.into_iter().map(User::from).collect())
    }

    async fn get_user(&self, id: &UserId) -> Result<User, CoreError> {
        self.client
            .get_user(id.as_str())
            .await
            .map(User::from)
            .map_err(|e| CoreError::from(e).in_operation(format!("failed to get user {id}")))
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, CoreError> {
        let raw = self
            .client
            .list_profiles()
            .await
            .map_err(|e| CoreError::from(e).in_operation("failed to list profiles"))?;
        Ok(raw.into_iter().map(Profile::from).collect())
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, CoreError> {
        let created = self
            .client
            .create_user(&CreateUserBody::from(user))
            .await
            .map(User::from)
            .map_err(|e| CoreError::from(e).in_operation("failed to create user"))?;
        debug!(id = %created.id, "user created");
        Ok(created)
    }

    async fn update_user(&self, id: &UserId, patch: &UserPatch) -> Result<User, CoreError> {
        self.client
            .update_user(id.as_str(), &UpdateUserBody::from(patch))
            .await
            .map(User::from)
            .map_err(|e| CoreError::from(e).in_operation(format!("failed to update user {id}")))
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), CoreError> {
        self.client
            .delete_user(id.as_str())
            .await
            .map_err(|e| CoreError::from(e).in_operation(format!("failed to delete user {id}")))
    }

    async fn set_user_active(&self, id: &UserId, is_active: bool) -> Result<(), CoreError> {
        let verb = if is_active { "activate" } else { "deactivate" };
        self.client
            .set_user_status(id.as_str(), is_active)
            .await
            .map_err(|e| CoreError::from(e).in_operation(format!("failed to {verb} user {id}")))
    }
}
