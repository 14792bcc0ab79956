// ── User directory session ──
//
// Owns the service and the per-resource query caches for one application
// session. Reads go through the caches; every mutation goes straight to
// the service and then invalidates all user reads, whether it succeeded
// or not.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::{FetchResult, KeyPrefix, Page, QueryCache, QueryFilter, QueryKey, Resource};
use crate::config::ApiConfig;
use crate::error::CoreError;
use crate::model::{NewUser, Profile, User, UserId, UserPatch};
use crate::service::{HttpUserService, UserService};

/// Per-session access point for users and profiles.
///
/// Cheaply cloneable via `Arc`s; clones share the service and caches.
pub struct UserDirectory<S: UserService> {
    service: Arc<S>,
    users: Arc<QueryCache<Vec<User>>>,
    profiles: Arc<QueryCache<Vec<Profile>>>,
}

impl<S: UserService> Clone for UserDirectory<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            users: Arc::clone(&self.users),
            profiles: Arc::clone(&self.profiles),
        }
    }
}

impl UserDirectory<HttpUserService> {
    /// Build a directory talking HTTP to the configured API.
    pub fn connect(config: &ApiConfig) -> Result<Self, CoreError> {
        let service = HttpUserService::new(config)?;
        info!(url = %config.base_url, "user directory ready");
        Ok(Self::with_stale_after(service, config.stale_after))
    }
}

impl<S: UserService> UserDirectory<S> {
    pub fn new(service: S) -> Self {
        Self::with_stale_after(service, None)
    }

    pub fn with_stale_after(service: S, stale_after: Option<std::time::Duration>) -> Self {
        Self {
            service: Arc::new(service),
            users: Arc::new(QueryCache::new(stale_after)),
            profiles: Arc::new(QueryCache::new(stale_after)),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn users_cache(&self) -> &QueryCache<Vec<User>> {
        &self.users
    }

    pub fn profiles_cache(&self) -> &QueryCache<Vec<Profile>> {
        &self.profiles
    }

    // ── Cached reads ─────────────────────────────────────────────────

    /// One page of users under `filter`, served from cache when fresh.
    pub async fn users_page(&self, filter: &QueryFilter, page: Page) -> FetchResult<Vec<User>> {
        let key = QueryKey::users(filter.clone(), page);
        let service = Arc::clone(&self.service);
        let filter = filter.clone();
        self.users
            .read(&key, move || async move {
                match filter {
                    QueryFilter::All => service.list_users(page.number(), page.size()).await,
                    QueryFilter::Profiles(ids) => {
                        service
                            .list_users_by_profiles(&ids, page.number(), page.size())
                            .await
                    }
                }
            })
            .await
    }

    /// Every profile, served from cache when fresh.
    pub async fn profiles(&self) -> FetchResult<Vec<Profile>> {
        let service = Arc::clone(&self.service);
        self.profiles
            .read(&QueryKey::profiles(), move || async move {
                service.list_profiles().await
            })
            .await
    }

    // ── Uncached reads ───────────────────────────────────────────────

    pub async fn user(&self, id: &UserId) -> Result<User, CoreError> {
        self.service.get_user(id).await
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub async fn create_user(&self, user: &NewUser) -> Result<User, CoreError> {
        let result = self.service.create_user(user).await;
        self.settle("create", result)
    }

    pub async fn update_user(&self, id: &UserId, patch: &UserPatch) -> Result<User, CoreError> {
        let result = self.service.update_user(id, patch).await;
        self.settle("update", result)
    }

    pub async fn delete_user(&self, id: &UserId) -> Result<(), CoreError> {
        let result = self.service.delete_user(id).await;
        self.settle("delete", result)
    }

    pub async fn set_user_active(&self, id: &UserId, is_active: bool) -> Result<(), CoreError> {
        let result = self.service.set_user_active(id, is_active).await;
        self.settle("set-status", result)
    }

    /// Invalidate every user read once a mutation has settled.
    fn settle<T>(&self, mutation: &str, result: Result<T, CoreError>) -> Result<T, CoreError> {
        debug!(mutation, ok = result.is_ok(), "mutation settled");
        self.users.invalidate(&KeyPrefix::resource(Resource::Users));
        result
    }

    /// Drop all cached reads (session teardown or forced reload).
    pub fn reset(&self) {
        self.users.clear();
        self.profiles.clear();
    }
}
