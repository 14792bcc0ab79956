// In-memory `UserService` for unit tests.
#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::Semaphore;

use super::UserService;
use crate::error::CoreError;
use crate::model::{NewUser, Profile, ProfileId, User, UserId, UserPatch};

/// One recorded list request: profile filter (if any), page, limit.
pub(crate) type ListCall = (Option<BTreeSet<ProfileId>>, u32, u32);

#[derive(Default)]
pub(crate) struct FakeService {
    users: Mutex<Vec<User>>,
    profiles: Vec<Profile>,
    next_id: AtomicUsize,
    pub list_calls: Mutex<Vec<ListCall>>,
    pub profile_calls: AtomicUsize,
    pub mutation_calls: AtomicUsize,
    pub fail_lists: AtomicBool,
    pub fail_mutations: AtomicBool,
    /// When set, list requests wait for a permit before answering. The
    /// page is read before waiting, like a server that answers slowly.
    gate: Option<Semaphore>,
}

impl FakeService {
    pub fn new(profiles: &[(&str, &str)]) -> Self {
        Self {
            profiles: profiles
                .iter()
                .map(|(id, name)| Profile {
                    id: ProfileId::from(*id),
                    name: (*name).to_owned(),
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    /// Let `n` gated list requests through.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub fn with_users(self, count: usize, profile: &str) -> Self {
        {
            let mut users = self.users.lock().unwrap();
            for _ in 0..count {
                let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                users.push(sample_user(n, profile));
            }
        }
        self
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.lock().unwrap().len()
    }

    pub fn last_list(&self) -> Option<ListCall> {
        self.list_calls.lock().unwrap().last().cloned()
    }

    pub fn stored(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }

    async fn wait_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
    }

    fn page_of(&self, filter: Option<&BTreeSet<ProfileId>>, page: u32, limit: u32) -> Vec<User> {
        let skip = usize::try_from((page - 1) * limit).unwrap();
        self.users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| match filter {
                Some(ids) => u.profile_id.as_ref().is_some_and(|p| ids.contains(p)),
                None => true,
            })
            .skip(skip)
            .take(usize::try_from(limit).unwrap())
            .cloned()
            .collect()
    }

    fn mutation_guard(&self) -> Result<(), CoreError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(CoreError::ValidationFailed {
                message: "email must be an email".into(),
            });
        }
        Ok(())
    }

    fn not_found(id: &UserId) -> CoreError {
        CoreError::NotFound {
            message: format!("User {id} not found"),
        }
    }
}

pub(crate) fn sample_user(n: usize, profile: &str) -> User {
    User {
        id: UserId::from(format!("u{n}")),
        first_name: format!("First{n}"),
        last_name: format!("Last{n}"),
        email: format!("user{n}@example.com"),
        profile_id: Some(ProfileId::from(profile)),
        is_active: true,
    }
}

impl UserService for FakeService {
    async fn list_users(&self, page: u32, limit: u32) -> Result<Vec<User>, CoreError> {
        self.list_calls.lock().unwrap().push((None, page, limit));
        let users = self.page_of(None, page, limit);
        self.wait_gate().await;
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(CoreError::Api {
                message: "Internal Server Error".into(),
                status: Some(500),
            });
        }
        Ok(users)
    }

    async fn list_users_by_profiles(
        &self,
        profile_ids: &BTreeSet<ProfileId>,
        page: u32,
        limit: u32,
    ) -> Result<Vec<User>, CoreError> {
        self.list_calls
            .lock()
            .unwrap()
            .push((Some(profile_ids.clone()), page, limit));
        let users = self.page_of(Some(profile_ids), page, limit);
        self.wait_gate().await;
        Ok(users)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, CoreError> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| &u.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, CoreError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.profiles.clone())
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, CoreError> {
        self.mutation_guard()?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = User {
            id: UserId::from(format!("u{n}")),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            profile_id: user.profile_id.clone(),
            is_active: user.is_active,
        };
        self.users.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_user(&self, id: &UserId, patch: &UserPatch) -> Result<User, CoreError> {
        self.mutation_guard()?;
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| &u.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        if let Some(v) = &patch.first_name {
            user.first_name.clone_from(v);
        }
        if let Some(v) = &patch.last_name {
            user.last_name.clone_from(v);
        }
        if let Some(v) = &patch.email {
            user.email.clone_from(v);
        }
        if let Some(v) = &patch.profile_id {
            user.profile_id = Some(v.clone());
        }
        if let Some(v) = patch.is_active {
            user.is_active = v;
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), CoreError> {
        self.mutation_guard()?;
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| &u.id != id);
        if users.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    async fn set_user_active(&self, id: &UserId, is_active: bool) -> Result<(), CoreError> {
        self.mutation_guard()?;
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| &u.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        user.is_active = is_active;
        Ok(())
    }
}
