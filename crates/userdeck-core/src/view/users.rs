// ── Users list view-model ──
//
// Holds page, filter and drafts for the users screen, derives which cached
// read to show, and publishes a `ListSnapshot` after every change. Results
// of refreshes superseded by a newer one (filter or page changed meanwhile)
// are dropped via a generation counter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::cache::{FetchResult, Page, QueryFilter};
use crate::directory::UserDirectory;
use crate::error::CoreError;
use crate::model::{Profile, User, UserId};
use crate::service::UserService;

use super::drafts::{EditDraft, UserDraft};
use super::filter::FilterSelection;
use super::snapshot::{LOAD_ERROR_MESSAGE, ListSnapshot, ListView, Notice};
use super::stream::SnapshotStream;

// ── Internal state ───────────────────────────────────────────────────

enum Load<T> {
    Loading,
    Ready(T),
    Error(Arc<CoreError>),
}

impl<T> From<Result<T, Arc<CoreError>>> for Load<T> {
    fn from(result: Result<T, Arc<CoreError>>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(err) => Self::Error(err),
        }
    }
}

struct ViewState {
    page: u32,
    filter: FilterSelection,
    profiles: Load<Arc<Vec<Profile>>>,
    users: Load<Arc<Vec<User>>>,
    /// Last successfully loaded profiles, kept through failed reloads.
    known_profiles: Arc<Vec<Profile>>,
    create_draft: Option<UserDraft>,
    edit_draft: Option<EditDraft>,
    notice: Option<Notice>,
}

impl ViewState {
    fn new() -> Self {
        Self {
            page: 1,
            filter: FilterSelection::All,
            profiles: Load::Loading,
            users: Load::Loading,
            known_profiles: Arc::default(),
            create_draft: None,
            edit_draft: None,
            notice: None,
        }
    }

    fn snapshot(&self, page_size: u32) -> ListSnapshot {
        let view = match (&self.profiles, &self.users) {
            (Load::Loading, _) | (_, Load::Loading) => ListView::Loading,
            (Load::Error(err), _) | (_, Load::Error(err)) => ListView::Error {
                message: LOAD_ERROR_MESSAGE.to_owned(),
                cause: err.to_string(),
            },
            (Load::Ready(_), Load::Ready(users)) => ListView::Ready {
                users: Arc::clone(users),
                has_next: is_full_page(users.len(), page_size),
            },
        };

        ListSnapshot {
            page: self.page,
            page_size,
            filter: self.filter.clone(),
            view,
            profiles: Arc::clone(&self.known_profiles),
            create_draft: self.create_draft.clone(),
            edit_draft: self.edit_draft.clone(),
            notice: self.notice.clone(),
        }
    }
}

fn is_full_page(len: usize, page_size: u32) -> bool {
    usize::try_from(page_size).is_ok_and(|size| len == size)
}

// ── View-model ───────────────────────────────────────────────────────

/// State holder for the users list screen.
///
/// Cheaply cloneable via `Arc<Inner>`; clones drive the same state. All
/// async operations publish intermediate snapshots, so renderers only
/// need [`subscribe`](Self::subscribe).
pub struct UserListViewModel<S: UserService> {
    inner: Arc<Inner<S>>,
}

struct Inner<S: UserService> {
    directory: UserDirectory<S>,
    page_size: u32,
    state: Mutex<ViewState>,
    snapshots: watch::Sender<ListSnapshot>,
    generation: AtomicU64,
}

impl<S: UserService> Clone for UserListViewModel<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: UserService> UserListViewModel<S> {
    /// Create a view-model on page 1 with no filter. Nothing is fetched
    /// until [`refresh`](Self::refresh) is called.
    pub fn new(directory: UserDirectory<S>, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let state = ViewState::new();
        let (snapshots, _) = watch::channel(state.snapshot(page_size));
        Self {
            inner: Arc::new(Inner {
                directory,
                page_size,
                state: Mutex::new(state),
                snapshots,
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn directory(&self) -> &UserDirectory<S> {
        &self.inner.directory
    }

    pub fn page_size(&self) -> u32 {
        self.inner.page_size
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn snapshot(&self) -> ListSnapshot {
        self.inner.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot> {
        self.inner.snapshots.subscribe()
    }

    pub fn stream(&self) -> SnapshotStream {
        SnapshotStream::new(self.subscribe())
    }

    /// Refresh the active read every time the user cache is invalidated,
    /// until `cancel` fires or the view-model is dropped.
    pub fn watch_invalidations(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let mut invalidations = self.inner.directory.users_cache().watch_invalidations();
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    changed = invalidations.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let Some(inner) = weak.upgrade() else { break };
                        trace!("users invalidated, refreshing list");
                        UserListViewModel { inner }.refresh().await;
                    }
                }
            }
        })
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Re-read profiles and the users page for the current filter/page.
    ///
    /// Cached data is reused when fresh. A page that already shows data
    /// keeps showing it until the new result arrives.
    pub async fn refresh(&self) {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (filter, page) = {
            let mut state = self.lock();
            if matches!(state.users, Load::Error(_)) {
                state.users = Load::Loading;
            }
            if matches!(state.profiles, Load::Error(_)) {
                state.profiles = Load::Loading;
            }
            self.publish(&state);
            (state.filter.clone(), Page::new(state.page, self.inner.page_size))
        };

        let (profiles, users) = self.load(&filter, page).await;

        let mut state = self.lock();
        if let Ok(list) = &profiles {
            state.known_profiles = Arc::clone(list);
        }
        state.profiles = Load::from(profiles);
        if self.inner.generation.load(Ordering::SeqCst) == generation {
            state.users = Load::from(users);
        } else {
            trace!(generation, "discarding superseded users result");
        }
        self.publish(&state);
    }

    async fn load(
        &self,
        filter: &FilterSelection,
        page: Page,
    ) -> (FetchResult<Vec<Profile>>, FetchResult<Vec<User>>) {
        let directory = &self.inner.directory;
        match filter {
            FilterSelection::All => {
                futures_util::future::join(
                    directory.profiles(),
                    directory.users_page(&QueryFilter::All, page),
                )
                .await
            }
            FilterSelection::Profile(_) => {
                let profiles = directory.profiles().await;
                let users = match &profiles {
                    Ok(list) => match filter.resolve(list) {
                        Some(resolved) => directory.users_page(&resolved, page).await,
                        None => {
                            debug!(%filter, "no profile matches filter");
                            Ok(Arc::default())
                        }
                    },
                    Err(err) => Err(Arc::clone(err)),
                };
                (profiles, users)
            }
        }
    }

    // ── Filter and pagination ────────────────────────────────────────

    /// Switch filter, resetting to page 1. No-op if unchanged.
    pub async fn select_filter(&self, filter: FilterSelection) -> bool {
        {
            let mut state = self.lock();
            if state.filter == filter {
                return false;
            }
            debug!(from = %state.filter, to = %filter, "filter changed");
            state.filter = filter;
            state.page = 1;
            state.users = Load::Loading;
            self.publish(&state);
        }
        self.refresh().await;
        true
    }

    /// Advance to the next selection in `All -> each profile -> All`.
    pub async fn cycle_filter(&self) -> FilterSelection {
        let next = {
            let state = self.lock();
            state.filter.cycle(&state.known_profiles)
        };
        self.select_filter(next.clone()).await;
        next
    }

    /// Go to the next page, but only when the current page came back full.
    pub async fn next_page(&self) -> bool {
        {
            let mut state = self.lock();
            let full = matches!(
                &state.users,
                Load::Ready(users) if is_full_page(users.len(), self.inner.page_size)
            );
            if !full {
                return false;
            }
            state.page += 1;
            state.users = Load::Loading;
            self.publish(&state);
        }
        self.refresh().await;
        true
    }

    /// Go to the previous page. No-op on page 1.
    pub async fn prev_page(&self) -> bool {
        {
            let mut state = self.lock();
            if state.page <= 1 {
                return false;
            }
            state.page -= 1;
            state.users = Load::Loading;
            self.publish(&state);
        }
        self.refresh().await;
        true
    }

    // ── Create draft ─────────────────────────────────────────────────

    pub fn open_create(&self) {
        let mut state = self.lock();
        state.create_draft = Some(UserDraft::default());
        self.publish(&state);
    }

    /// Apply `edit` to the open create draft. Returns `false` if none is open.
    pub fn update_create_draft(&self, edit: impl FnOnce(&mut UserDraft)) -> bool {
        let mut state = self.lock();
        let Some(draft) = state.create_draft.as_mut() else {
            return false;
        };
        edit(draft);
        self.publish(&state);
        true
    }

    pub fn cancel_create(&self) {
        let mut state = self.lock();
        state.create_draft = None;
        self.publish(&state);
    }

    /// Submit the create draft. On success the draft closes; on failure it
    /// stays open and the error becomes the notice.
    pub async fn submit_create(&self) -> Result<User, CoreError> {
        let new_user = self
            .lock()
            .create_draft
            .as_ref()
            .map(UserDraft::to_new_user)
            .ok_or_else(|| CoreError::Internal("no create draft is open".into()))?;

        let result = self.inner.directory.create_user(&new_user).await;
        {
            let mut state = self.lock();
            match &result {
                Ok(user) => {
                    state.create_draft = None;
                    state.notice = Some(Notice::success(format!("Created {}", user.full_name())));
                }
                Err(err) => state.notice = Some(Notice::error(err.to_string())),
            }
            self.publish(&state);
        }
        self.refresh().await;
        result
    }

    // ── Edit draft ───────────────────────────────────────────────────

    pub fn open_edit(&self, user: &User) {
        let mut state = self.lock();
        state.edit_draft = Some(EditDraft::from_user(user));
        self.publish(&state);
    }

    /// Apply `edit` to the open edit draft. Returns `false` if none is open.
    pub fn update_edit_draft(&self, edit: impl FnOnce(&mut EditDraft)) -> bool {
        let mut state = self.lock();
        let Some(draft) = state.edit_draft.as_mut() else {
            return false;
        };
        edit(draft);
        self.publish(&state);
        true
    }

    pub fn cancel_edit(&self) {
        let mut state = self.lock();
        state.edit_draft = None;
        self.publish(&state);
    }

    /// Submit the changed fields of the edit draft.
    ///
    /// An unchanged draft closes without a request and yields `Ok(None)`.
    pub async fn submit_edit(&self) -> Result<Option<User>, CoreError> {
        let (id, patch) = {
            let mut state = self.lock();
            let Some(draft) = state.edit_draft.as_ref() else {
                return Err(CoreError::Internal("no edit draft is open".into()));
            };
            let patch = draft.patch();
            let id = draft.user_id().clone();
            if patch.is_empty() {
                state.edit_draft = None;
                self.publish(&state);
                return Ok(None);
            }
            (id, patch)
        };

        let result = self.inner.directory.update_user(&id, &patch).await;
        {
            let mut state = self.lock();
            match &result {
                Ok(user) => {
                    state.edit_draft = None;
                    state.notice = Some(Notice::success(format!("Updated {}", user.full_name())));
                }
                Err(err) => state.notice = Some(Notice::error(err.to_string())),
            }
            self.publish(&state);
        }
        self.refresh().await;
        result.map(Some)
    }

    // ── Row actions ──────────────────────────────────────────────────

    pub async fn delete(&self, id: &UserId) -> Result<(), CoreError> {
        let result = self.inner.directory.delete_user(id).await;
        self.note(&result, || format!("Deleted user {id}"));
        self.refresh().await;
        result
    }

    /// Flip `user`'s active flag. Returns the new value.
    pub async fn toggle_active(&self, user: &User) -> Result<bool, CoreError> {
        let is_active = !user.is_active;
        let result = self
            .inner
            .directory
            .set_user_active(&user.id, is_active)
            .await
            .map(|()| is_active);
        self.note(&result, || {
            let verb = if is_active { "Activated" } else { "Deactivated" };
            format!("{verb} {}", user.full_name())
        });
        self.refresh().await;
        result
    }

    pub fn dismiss_notice(&self) {
        let mut state = self.lock();
        state.notice = None;
        self.publish(&state);
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn note<T>(&self, result: &Result<T, CoreError>, success: impl FnOnce() -> String) {
        let mut state = self.lock();
        state.notice = Some(match result {
            Ok(_) => Notice::success(success()),
            Err(err) => Notice::error(err.to_string()),
        });
        self.publish(&state);
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &ViewState) {
        self.inner
            .snapshots
            .send_replace(state.snapshot(self.inner.page_size));
    }
}
