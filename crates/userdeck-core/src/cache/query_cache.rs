// ── Generic query cache ──
//
// Concurrent keyed storage of read results with push-based state
// notification via `watch` channels. A miss spawns the fetch as its own
// task and shares it between every reader of that key, so concurrent
// reads cost one request and a fetch survives its readers going away.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::key::{KeyPrefix, QueryKey};
use crate::error::CoreError;

/// Outcome of a read as delivered to every waiting reader.
pub type FetchResult<V> = Result<Arc<V>, Arc<CoreError>>;

type SharedFetch<V> = Shared<BoxFuture<'static, FetchResult<V>>>;

// ── QueryState ───────────────────────────────────────────────────────

/// Observable state of one key.
///
/// `Loading` only appears while a key has never produced data; a refetch
/// of a key that holds data keeps reporting `Ready(previous)`.
#[derive(Debug)]
pub enum QueryState<V> {
    Idle,
    Loading,
    Ready(Arc<V>),
    Error(Arc<CoreError>),
}

impl<V> Clone for QueryState<V> {
    fn clone(&self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Loading => Self::Loading,
            Self::Ready(data) => Self::Ready(Arc::clone(data)),
            Self::Error(err) => Self::Error(Arc::clone(err)),
        }
    }
}

impl<V> QueryState<V> {
    pub fn data(&self) -> Option<&Arc<V>> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Arc<CoreError>> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

// ── Slot ─────────────────────────────────────────────────────────────

struct Inflight<V> {
    id: u64,
    fetch: SharedFetch<V>,
}

struct Slot<V> {
    state: watch::Sender<QueryState<V>>,
    /// Set by invalidation; cleared when a new fetch starts.
    stale: bool,
    fetched_at: Option<Instant>,
    /// Fetch new readers may join. Dropped by invalidation.
    inflight: Option<Inflight<V>>,
    /// Id of the most recently started fetch; only its result is stored.
    latest: Option<u64>,
}

impl<V> Slot<V> {
    fn new() -> Self {
        let (state, _) = watch::channel(QueryState::Idle);
        Self {
            state,
            stale: false,
            fetched_at: None,
            inflight: None,
            latest: None,
        }
    }

    /// Data that may be served without a fetch.
    fn fresh_data(&self, stale_after: Option<Duration>) -> Option<Arc<V>> {
        if self.stale {
            return None;
        }
        if let (Some(max_age), Some(at)) = (stale_after, self.fetched_at) {
            if at.elapsed() >= max_age {
                return None;
            }
        }
        let data = match &*self.state.borrow() {
            QueryState::Ready(data) => Arc::clone(data),
            _ => return None,
        };
        Some(data)
    }

    /// Record the result of fetch `id`. Results of superseded fetches are
    /// dropped. The stale flag is left alone, so a fetch that was running
    /// when its key was invalidated lands as stale data.
    fn settle(&mut self, id: u64, result: &FetchResult<V>) {
        if self.latest != Some(id) {
            return;
        }
        if self.inflight.as_ref().is_some_and(|f| f.id == id) {
            self.inflight = None;
        }
        self.fetched_at = Some(Instant::now());
        let next = match result {
            Ok(data) => QueryState::Ready(Arc::clone(data)),
            Err(err) => QueryState::Error(Arc::clone(err)),
        };
        self.state.send_replace(next);
    }
}

enum Lookup<V> {
    Hit(Arc<V>),
    Pending(SharedFetch<V>),
}

// ── QueryCache ───────────────────────────────────────────────────────

/// Keyed cache of reads of one value type.
///
/// Cheap to share behind an `Arc`. No lock is held across an `.await`:
/// every slot access is synchronous and the shared fetch is awaited only
/// after the slot guard is released.
pub struct QueryCache<V: Send + Sync + 'static> {
    slots: Arc<DashMap<QueryKey, Slot<V>>>,
    invalidations: watch::Sender<u64>,
    next_fetch: AtomicU64,
    stale_after: Option<Duration>,
}

impl<V: Send + Sync + 'static> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<V: Send + Sync + 'static> QueryCache<V> {
    pub fn new(stale_after: Option<Duration>) -> Self {
        let (invalidations, _) = watch::channel(0u64);
        Self {
            slots: Arc::new(DashMap::new()),
            invalidations,
            next_fetch: AtomicU64::new(0),
            stale_after,
        }
    }

    /// Read `key`, fetching it with `fetch` unless fresh data is cached or
    /// a fetch for the same key is already running.
    ///
    /// `fetch` is only invoked on a real miss. Its future runs as a
    /// spawned task, so it completes and populates the cache even when
    /// every reader is dropped first. Requires a tokio runtime.
    pub async fn read<F, Fut>(&self, key: &QueryKey, fetch: F) -> FetchResult<V>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<V, CoreError>> + Send + 'static,
    {
        match self.lookup(key, fetch) {
            Lookup::Hit(data) => Ok(data),
            Lookup::Pending(fetch) => fetch.await,
        }
    }

    fn lookup<F, Fut>(&self, key: &QueryKey, fetch: F) -> Lookup<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, CoreError>> + Send + 'static,
    {
        let mut slot = self.slots.entry(key.clone()).or_insert_with(Slot::new);

        if let Some(data) = slot.fresh_data(self.stale_after) {
            trace!(%key, "query cache hit");
            return Lookup::Hit(data);
        }
        if let Some(inflight) = &slot.inflight {
            debug!(%key, "joining in-flight query");
            return Lookup::Pending(inflight.fetch.clone());
        }

        let id = self.next_fetch.fetch_add(1, Ordering::Relaxed);
        debug!(%key, fetch_id = id, "query cache miss, fetching");

        slot.stale = false;
        slot.latest = Some(id);
        if slot.state.borrow().data().is_none() {
            slot.state.send_replace(QueryState::Loading);
        }

        let pending = fetch();
        let slots = Arc::clone(&self.slots);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let result: FetchResult<V> = pending.await.map(Arc::new).map_err(Arc::new);
            if let Some(mut slot) = slots.get_mut(&task_key) {
                slot.settle(id, &result);
            }
            result
        });

        let shared = async move {
            handle.await.unwrap_or_else(|e| {
                Err(Arc::new(CoreError::Internal(format!(
                    "query task failed: {e}"
                ))))
            })
        }
        .boxed()
        .shared();

        slot.inflight = Some(Inflight {
            id,
            fetch: shared.clone(),
        });
        Lookup::Pending(shared)
    }

    /// Mark every key matching `prefix` stale and bump the invalidation
    /// counter. Returns how many keys were marked.
    ///
    /// A fetch already in flight for a matching key may have read the
    /// server before the change, so later reads start a new one instead of
    /// joining it. Its result is still stored, as stale data, unless a
    /// newer fetch has started by then.
    pub fn invalidate(&self, prefix: &KeyPrefix) -> usize {
        let mut marked = 0;
        for mut slot in self.slots.iter_mut() {
            if prefix.matches(slot.key()) {
                slot.stale = true;
                slot.inflight = None;
                marked += 1;
            }
        }
        self.invalidations.send_modify(|n| *n += 1);
        debug!(%prefix, marked, "invalidated queries");
        marked
    }

    /// Current state of `key` (`Idle` if never read).
    pub fn state(&self, key: &QueryKey) -> QueryState<V> {
        self.slots
            .get(key)
            .map_or(QueryState::Idle, |slot| slot.state.borrow().clone())
    }

    /// Observe state changes of `key`.
    pub fn subscribe(&self, key: &QueryKey) -> watch::Receiver<QueryState<V>> {
        self.slots
            .entry(key.clone())
            .or_insert_with(Slot::new)
            .state
            .subscribe()
    }

    /// Whether the next read of `key` would fetch.
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.slots
            .get(key)
            .is_none_or(|slot| slot.fresh_data(self.stale_after).is_none())
    }

    /// Ticks once per `invalidate` call.
    pub fn watch_invalidations(&self) -> watch::Receiver<u64> {
        self.invalidations.subscribe()
    }

    pub fn invalidation_count(&self) -> u64 {
        *self.invalidations.borrow()
    }

    /// Drop every entry. Running fetches complete but no longer store
    /// their result.
    pub fn clear(&self) {
        self.slots.clear();
        debug!("query cache cleared");
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use std::task::Poll;

    use tokio::sync::Semaphore;
    use tokio_test::task::Spawn;
    use tokio_test::{assert_pending, task};

    use super::*;
    use crate::cache::{Page, QueryFilter, Resource};

    /// Poll a mock-woken task until it completes, yielding to the runtime
    /// in between so spawned fetches can run.
    async fn finish<T: Future>(mut spawned: Spawn<T>) -> T::Output {
        loop {
            if let Poll::Ready(out) = spawned.poll() {
                return out;
            }
            tokio::task::yield_now().await;
        }
    }

    fn users_key(page: u32) -> QueryKey {
        QueryKey::users(QueryFilter::All, Page::new(page, 10))
    }

    fn fetch_ok(
        calls: &Arc<AtomicUsize>,
        value: u32,
    ) -> impl FnOnce() -> std::future::Ready<Result<u32, CoreError>> + Send + use<> {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(value))
        }
    }

    fn fetch_gated(
        calls: &Arc<AtomicUsize>,
        gate: &Arc<Semaphore>,
        value: u32,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<u32, CoreError>> + Send + use<> {
        let calls = Arc::clone(calls);
        let gate = Arc::clone(gate);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                gate.acquire().await.unwrap().forget();
                Ok(value)
            }
            .boxed()
        }
    }

    fn fetch_err(
        calls: &Arc<AtomicUsize>,
    ) -> impl FnOnce() -> std::future::Ready<Result<u32, CoreError>> + Send + use<> {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Err(CoreError::Api {
                message: "boom".into(),
                status: Some(500),
            }))
        }
    }

    // ── Hits and misses ─────────────────────────────────────────────

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let cache = QueryCache::<u32>::default();
        let calls = Arc::new(AtomicUsize::new(0));

        assert_eq!(*cache.read(&users_key(1), fetch_ok(&calls, 7)).await.unwrap(), 7);
        assert_eq!(*cache.read(&users_key(1), fetch_ok(&calls, 8)).await.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(cache.state(&users_key(1)), QueryState::Ready(v) if *v == 7));
    }

    #[tokio::test]
    async fn different_keys_fetch_independently() {
        let cache = QueryCache::<u32>::default();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.read(&users_key(1), fetch_ok(&calls, 1)).await.unwrap();
        cache.read(&users_key(2), fetch_ok(&calls, 2)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    // ── Coalescing ──────────────────────────────────────────────────

    #[tokio::test]
    async fn concurrent_reads_share_one_fetch() {
        let cache = QueryCache::<u32>::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Semaphore::new(0));
        let key = users_key(1);

        let mut first = task::spawn(cache.read(&key, fetch_gated(&calls, &gate, 5)));
        let mut second = task::spawn(cache.read(&key, fetch_gated(&calls, &gate, 6)));
        assert_pending!(first.poll());
        assert_pending!(second.poll());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.state(&key).is_loading());
        drop((first, second));

        gate.add_permits(1);
        let (a, b) = tokio::join!(
            cache.read(&key, fetch_gated(&calls, &gate, 9)),
            cache.read(&key, fetch_gated(&calls, &gate, 9)),
        );
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_completes_after_readers_are_dropped() {
        let cache = QueryCache::<u32>::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Semaphore::new(0));
        let key = users_key(1);
        let mut rx = cache.subscribe(&key);

        let mut reader = task::spawn(cache.read(&key, fetch_gated(&calls, &gate, 3)));
        assert_pending!(reader.poll());
        drop(reader);

        gate.add_permits(1);
        rx.wait_for(|state| state.data().is_some()).await.unwrap();
        assert_eq!(*cache.read(&key, fetch_ok(&calls, 4)).await.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    // ── Invalidation ────────────────────────────────────────────────

    #[tokio::test]
    async fn invalidation_forces_refetch_and_keeps_previous_data_visible() {
        let cache = QueryCache::<u32>::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Semaphore::new(0));
        let key = users_key(1);

        cache.read(&key, fetch_ok(&calls, 1)).await.unwrap();
        assert_eq!(cache.invalidate(&KeyPrefix::resource(Resource::Users)), 1);
        assert!(cache.is_stale(&key));
        assert_eq!(cache.invalidation_count(), 1);

        let mut refetch = task::spawn(cache.read(&key, fetch_gated(&calls, &gate, 2)));
        assert_pending!(refetch.poll());
        assert!(matches!(cache.state(&key), QueryState::Ready(v) if *v == 1));

        gate.add_permits(1);
        assert_eq!(*finish(refetch).await.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidation_during_fetch_leaves_entry_stale() {
        let cache = QueryCache::<u32>::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Semaphore::new(0));
        let key = users_key(1);

        let mut reader = task::spawn(cache.read(&key, fetch_gated(&calls, &gate, 1)));
        assert_pending!(reader.poll());
        cache.invalidate(&KeyPrefix::resource(Resource::Users));

        gate.add_permits(1);
        assert_eq!(*finish(reader).await.unwrap(), 1);
        assert!(cache.is_stale(&key));

        assert_eq!(*cache.read(&key, fetch_ok(&calls, 2)).await.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn read_after_invalidation_does_not_join_older_fetch() {
        let cache = QueryCache::<u32>::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Semaphore::new(0));
        let key = users_key(1);

        let mut before = task::spawn(cache.read(&key, fetch_gated(&calls, &gate, 1)));
        assert_pending!(before.poll());
        cache.invalidate(&KeyPrefix::resource(Resource::Users));

        assert_eq!(*cache.read(&key, fetch_ok(&calls, 2)).await.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // The older fetch still answers its own reader but must not
        // replace the newer result.
        gate.add_permits(1);
        assert_eq!(*finish(before).await.unwrap(), 1);
        assert!(matches!(cache.state(&key), QueryState::Ready(v) if *v == 2));
        assert_eq!(*cache.read(&key, fetch_ok(&calls, 3)).await.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidation_respects_prefix() {
        let cache = QueryCache::<u32>::default();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.read(&users_key(1), fetch_ok(&calls, 1)).await.unwrap();
        cache.read(&QueryKey::profiles(), fetch_ok(&calls, 2)).await.unwrap();

        cache.invalidate(&KeyPrefix::resource(Resource::Users));
        assert!(cache.is_stale(&users_key(1)));
        assert!(!cache.is_stale(&QueryKey::profiles()));
    }

    // ── Failures ────────────────────────────────────────────────────

    #[tokio::test]
    async fn failure_is_recorded_per_key_and_retried_on_next_read() {
        let cache = QueryCache::<u32>::default();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.read(&users_key(2), fetch_ok(&calls, 20)).await.unwrap();
        let err = cache.read(&users_key(1), fetch_err(&calls)).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(cache.state(&users_key(1)).error().is_some());
        assert!(matches!(cache.state(&users_key(2)), QueryState::Ready(v) if *v == 20));

        assert_eq!(*cache.read(&users_key(1), fetch_ok(&calls, 10)).await.unwrap(), 10);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    // ── Expiry and teardown ─────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn stale_after_expires_entries() {
        let cache = QueryCache::<u32>::new(Some(Duration::from_secs(60)));
        let calls = Arc::new(AtomicUsize::new(0));
        let key = users_key(1);

        cache.read(&key, fetch_ok(&calls, 1)).await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        cache.read(&key, fetch_ok(&calls, 2)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(*cache.read(&key, fetch_ok(&calls, 3)).await.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let cache = QueryCache::<u32>::default();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.read(&users_key(1), fetch_ok(&calls, 1)).await.unwrap();
        cache.clear();
        assert!(cache.is_empty());
        assert!(matches!(cache.state(&users_key(1)), QueryState::Idle));
    }
}
