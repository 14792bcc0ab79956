// ── Query/mutation cache ──
//
// Memoized reads keyed by `QueryKey`, with in-flight coalescing and
// prefix invalidation.

mod key;
mod query_cache;

pub use key::{KeyPrefix, Page, QueryFilter, QueryKey, Resource};
pub use query_cache::{FetchResult, QueryCache, QueryState};
