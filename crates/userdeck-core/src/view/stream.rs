// ── Snapshot subscription ──

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::snapshot::ListSnapshot;

/// A subscription to view-model snapshots.
///
/// Offers point-in-time access plus change notification via `changed()`
/// or by converting into a `Stream`.
pub struct SnapshotStream {
    receiver: watch::Receiver<ListSnapshot>,
}

impl SnapshotStream {
    pub(crate) fn new(receiver: watch::Receiver<ListSnapshot>) -> Self {
        Self { receiver }
    }

    /// The latest snapshot.
    pub fn latest(&self) -> ListSnapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change. `None` once the view-model is gone.
    pub async fn changed(&mut self) -> Option<ListSnapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Convert into a `Stream` that yields the current snapshot first.
    pub fn into_stream(self) -> SnapshotWatchStream {
        SnapshotWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct SnapshotWatchStream {
    inner: WatchStream<ListSnapshot>,
}

impl Stream for SnapshotWatchStream {
    type Item = ListSnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
