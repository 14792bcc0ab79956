//! Data bridge: forwards view-model snapshots into the TUI action loop.
//!
//! Runs as a background task. Kicks off the first load, keeps the list in
//! sync with cache invalidations, and turns every published snapshot into
//! an [`Action::SnapshotUpdated`].

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use userdeck_core::{UserListViewModel, UserService};

use crate::action::Action;

pub async fn spawn_data_bridge<S: UserService>(
    view_model: UserListViewModel<S>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    // Yields the current snapshot first, so the screen renders Loading at once.
    let mut snapshots = view_model.stream().into_stream();
    let watcher = view_model.watch_invalidations(cancel.child_token());

    let initial = view_model.clone();
    let loader = tokio::spawn(async move { initial.refresh().await });

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            next = snapshots.next() => {
                let Some(snapshot) = next else { break };
                if action_tx.send(Action::SnapshotUpdated(Box::new(snapshot))).is_err() {
                    break;
                }
            }
        }
    }

    loader.abort();
    watcher.abort();
    debug!("data bridge shut down");
}
