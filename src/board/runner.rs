//! Async driver for the dashboard.
//!
//! Cycles are serialized: fetch targets, recompute, publish. Snapshots that
//! arrive while targets are being fetched replace the pending one, keeping
//! its change notifications.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{Dashboard, ViewSink};
use crate::models::{BoardUpdate, Targets};
use crate::storage::{FeedEvent, FeedSubscription, RecordFeed, StorageError, TargetStore};

/// Errors that stop the board before it runs.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Failed to subscribe to record feed: {0}")]
    Subscribe(#[from] StorageError),
}

/// Why [`BoardRunner::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Shutdown was requested
    Shutdown,
    /// The record feed went away; the sink has been told
    Disconnected,
}

/// Drives a [`Dashboard`] from a record feed.
pub struct BoardRunner {
    dashboard: Dashboard,
    targets: Arc<dyn TargetStore>,
    sink: Arc<dyn ViewSink>,
}

impl BoardRunner {
    pub fn new(dashboard: Dashboard, targets: Arc<dyn TargetStore>, sink: Arc<dyn ViewSink>) -> Self {
        Self {
            dashboard,
            targets,
            sink,
        }
    }

    /// Subscribe to `feed` and run until shutdown or disconnect.
    pub async fn subscribe_and_run(
        self,
        feed: &dyn RecordFeed,
        shutdown: watch::Receiver<bool>,
    ) -> Result<RunOutcome, BoardError> {
        let subscription = feed.subscribe().await?;
        Ok(self.run(subscription, shutdown).await)
    }

    /// Process feed events until `shutdown` turns true or the feed ends.
    ///
    /// Dropping the sender half of `shutdown` also stops the runner. On
    /// return the subscription is released and any pending target fetch is
    /// dropped.
    pub async fn run(mut self, mut feed: FeedSubscription, mut shutdown: watch::Receiver<bool>) -> RunOutcome {
        info!("Board runner started");

        loop {
            let event = tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown) => return self.shut_down(),
                event = feed.next() => event,
            };

            let mut snapshot = match event {
                Some(FeedEvent::Snapshot(snapshot)) => snapshot,
                Some(FeedEvent::Disconnected { reason }) => return self.disconnected(reason),
                None => return self.disconnected("record feed closed".to_string()),
            };

            let targets = {
                let fetch = load_targets_or_zero(self.targets.as_ref());
                tokio::pin!(fetch);

                loop {
                    tokio::select! {
                        biased;
                        _ = shutdown_requested(&mut shutdown) => return self.shut_down(),
                        event = feed.next() => match event {
                            Some(FeedEvent::Snapshot(newer)) => {
                                debug!("Snapshot superseded while fetching targets");
                                snapshot = newer.supersede(snapshot);
                            }
                            Some(FeedEvent::Disconnected { reason }) => return self.disconnected(reason),
                            None => return self.disconnected("record feed closed".to_string()),
                        },
                        targets = &mut fetch => break targets,
                    }
                }
            };

            let view = self.dashboard.recompute(&snapshot, &targets, Utc::now());
            self.sink.publish(BoardUpdate::View(Box::new(view)));
        }
    }

    fn shut_down(&self) -> RunOutcome {
        info!("Board runner stopping");
        RunOutcome::Shutdown
    }

    fn disconnected(&self, reason: String) -> RunOutcome {
        warn!("Record feed disconnected: {}", reason);
        self.sink.publish(BoardUpdate::Disconnected {
            since: Utc::now(),
            reason,
        });
        RunOutcome::Disconnected
    }
}

/// Resolves once shutdown is requested or the sender is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// Targets for one cycle. A missing or unreadable document means all zeros.
async fn load_targets_or_zero(store: &dyn TargetStore) -> Targets {
    match store.load_targets().await {
        Ok(Some(targets)) => targets,
        Ok(None) => {
            debug!("No targets document, using zero targets");
            Targets::default()
        }
        Err(e) => {
            warn!("Failed to load targets, using zero targets: {}", e);
            Targets::default()
        }
    }
}
