//! In-memory record and target store.
//!
//! Pushes a snapshot to every subscriber on each mutation, the way a
//! document store's live query does. Used for embedding and tests.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use super::{FeedEvent, FeedSubscription, RecordFeed, StorageError, TargetStore};
use crate::models::{RecordChange, RecordId, SaleRecord, Snapshot, Targets};

#[derive(Default)]
struct Inner {
    records: Vec<SaleRecord>,
    targets: Option<Targets>,
    subscribers: Vec<mpsc::UnboundedSender<FeedEvent>>,
}

impl Inner {
    fn broadcast(&mut self, changes: Vec<RecordChange>) {
        let event = FeedEvent::Snapshot(Snapshot::new(self.records.clone(), changes));
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Shared in-memory store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing records and targets.
    pub fn with_data(records: Vec<SaleRecord>, targets: Option<Targets>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.lock();
            inner.records = records;
            inner.targets = targets;
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock only means a subscriber send panicked; the data is intact.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn records(&self) -> Vec<SaleRecord> {
        self.lock().records.clone()
    }

    /// Append a record and notify subscribers.
    pub fn add(&self, record: SaleRecord) {
        let mut inner = self.lock();
        inner.records.push(record.clone());
        debug!("Added record {} for {}", record.id, record.agent);
        inner.broadcast(vec![RecordChange::added(record)]);
    }

    /// Replace the record with the same id.
    pub fn modify(&self, record: SaleRecord) -> Result<(), StorageError> {
        let mut inner = self.lock();
        let slot = inner
            .records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| StorageError::RecordNotFound(record.id.clone()))?;
        *slot = record.clone();
        inner.broadcast(vec![RecordChange::modified(record)]);
        Ok(())
    }

    /// Delete a record by id.
    pub fn remove(&self, id: &RecordId) -> Result<SaleRecord, StorageError> {
        let mut inner = self.lock();
        let index = inner
            .records
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| StorageError::RecordNotFound(id.clone()))?;
        let removed = inner.records.remove(index);
        inner.broadcast(vec![RecordChange::removed(removed.clone())]);
        Ok(removed)
    }

    /// Tell every subscriber the feed is gone and drop them.
    pub fn disconnect(&self, reason: &str) {
        let mut inner = self.lock();
        for tx in inner.subscribers.drain(..) {
            let _ = tx.send(FeedEvent::Disconnected {
                reason: reason.to_string(),
            });
        }
    }

    /// Live subscribers; released subscriptions are dropped on the next push.
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.lock();
        inner.subscribers.retain(|tx| !tx.is_closed());
        inner.subscribers.len()
    }

    pub fn set_targets(&self, targets: Option<Targets>) {
        self.lock().targets = targets;
    }
}

#[async_trait]
impl RecordFeed for MemoryStore {
    async fn subscribe(&self) -> Result<FeedSubscription, StorageError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        let _ = tx.send(FeedEvent::Snapshot(Snapshot::baseline(inner.records.clone())));
        inner.subscribers.push(tx);
        Ok(FeedSubscription::new(rx))
    }
}

#[async_trait]
impl TargetStore for MemoryStore {
    async fn load_targets(&self) -> Result<Option<Targets>, StorageError> {
        Ok(self.lock().targets)
    }

    async fn save_targets(&self, targets: &Targets) -> Result<(), StorageError> {
        self.lock().targets = Some(*targets);
        Ok(())
    }
}
