//! Record and target stores.
//!
//! The board consumes two external collaborators:
//! - a record feed that pushes snapshots and per-record changes
//! - a target store holding one goals document
//!
//! Two adapters are provided: an in-memory store and a JSONL file store
//! with a polling feed.

pub mod jsonl;
pub mod memory;

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::{RecordChange, RecordId, SaleRecord, Snapshot, Targets};

pub use jsonl::{JsonlFeed, JsonlStore};
pub use memory::MemoryStore;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn sales_path(&self) -> PathBuf {
        self.data_dir.join("sales.jsonl")
    }

    pub fn targets_path(&self) -> PathBuf {
        self.data_dir.join("targets.json")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// What a record feed delivers.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// The full current record set and the changes since the last delivery
    Snapshot(Snapshot),
    /// The feed has stopped and will deliver nothing further
    Disconnected { reason: String },
}

/// A live subscription to a record feed.
///
/// Dropping the subscription releases it, including any background task
/// that produces its events.
pub struct FeedSubscription {
    events: mpsc::UnboundedReceiver<FeedEvent>,
    producer: Option<JoinHandle<()>>,
}

impl FeedSubscription {
    pub fn new(events: mpsc::UnboundedReceiver<FeedEvent>) -> Self {
        Self {
            events,
            producer: None,
        }
    }

    /// A subscription backed by a task that is aborted on drop.
    pub fn with_producer(events: mpsc::UnboundedReceiver<FeedEvent>, producer: JoinHandle<()>) -> Self {
        Self {
            events,
            producer: Some(producer),
        }
    }

    /// Next event, or `None` once the feed has gone away.
    pub async fn next(&mut self) -> Option<FeedEvent> {
        self.events.recv().await
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        if let Some(producer) = self.producer.take() {
            producer.abort();
        }
    }
}

/// Push source of sale records.
#[async_trait]
pub trait RecordFeed: Send + Sync {
    /// Subscribe to the feed. The first event is a snapshot of the current
    /// record set with no change notifications.
    async fn subscribe(&self) -> Result<FeedSubscription, StorageError>;
}

/// The singleton targets document.
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Load targets. `Ok(None)` means the document does not exist.
    async fn load_targets(&self) -> Result<Option<Targets>, StorageError>;

    /// Overwrite the document.
    async fn save_targets(&self, targets: &Targets) -> Result<(), StorageError>;
}

/// Change notifications turning `previous` into `current`, matched by id.
///
/// Removals come first, then additions and modifications in `current` order.
pub fn diff_records(previous: &[SaleRecord], current: &[SaleRecord]) -> Vec<RecordChange> {
    let before: HashMap<&RecordId, &SaleRecord> = previous.iter().map(|r| (&r.id, r)).collect();
    let after: HashMap<&RecordId, &SaleRecord> = current.iter().map(|r| (&r.id, r)).collect();

    let mut changes: Vec<RecordChange> = previous
        .iter()
        .filter(|r| !after.contains_key(&r.id))
        .map(|r| RecordChange::removed(r.clone()))
        .collect();

    for record in current {
        match before.get(&record.id) {
            None => changes.push(RecordChange::added(record.clone())),
            Some(old) if *old != record => changes.push(RecordChange::modified(record.clone())),
            Some(_) => {}
        }
    }

    changes
}
