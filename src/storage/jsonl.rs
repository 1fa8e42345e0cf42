//! JSONL (JSON Lines) file store.
//!
//! `sales.jsonl` holds one sale per line and is the source of truth for
//! records. `targets.json` holds the single targets document. The feed
//! polls the sales file and pushes a snapshot whenever it changes.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::{
    diff_records, FeedEvent, FeedSubscription, RecordFeed, StorageConfig, StorageError,
    TargetStore,
};
use crate::models::{RecordId, SaleRecord, Snapshot, Targets};

/// Records parsed from a sales file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRecords {
    /// Records ordered by server timestamp, unstamped records last
    pub records: Vec<SaleRecord>,
    /// 1-based numbers of lines that were not valid records
    pub bad_lines: Vec<usize>,
}

/// Parse the contents of a sales file.
///
/// Lines without an id get one derived from their text, see [`DerivedIds`].
pub fn parse_records(contents: &str) -> ParsedRecords {
    let mut parsed = ParsedRecords::default();
    let mut derived = DerivedIds::default();

    for (index, line) in contents.lines().enumerate() {
        let line_num = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<SaleRecord>(line) {
            Ok(mut record) => {
                if record.id.is_empty() {
                    record.id = derived.next(line);
                }
                parsed.records.push(record);
            }
            Err(e) => {
                debug!("Skipping line {}: {}", line_num, e);
                parsed.bad_lines.push(line_num);
            }
        }
    }

    parsed.records.sort_by(|a, b| match (a.created_at, b.created_at) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    parsed
}

/// Ids for rows stored without one.
///
/// An id comes from the row text and the number of identical rows before it,
/// never from the line number, so deleting a row above leaves it unchanged.
#[derive(Debug, Default)]
struct DerivedIds<'a> {
    seen: HashMap<&'a str, usize>,
}

impl<'a> DerivedIds<'a> {
    fn next(&mut self, line: &'a str) -> RecordId {
        let line = line.trim();
        let occurrence = self.seen.entry(line).or_insert(0);
        let id = RecordId::generate(&["line", line, &occurrence.to_string()]);
        *occurrence += 1;
        id
    }
}

/// File-backed store for sales and targets.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    config: StorageConfig,
}

impl JsonlStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn sales_path(&self) -> PathBuf {
        self.config.sales_path()
    }

    pub fn targets_path(&self) -> PathBuf {
        self.config.targets_path()
    }

    fn ensure_dir(path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Read all records. A missing file is an empty store.
    pub fn read_records(&self) -> Result<ParsedRecords, StorageError> {
        let path = self.sales_path();
        if !path.exists() {
            return Ok(ParsedRecords::default());
        }

        let parsed = parse_records(&fs::read_to_string(&path)?);
        for line_num in &parsed.bad_lines {
            warn!("Failed to parse line {} in {:?}", line_num, path);
        }
        debug!("Read {} records from {:?}", parsed.records.len(), path);
        Ok(parsed)
    }

    /// Append one record.
    pub fn append_record(&self, record: &SaleRecord) -> Result<(), StorageError> {
        let path = self.sales_path();
        Self::ensure_dir(&path)?;

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", serde_json::to_string(record)?)?;
        writer.flush()?;

        info!("Appended sale {} for {} to {:?}", record.id, record.agent, path);
        Ok(())
    }

    /// Delete one record by id, rewriting the file.
    pub fn delete_record(&self, id: &RecordId) -> Result<SaleRecord, StorageError> {
        let path = self.sales_path();
        let contents = if path.exists() {
            fs::read_to_string(&path)?
        } else {
            String::new()
        };

        let mut kept = Vec::new();
        let mut removed = None;
        let mut derived = DerivedIds::default();
        for line in contents.lines() {
            let matches = serde_json::from_str::<SaleRecord>(line)
                .ok()
                .map(|record| {
                    let record_id = if record.id.is_empty() {
                        derived.next(line)
                    } else {
                        record.id.clone()
                    };
                    (record_id, record)
                })
                .filter(|(record_id, _)| record_id == id);

            match matches {
                Some((_, record)) if removed.is_none() => removed = Some(record),
                _ => kept.push(line),
            }
        }

        let removed = removed.ok_or_else(|| StorageError::RecordNotFound(id.clone()))?;

        let tmp = path.with_extension("jsonl.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            for line in kept {
                writeln!(writer, "{}", line)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, &path)?;

        info!("Deleted sale {} from {:?}", id, path);
        Ok(removed)
    }

    /// Read the targets document. `Ok(None)` if it does not exist.
    pub fn read_targets(&self) -> Result<Option<Targets>, StorageError> {
        let path = self.targets_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Overwrite the targets document.
    pub fn write_targets(&self, targets: &Targets) -> Result<(), StorageError> {
        let path = self.targets_path();
        Self::ensure_dir(&path)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(targets)?)?;
        fs::rename(&tmp, &path)?;

        info!("Wrote targets to {:?}", path);
        Ok(())
    }
}

#[async_trait]
impl TargetStore for JsonlStore {
    async fn load_targets(&self) -> Result<Option<Targets>, StorageError> {
        let path = self.targets_path();
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save_targets(&self, targets: &Targets) -> Result<(), StorageError> {
        self.write_targets(targets)
    }
}

/// Polling feed over a [`JsonlStore`]'s sales file.
#[derive(Debug, Clone)]
pub struct JsonlFeed {
    store: JsonlStore,
    interval: Duration,
}

impl JsonlFeed {
    pub fn new(store: JsonlStore, interval: Duration) -> Self {
        Self { store, interval }
    }
}

async fn read_sales_file(path: &Path) -> Result<ParsedRecords, StorageError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(parse_records(&contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ParsedRecords::default()),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl RecordFeed for JsonlFeed {
    async fn subscribe(&self) -> Result<FeedSubscription, StorageError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let path = self.store.sales_path();
        let period = self.interval;

        info!("Watching {:?} every {:?}", path, period);

        let producer = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut previous: Option<Vec<SaleRecord>> = None;
            let mut reported_bad_lines: Vec<usize> = Vec::new();

            loop {
                ticker.tick().await;

                let parsed = match read_sales_file(&path).await {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        error!("Failed to read {:?}: {}", path, e);
                        let _ = tx.send(FeedEvent::Disconnected {
                            reason: e.to_string(),
                        });
                        break;
                    }
                };

                if parsed.bad_lines != reported_bad_lines {
                    for line_num in &parsed.bad_lines {
                        warn!("Failed to parse line {} in {:?}", line_num, path);
                    }
                    reported_bad_lines = parsed.bad_lines.clone();
                }

                let snapshot = match &previous {
                    None => Snapshot::baseline(parsed.records.clone()),
                    Some(prev) => {
                        let changes = diff_records(prev, &parsed.records);
                        if changes.is_empty() {
                            continue;
                        }
                        Snapshot::new(parsed.records.clone(), changes)
                    }
                };

                if tx.send(FeedEvent::Snapshot(snapshot)).is_err() {
                    debug!("Feed subscriber gone, stopping poller");
                    break;
                }
                previous = Some(parsed.records);
            }
        });

        Ok(FeedSubscription::with_producer(rx, producer))
    }
}
