//! What the record feed delivers: full snapshots and per-record changes.

use serde::{Deserialize, Serialize};

use super::SaleRecord;

/// Kind of change to a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// A change notification for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordChange {
    pub kind: ChangeKind,
    pub record: SaleRecord,
}

impl RecordChange {
    pub fn added(record: SaleRecord) -> Self {
        Self {
            kind: ChangeKind::Added,
            record,
        }
    }

    pub fn modified(record: SaleRecord) -> Self {
        Self {
            kind: ChangeKind::Modified,
            record,
        }
    }

    pub fn removed(record: SaleRecord) -> Self {
        Self {
            kind: ChangeKind::Removed,
            record,
        }
    }
}

/// The full current record set, in store order, plus the changes that
/// produced it since the previous delivery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub records: Vec<SaleRecord>,
    #[serde(default)]
    pub changes: Vec<RecordChange>,
}

impl Snapshot {
    pub fn new(records: Vec<SaleRecord>, changes: Vec<RecordChange>) -> Self {
        Self { records, changes }
    }

    /// A snapshot with no change notifications, such as the first delivery.
    pub fn baseline(records: Vec<SaleRecord>) -> Self {
        Self::new(records, Vec::new())
    }

    /// Replace an older pending snapshot that was never processed.
    ///
    /// The newer record set wins; change notifications of both are kept in
    /// delivery order so no highlight is lost.
    pub fn supersede(mut self, older: Snapshot) -> Snapshot {
        let mut changes = older.changes;
        changes.append(&mut self.changes);
        self.changes = changes;
        self
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn sale(agent: &str, minute: u32) -> SaleRecord {
        SaleRecord::new(
            agent,
            100.0,
            10.0,
            NaiveDate::from_ymd_opt(2025, 6, 16).unwrap(),
            Utc.with_ymd_and_hms(2025, 6, 16, 9, minute, 0).unwrap(),
        )
    }

    #[test]
    fn test_supersede_keeps_newest_records_and_all_changes() {
        let a = sale("Craig", 1);
        let b = sale("Jamie", 2);

        let older = Snapshot::new(vec![a.clone()], vec![RecordChange::added(a.clone())]);
        let newer = Snapshot::new(
            vec![a.clone(), b.clone()],
            vec![RecordChange::added(b.clone())],
        );

        let merged = newer.supersede(older);

        assert_eq!(merged.total(), 2);
        assert_eq!(merged.changes.len(), 2);
        assert_eq!(merged.changes[0].record.agent, "Craig");
        assert_eq!(merged.changes[1].record.agent, "Jamie");
    }

    #[test]
    fn test_baseline_has_no_changes() {
        let snapshot = Snapshot::baseline(vec![sale("Craig", 1)]);
        assert!(snapshot.changes.is_empty());
        assert_eq!(snapshot.total(), 1);
    }
}
