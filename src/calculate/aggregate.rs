//! Fold a record snapshot into per-agent statistics.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::window;
use crate::models::{AgentStats, AmountField, RecordFault, Roster, SaleRecord};

/// Result of aggregating one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    /// One entry per rostered agent, including agents with no sales
    pub stats: BTreeMap<String, AgentStats>,

    /// Malformed fields found in rostered agents' records
    pub faults: Vec<RecordFault>,

    /// Records skipped because their agent is on no roster
    pub unrostered: usize,
}

impl Aggregation {
    /// Number of distinct records with at least one fault.
    pub fn faulty_records(&self) -> usize {
        let mut ids: Vec<_> = self
            .faults
            .iter()
            .map(|f| match f {
                RecordFault::InvalidAmount { record, .. } | RecordFault::InvalidDate { record, .. } => {
                    record
                }
            })
            .collect();
        ids.sort();
        ids.dedup();
        ids.len()
    }
}

/// Aggregate `records` for the agents on `roster`, classifying dates
/// against `today`.
///
/// A malformed amount contributes zero and a malformed date counts toward
/// no window; either is reported as a fault and the batch carries on.
pub fn aggregate(records: &[SaleRecord], roster: &Roster, today: NaiveDate) -> Aggregation {
    let mut stats: BTreeMap<String, AgentStats> = roster
        .all_members()
        .map(|agent| (agent.to_string(), AgentStats::default()))
        .collect();
    let mut faults = Vec::new();
    let mut unrostered = 0;

    for record in records {
        let Some(entry) = stats.get_mut(record.agent.as_str()) else {
            unrostered += 1;
            continue;
        };

        let upfront = amount_or_zero(record, AmountField::Upfront, &mut faults);
        let monitoring = amount_or_zero(record, AmountField::Monitoring, &mut faults);

        let windows = match record.calendar_date() {
            Some(date) => window::classify(date, today),
            None => {
                faults.push(RecordFault::InvalidDate {
                    record: record.id.clone(),
                    agent: record.agent.clone(),
                    raw: record.date.clone(),
                });
                Default::default()
            }
        };

        entry.add_sale(upfront, monitoring, windows);
    }

    for entry in stats.values_mut() {
        entry.finalize();
    }

    Aggregation {
        stats,
        faults,
        unrostered,
    }
}

fn amount_or_zero(record: &SaleRecord, field: AmountField, faults: &mut Vec<RecordFault>) -> f64 {
    let raw = match field {
        AmountField::Upfront => &record.upfront,
        AmountField::Monitoring => &record.monitoring,
    };
    match raw.value() {
        Ok(value) => value,
        Err(raw) => {
            faults.push(RecordFault::InvalidAmount {
                record: record.id.clone(),
                agent: record.agent.clone(),
                field,
                raw,
            });
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawAmount;
    use chrono::{TimeZone, Utc};

    fn today() -> NaiveDate {
        // Wednesday
        NaiveDate::from_ymd_opt(2025, 6, 18).unwrap()
    }

    fn sale(agent: &str, upfront: f64, monitoring: f64, date: NaiveDate) -> SaleRecord {
        SaleRecord::new(
            agent,
            upfront,
            monitoring,
            date,
            Utc.with_ymd_and_hms(2025, 6, 18, 9, 0, 0).unwrap(),
        )
    }

    fn roster(core: &[&str], sweep: &[&str]) -> Roster {
        Roster::new(
            core.iter().map(|s| s.to_string()).collect(),
            sweep.iter().map(|s| s.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_every_member_gets_a_row() {
        let result = aggregate(&[], &Roster::default(), today());
        assert_eq!(result.stats.len(), 9);
        assert!(result.stats.values().all(|s| *s == AgentStats::default()));
    }

    #[test]
    fn test_windows_and_averages() {
        let roster = roster(&["A", "B"], &["C"]);
        let monday = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        let records = vec![
            sale("A", 100.0, 50.0, today()),
            sale("A", 200.0, 0.0, today()),
            sale("B", 50.0, 50.0, monday),
        ];

        let result = aggregate(&records, &roster, today());
        let a = &result.stats["A"];
        let b = &result.stats["B"];

        assert_eq!(a.daily_count, 2);
        assert_eq!(a.record_count, 2);
        assert_eq!(a.avg_upfront, 150.0);
        assert_eq!(a.avg_monitoring, 25.0);
        assert_eq!(b.daily_count, 0);
        assert_eq!(b.weekly_count, 1);
        assert_eq!(b.monthly_count, 1);
        assert_eq!(b.record_count, 1);
        assert!(result.faults.is_empty());
    }

    #[test]
    fn test_old_sales_count_only_toward_totals() {
        let roster = roster(&["A"], &["C"]);
        let last_year = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();

        let result = aggregate(&[sale("A", 80.0, 20.0, last_year)], &roster, today());
        let a = &result.stats["A"];

        assert_eq!(a.record_count, 1);
        assert_eq!(a.yearly_count, 0);
        assert_eq!(a.upfront_total, 80.0);
    }

    #[test]
    fn test_unrostered_agents_are_skipped() {
        let roster = roster(&["A"], &["C"]);
        let records = vec![sale("A", 1.0, 1.0, today()), sale("Zed", 1.0, 1.0, today())];

        let result = aggregate(&records, &roster, today());

        assert_eq!(result.unrostered, 1);
        assert!(!result.stats.contains_key("Zed"));
        assert!(result.faults.is_empty());
    }

    #[test]
    fn test_malformed_amount_contributes_zero() {
        let roster = roster(&["A"], &["C"]);
        let mut bad = sale("A", 0.0, 40.0, today()).with_id("bad-1");
        bad.upfront = RawAmount::Text("lots".to_string());
        let records = vec![sale("A", 100.0, 0.0, today()), bad];

        let result = aggregate(&records, &roster, today());
        let a = &result.stats["A"];

        assert_eq!(a.record_count, 2);
        assert_eq!(a.upfront_total, 100.0);
        assert_eq!(a.monitoring_total, 40.0);
        assert_eq!(a.avg_upfront, 50.0);
        assert!(a.avg_upfront.is_finite());
        assert_eq!(result.faults.len(), 1);
        assert!(matches!(
            &result.faults[0],
            RecordFault::InvalidAmount { field: AmountField::Upfront, raw, .. } if raw == "lots"
        ));
        assert_eq!(result.faulty_records(), 1);
    }

    #[test]
    fn test_malformed_date_counts_in_no_window() {
        let roster = roster(&["A"], &["C"]);
        let mut bad = sale("A", 10.0, 5.0, today());
        bad.date = "someday".to_string();

        let result = aggregate(&[bad], &roster, today());
        let a = &result.stats["A"];

        assert_eq!(a.record_count, 1);
        assert_eq!(a.daily_count, 0);
        assert_eq!(a.yearly_count, 0);
        assert_eq!(a.upfront_total, 10.0);
        assert!(matches!(result.faults[0], RecordFault::InvalidDate { .. }));
    }

    #[test]
    fn test_record_count_matches_rostered_input() {
        let roster = Roster::default();
        let agents = ["Craig", "Ross", "Nobody", "Lar", "Keith", "Someone", "Craig"];
        let records: Vec<_> = agents
            .iter()
            .enumerate()
            .map(|(i, a)| sale(a, i as f64 * 10.0, 5.0, today()))
            .collect();

        let result = aggregate(&records, &roster, today());
        let counted: u32 = result.stats.values().map(|s| s.record_count).sum();
        let expected = agents.iter().filter(|a| roster.contains(a)).count() as u32;

        assert_eq!(counted, expected);
        assert_eq!(result.unrostered, 2);

        for s in result.stats.values().filter(|s| s.record_count > 0) {
            let product = s.avg_upfront * s.record_count as f64;
            assert!((product - s.upfront_total).abs() < 1e-9);
        }
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let roster = Roster::default();
        let records = vec![
            sale("Craig", 100.0, 10.0, today()),
            sale("Keith", 50.0, 20.0, today()),
        ];

        assert_eq!(
            aggregate(&records, &roster, today()),
            aggregate(&records, &roster, today())
        );
    }
}
