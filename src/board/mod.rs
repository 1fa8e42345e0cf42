//! The sales board.
//!
//! [`Dashboard`] runs one recomputation cycle over a snapshot and targets.
//! [`BoardRunner`] drives it from a record feed and pushes each finished
//! view to a [`ViewSink`].

mod runner;

pub use runner::{BoardError, BoardRunner, RunOutcome};

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::calculate::badges;
use crate::calculate::window;
use crate::calculate::{
    aggregate, compute_kpis, rank, CelebrationDetector, EventWindows, RankingState, TeamLeaders,
};
use crate::models::{BoardStatus, BoardUpdate, Roster, Snapshot, TeamName, TeamRow, Targets, ViewState};

/// Where finished views go.
pub trait ViewSink: Send + Sync {
    fn publish(&self, update: BoardUpdate);
}

/// Keeps only the latest state for readers such as the HTTP API.
impl ViewSink for watch::Sender<BoardStatus> {
    fn publish(&self, update: BoardUpdate) {
        self.send_modify(|status| status.apply(update));
    }
}

/// Delivers every update in order.
impl ViewSink for mpsc::UnboundedSender<BoardUpdate> {
    fn publish(&self, update: BoardUpdate) {
        if self.send(update).is_err() {
            debug!("View receiver dropped, update discarded");
        }
    }
}

/// Board state carried between cycles.
#[derive(Debug, Clone)]
pub struct Dashboard {
    roster: Roster,
    ranking: RankingState,
    detector: CelebrationDetector,
    utc_offset: Option<FixedOffset>,
    cycle: u64,
}

impl Dashboard {
    /// A board for `roster`. `utc_offset` fixes where a day starts; `None`
    /// uses the system's local time zone.
    pub fn new(roster: Roster, windows: EventWindows, utc_offset: Option<FixedOffset>) -> Self {
        Self {
            roster,
            ranking: RankingState::new(),
            detector: CelebrationDetector::new(windows),
            utc_offset,
            cycle: 0,
        }
    }

    /// Start from previously known ranks.
    pub fn with_ranking(mut self, ranking: RankingState) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn ranking(&self) -> &RankingState {
        &self.ranking
    }

    /// Run one full cycle at the instant `now`.
    pub fn recompute(&mut self, snapshot: &Snapshot, targets: &Targets, now: DateTime<Utc>) -> ViewState {
        self.cycle += 1;
        let today = window::reference_day(now, self.utc_offset);

        let aggregation = aggregate(&snapshot.records, &self.roster, today);
        for fault in &aggregation.faults {
            warn!("{}", fault);
        }
        if aggregation.unrostered > 0 {
            debug!("{} records belong to no roster", aggregation.unrostered);
        }

        let kpis = compute_kpis(&aggregation.stats, targets);

        self.detector.observe(snapshot, now);
        self.detector.prune(now);

        let mut teams = BTreeMap::new();
        for team in TeamName::ALL {
            let ranked = rank(team, &self.roster, &aggregation.stats, &mut self.ranking);
            let leaders = TeamLeaders::from_ranking(&ranked, &aggregation.stats);

            let rows: Vec<TeamRow> = ranked
                .into_iter()
                .map(|r| {
                    let stats = aggregation.stats.get(&r.agent).cloned().unwrap_or_default();
                    let badges = badges::evaluate(&r.agent, &stats, team, &leaders);
                    TeamRow {
                        agent: r.agent,
                        rank: r.rank,
                        moved_up: r.moved_up,
                        stats,
                        badges,
                    }
                })
                .collect();
            teams.insert(team, rows);
        }

        debug!(
            "Cycle {}: {} records, {} today, {} this week",
            self.cycle,
            snapshot.total(),
            kpis.daily,
            kpis.weekly
        );

        ViewState {
            cycle: self.cycle,
            computed_at: now,
            kpis,
            teams,
            celebration: self.detector.active_celebration(now).cloned(),
            highlights: self.detector.active_highlights(now),
            record_warnings: aggregation.faulty_records(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BadgeKind, Connection, RawAmount, RecordChange, SaleRecord};
    use chrono::{Duration, NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        // Wednesday
        Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn sale(agent: &str, id: &str, upfront: f64, date: NaiveDate) -> SaleRecord {
        SaleRecord::new(agent, upfront, 0.0, date, now()).with_id(id)
    }

    fn dashboard() -> Dashboard {
        let roster = Roster::new(
            vec!["A".into(), "B".into()],
            vec!["C".into(), "D".into()],
        )
        .unwrap();
        Dashboard::new(roster, EventWindows::default(), FixedOffset::east_opt(0))
    }

    fn agents(view: &ViewState, team: TeamName) -> Vec<(&str, usize)> {
        view.team(team)
            .iter()
            .map(|row| (row.agent.as_str(), row.rank))
            .collect()
    }

    #[test]
    fn test_recompute_builds_both_teams() {
        let mut board = dashboard();
        let records = vec![
            sale("B", "1", 100.0, day(18)),
            sale("B", "2", 100.0, day(17)),
            sale("A", "3", 300.0, day(2)),
            sale("D", "4", 50.0, day(18)),
            sale("Nobody", "5", 999.0, day(18)),
        ];

        let view = board.recompute(&Snapshot::baseline(records), &Targets::default(), now());

        assert_eq!(view.cycle, 1);
        assert_eq!(agents(&view, TeamName::Core), vec![("B", 1), ("A", 2)]);
        assert_eq!(agents(&view, TeamName::Sweep), vec![("D", 1), ("C", 2)]);
        assert_eq!(view.kpis.daily, 2);
        assert_eq!(view.kpis.monthly, 4);
        let celebration = view.celebration.as_ref().unwrap();
        assert_eq!((celebration.previous_total, celebration.total), (0, 5));
        assert!(view.highlights.is_empty());
    }

    #[test]
    fn test_crown_sits_on_rank_one_row() {
        let mut board = dashboard();
        let records = vec![sale("B", "1", 10.0, day(18)), sale("A", "2", 500.0, day(18))];

        let view = board.recompute(&Snapshot::baseline(records), &Targets::default(), now());
        let core = view.team(TeamName::Core);

        // Equal monthly counts, name decides
        assert_eq!(core[0].agent, "A");
        let kinds: Vec<_> = core[0].badges.iter().map(|b| b.kind).collect();
        assert_eq!(kinds, vec![BadgeKind::Crown, BadgeKind::Revenue]);
        assert!(core[1].badges.is_empty());
    }

    #[test]
    fn test_new_sale_celebrates_and_highlights() {
        let mut board = dashboard();
        let first = sale("A", "1", 10.0, day(18));
        board.recompute(&Snapshot::baseline(vec![first.clone()]), &Targets::default(), now());

        let added = sale("D", "2", 10.0, day(18));
        let snapshot = Snapshot::new(vec![first, added.clone()], vec![RecordChange::added(added)]);
        let later = now() + Duration::seconds(1);
        let view = board.recompute(&snapshot, &Targets::default(), later);

        let celebration = view.celebration.as_ref().unwrap();
        assert_eq!((celebration.previous_total, celebration.total), (1, 2));
        assert_eq!(view.highlights.len(), 1);
        assert_eq!(view.highlights[0].agent, "D");
        assert!(view.team(TeamName::Sweep)[0].moved_up);
    }

    #[test]
    fn test_events_expire_on_later_cycles() {
        let mut board = dashboard();
        let a = sale("A", "1", 10.0, day(18));
        board.recompute(&Snapshot::baseline(vec![]), &Targets::default(), now());
        board.recompute(
            &Snapshot::new(vec![a.clone()], vec![RecordChange::added(a.clone())]),
            &Targets::default(),
            now(),
        );

        let view = board.recompute(
            &Snapshot::baseline(vec![a.clone()]),
            &Targets::default(),
            now() + Duration::seconds(4),
        );
        assert_eq!(view.celebration, None);
        assert_eq!(view.highlights.len(), 1);

        let view = board.recompute(
            &Snapshot::baseline(vec![a]),
            &Targets::default(),
            now() + Duration::seconds(5),
        );
        assert!(view.highlights.is_empty());
    }

    #[test]
    fn test_malformed_records_are_counted_not_fatal() {
        let mut board = dashboard();
        let mut bad = sale("A", "bad", 0.0, day(18));
        bad.upfront = RawAmount::Text("n/a".to_string());
        bad.monitoring = RawAmount::Text("??".to_string());

        let view = board.recompute(&Snapshot::baseline(vec![bad]), &Targets::default(), now());
        let a = &view.team(TeamName::Core)[0];

        assert_eq!(view.record_warnings, 1);
        assert_eq!(a.stats.record_count, 1);
        assert_eq!(a.stats.avg_upfront, 0.0);
        assert_eq!(view.kpis.avg_revenue, 0.0);
    }

    #[test]
    fn test_kpi_progress_uses_targets() {
        let mut board = dashboard();
        let records = vec![sale("A", "1", 100.0, day(18)), sale("C", "2", 100.0, day(18))];
        let targets = Targets {
            daily: 4.0,
            ..Default::default()
        };

        let view = board.recompute(&Snapshot::baseline(records), &targets, now());

        assert_eq!(view.kpis.progress.daily.percent, 50.0);
        assert_eq!(view.kpis.progress.daily.label(), "2.00 / 4");
    }

    #[test]
    fn test_watch_sink_keeps_latest_status() {
        let (tx, rx) = watch::channel(BoardStatus::default());
        let mut board = dashboard();
        let view = board.recompute(&Snapshot::baseline(vec![]), &Targets::default(), now());

        tx.publish(BoardUpdate::View(Box::new(view)));
        assert_eq!(rx.borrow().connection, Connection::Live);

        tx.publish(BoardUpdate::Disconnected {
            since: now(),
            reason: "gone".to_string(),
        });
        let status = rx.borrow();
        assert!(status.is_stale());
        // The last view is kept so readers can still show it
        assert_eq!(status.view.as_ref().map(|v| v.cycle), Some(1));
    }
}
