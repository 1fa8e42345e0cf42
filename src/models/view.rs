//! View state pushed to the presentation layer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AgentStats, Badge, EventId, Metric, RecordId, TeamName};

/// Progress bar colour band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressTier {
    /// Below 70%
    Behind,
    /// 70% up to (not including) 100%
    Approaching,
    /// 100%
    Met,
}

impl ProgressTier {
    /// Classify a percentage. The cut points are exact.
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 100.0 {
            ProgressTier::Met
        } else if percent >= 70.0 {
            ProgressTier::Approaching
        } else {
            ProgressTier::Behind
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ProgressTier::Behind => "#F36E21",
            ProgressTier::Approaching => "#FDB71A",
            ProgressTier::Met => "#2ecc71",
        }
    }
}

/// One progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub value: f64,
    pub target: f64,
    /// Always within `[0, 100]`
    pub percent: f64,
    pub tier: ProgressTier,
}

impl Progress {
    /// Text under the bar, e.g. `"3.00 / 5"`.
    pub fn label(&self) -> String {
        format!("{:.2} / {}", self.value, self.target)
    }
}

/// Progress for each metric with a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiProgress {
    pub daily: Progress,
    pub weekly: Progress,
    pub monthly: Progress,
    pub avg_revenue: Progress,
    pub avg_upfront: Progress,
}

impl KpiProgress {
    pub fn get(&self, metric: Metric) -> &Progress {
        match metric {
            Metric::Daily => &self.daily,
            Metric::Weekly => &self.weekly,
            Metric::Monthly => &self.monthly,
            Metric::AvgRevenue => &self.avg_revenue,
            Metric::AvgUpfront => &self.avg_upfront,
        }
    }
}

/// Board-wide totals across both teams.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiView {
    pub daily: u32,
    pub weekly: u32,
    pub monthly: u32,
    pub avg_revenue: f64,
    pub avg_upfront: f64,
    pub progress: KpiProgress,
}

/// Format a monetary amount the way the board shows it.
pub fn format_euros(amount: f64) -> String {
    format!("€{:.2}", amount)
}

/// A new-sale celebration banner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelebrationEvent {
    pub id: EventId,
    pub previous_total: usize,
    pub total: usize,
    pub fired_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Emphasis on an agent whose sale was just added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightEvent {
    pub id: EventId,
    pub agent: String,
    pub record: RecordId,
    pub fired_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRow {
    pub agent: String,
    pub rank: usize,
    pub moved_up: bool,
    pub stats: AgentStats,
    pub badges: Vec<Badge>,
}

/// Everything the display needs after one recomputation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Cycle counter, starting at 1
    pub cycle: u64,
    pub computed_at: DateTime<Utc>,
    pub kpis: KpiView,
    pub teams: BTreeMap<TeamName, Vec<TeamRow>>,
    pub celebration: Option<CelebrationEvent>,
    pub highlights: Vec<HighlightEvent>,
    /// Records in the snapshot with at least one malformed field
    pub record_warnings: usize,
}

impl ViewState {
    pub fn team(&self, team: TeamName) -> &[TeamRow] {
        self.teams.get(&team).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Drop transient events that have run out by `now`.
    ///
    /// A view can be read long after its cycle ran; readers call this so an
    /// old banner is not shown again.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) {
        if self.celebration.as_ref().is_some_and(|c| c.expires_at <= now) {
            self.celebration = None;
        }
        self.highlights.retain(|h| h.expires_at > now);
    }
}

/// What the board pushes to its sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoardUpdate {
    /// A completed cycle
    View(Box<ViewState>),
    /// The record feed is gone; no further views will follow
    Disconnected {
        since: DateTime<Utc>,
        reason: String,
    },
}

/// Feed connection as seen by the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connection {
    /// No view computed yet
    #[default]
    Waiting,
    Live,
    /// The last view is stale
    Disconnected,
}

/// Latest board state held for readers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BoardStatus {
    pub connection: Connection,
    pub updated_at: Option<DateTime<Utc>>,
    pub disconnect_reason: Option<String>,
    pub view: Option<ViewState>,
}

impl BoardStatus {
    pub fn apply(&mut self, update: BoardUpdate) {
        match update {
            BoardUpdate::View(view) => {
                self.connection = Connection::Live;
                self.updated_at = Some(view.computed_at);
                self.disconnect_reason = None;
                self.view = Some(*view);
            }
            BoardUpdate::Disconnected { since, reason } => {
                self.connection = Connection::Disconnected;
                self.updated_at = Some(since);
                self.disconnect_reason = Some(reason);
            }
        }
    }

    pub fn is_stale(&self) -> bool {
        self.connection == Connection::Disconnected
    }
}
