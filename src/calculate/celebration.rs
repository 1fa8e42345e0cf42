//! Transient board events: new-sale celebrations and row highlights.
//!
//! Every event carries its own expiry. Pruning removes only events whose own
//! window has passed, so a later event never cuts an earlier one short.

use chrono::{DateTime, Duration, Utc};

use crate::models::{
    CelebrationEvent, ChangeKind, EventId, HighlightEvent, RecordChange, Snapshot,
};

/// How long each kind of event stays visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindows {
    pub celebration: Duration,
    pub highlight: Duration,
}

impl Default for EventWindows {
    fn default() -> Self {
        Self {
            celebration: Duration::seconds(3),
            highlight: Duration::seconds(5),
        }
    }
}

/// Detects celebrations and highlights across cycles.
#[derive(Debug, Clone, Default)]
pub struct CelebrationDetector {
    windows: EventWindows,
    last_total: usize,
    celebrations: Vec<CelebrationEvent>,
    highlights: Vec<HighlightEvent>,
}

impl CelebrationDetector {
    pub fn new(windows: EventWindows) -> Self {
        Self {
            windows,
            ..Default::default()
        }
    }

    /// Compare a snapshot's record total with the previous one.
    ///
    /// Fires only when the total strictly grows. The running total starts at
    /// zero, so a first snapshot holding records celebrates.
    pub fn observe_total(&mut self, total: usize, now: DateTime<Utc>) -> Option<CelebrationEvent> {
        let previous = std::mem::replace(&mut self.last_total, total);
        if total <= previous {
            return None;
        }

        let event = CelebrationEvent {
            id: EventId::new(),
            previous_total: previous,
            total,
            fired_at: now,
            expires_at: now + self.windows.celebration,
        };
        self.celebrations.push(event.clone());
        Some(event)
    }

    /// Highlight the agent of a newly added record.
    pub fn observe_change(&mut self, change: &RecordChange, now: DateTime<Utc>) -> Option<HighlightEvent> {
        if change.kind != ChangeKind::Added {
            return None;
        }

        let event = HighlightEvent {
            id: EventId::new(),
            agent: change.record.agent.clone(),
            record: change.record.id.clone(),
            fired_at: now,
            expires_at: now + self.windows.highlight,
        };
        self.highlights.push(event.clone());
        Some(event)
    }

    /// Feed one snapshot through both detectors.
    pub fn observe(&mut self, snapshot: &Snapshot, now: DateTime<Utc>) {
        for change in &snapshot.changes {
            self.observe_change(change, now);
        }
        self.observe_total(snapshot.total(), now);
    }

    /// Drop events whose own window has passed.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        self.celebrations.retain(|e| e.expires_at > now);
        self.highlights.retain(|e| e.expires_at > now);
    }

    /// Most recent celebration still showing.
    pub fn active_celebration(&self, now: DateTime<Utc>) -> Option<&CelebrationEvent> {
        self.celebrations
            .iter()
            .filter(|e| e.expires_at > now)
            .max_by_key(|e| e.fired_at)
    }

    /// Highlights still showing, oldest first.
    pub fn active_highlights(&self, now: DateTime<Utc>) -> Vec<HighlightEvent> {
        self.highlights
            .iter()
            .filter(|e| e.expires_at > now)
            .cloned()
            .collect()
    }
}
