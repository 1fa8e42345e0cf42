//! Achievement badges.
//!
//! Badges are evaluated independently and concatenated in a fixed order:
//! daily tier, weekly tier, crown, revenue.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::ranking::RankedAgent;
use crate::models::{AgentStats, Badge, BadgeKind, TeamName};

/// Daily sales needed for the power badge.
pub const POWER_DAILY: u32 = 7;
/// Daily sales needed for the on-fire badge.
pub const ON_FIRE_DAILY: u32 = 5;
/// Daily sales needed for the hot badge.
pub const HOT_DAILY: u32 = 3;

/// Weekly thresholds differ per team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyThresholds {
    pub destroyer: u32,
    pub rocket: u32,
}

pub fn weekly_thresholds(team: TeamName) -> WeeklyThresholds {
    match team {
        TeamName::Core => WeeklyThresholds {
            destroyer: 20,
            rocket: 15,
        },
        TeamName::Sweep => WeeklyThresholds {
            destroyer: 8,
            rocket: 6,
        },
    }
}

/// Highest daily tier reached, if any.
pub fn daily_badge(daily_count: u32) -> Option<Badge> {
    if daily_count >= POWER_DAILY {
        Some(Badge::new(
            BadgeKind::Power,
            format!("POWER – {}+ sales", POWER_DAILY),
        ))
    } else if daily_count >= ON_FIRE_DAILY {
        Some(Badge::new(
            BadgeKind::OnFire,
            format!("ON FIRE – {}+ sales", ON_FIRE_DAILY),
        ))
    } else if daily_count >= HOT_DAILY {
        Some(Badge::new(
            BadgeKind::Hot,
            format!("HOT – {}+ sales", HOT_DAILY),
        ))
    } else {
        None
    }
}

/// Highest weekly tier reached for the team's thresholds, if any.
pub fn weekly_badge(team: TeamName, weekly_count: u32) -> Option<Badge> {
    let thresholds = weekly_thresholds(team);
    if weekly_count >= thresholds.destroyer {
        Some(Badge::new(
            BadgeKind::Destroyer,
            format!("DESTROYER – {}+ weekly", thresholds.destroyer),
        ))
    } else if weekly_count >= thresholds.rocket {
        Some(Badge::new(
            BadgeKind::Rocket,
            format!("ROCKET – {}+ weekly", thresholds.rocket),
        ))
    } else {
        None
    }
}

/// Team-relative winners for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamLeaders {
    /// Most sales this month
    pub crown: Option<String>,
    /// Highest average revenue per sale
    pub revenue: Option<String>,
}

impl TeamLeaders {
    /// Derive winners from a team's ranking so the crown always sits on the
    /// rank 1 row.
    pub fn from_ranking(ranked: &[RankedAgent], stats: &BTreeMap<String, AgentStats>) -> Self {
        let crown = ranked
            .iter()
            .find(|r| r.rank == 1)
            .map(|r| r.agent.clone());

        let revenue = ranked
            .iter()
            .map(|r| {
                let avg = stats.get(&r.agent).map_or(0.0, AgentStats::avg_revenue);
                (r.agent.as_str(), avg)
            })
            .min_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.0.cmp(b.0))
            })
            .map(|(agent, _)| agent.to_string());

        Self { crown, revenue }
    }
}

/// All badges for one agent this cycle.
pub fn evaluate(agent: &str, stats: &AgentStats, team: TeamName, leaders: &TeamLeaders) -> Vec<Badge> {
    let mut badges = Vec::new();

    if let Some(badge) = daily_badge(stats.daily_count) {
        badges.push(badge);
    }
    if let Some(badge) = weekly_badge(team, stats.weekly_count) {
        badges.push(badge);
    }
    if leaders.crown.as_deref() == Some(agent) {
        badges.push(Badge::new(
            BadgeKind::Crown,
            "TOP MONTHLY – most sales this month",
        ));
    }
    if leaders.revenue.as_deref() == Some(agent) {
        badges.push(Badge::new(
            BadgeKind::Revenue,
            "TOP REVENUE – highest average revenue",
        ));
    }

    badges
}
