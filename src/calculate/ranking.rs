//! Team leaderboards ordered by monthly sales.
//!
//! Ties on monthly count are broken by agent name, ascending, so the order
//! never depends on roster order or sort stability. The same ordering picks
//! the crown holder, see [`super::badges::TeamLeaders`].

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::models::{AgentStats, Roster, TeamName};

/// Last rank assigned to each agent, per team.
///
/// Lives for the life of the process and is only used to flag upward moves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingState {
    teams: HashMap<TeamName, HashMap<String, usize>>,
}

impl RankingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a team's previous ranks.
    pub fn with_ranks<'a>(
        mut self,
        team: TeamName,
        ranks: impl IntoIterator<Item = (&'a str, usize)>,
    ) -> Self {
        let entry = self.teams.entry(team).or_default();
        for (agent, rank) in ranks {
            entry.insert(agent.to_string(), rank);
        }
        self
    }

    pub fn last_rank(&self, team: TeamName, agent: &str) -> Option<usize> {
        self.teams.get(&team).and_then(|ranks| ranks.get(agent)).copied()
    }

    /// Overwrite a team's ranks with a fresh ranking.
    fn replace(&mut self, team: TeamName, ranked: &[RankedAgent]) {
        let ranks = ranked
            .iter()
            .map(|r| (r.agent.clone(), r.rank))
            .collect();
        self.teams.insert(team, ranks);
    }
}

/// One ranked agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedAgent {
    pub agent: String,
    /// 1-based position
    pub rank: usize,
    /// Rank improved since the previous cycle
    pub moved_up: bool,
}

/// Leaderboard order: monthly count descending, then name ascending.
pub fn leaderboard_order(a: (&str, &AgentStats), b: (&str, &AgentStats)) -> Ordering {
    b.1.monthly_count
        .cmp(&a.1.monthly_count)
        .then_with(|| a.0.cmp(b.0))
}

/// Rank one team's members and record the new ranks in `state`.
///
/// Members missing from `stats` rank as if they had no sales. An agent seen
/// for the first time never counts as having moved up.
pub fn rank(
    team: TeamName,
    roster: &Roster,
    stats: &BTreeMap<String, AgentStats>,
    state: &mut RankingState,
) -> Vec<RankedAgent> {
    let empty = AgentStats::default();
    let mut members: Vec<(&str, &AgentStats)> = roster
        .members(team)
        .iter()
        .map(|agent| (agent.as_str(), stats.get(agent).unwrap_or(&empty)))
        .collect();
    members.sort_by(|a, b| leaderboard_order(*a, *b));

    let ranked: Vec<RankedAgent> = members
        .into_iter()
        .enumerate()
        .map(|(index, (agent, _))| {
            let rank = index + 1;
            let previous = state.last_rank(team, agent).unwrap_or(rank);
            RankedAgent {
                agent: agent.to_string(),
                rank,
                moved_up: rank < previous,
            }
        })
        .collect();

    state.replace(team, &ranked);
    ranked
}
