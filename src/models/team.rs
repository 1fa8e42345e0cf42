//! Teams and their fixed rosters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two sales teams on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TeamName {
    Core,
    Sweep,
}

impl TeamName {
    /// All teams in display order.
    pub const ALL: [TeamName; 2] = [TeamName::Core, TeamName::Sweep];

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamName::Core => "CORE",
            TeamName::Sweep => "SWEEP",
        }
    }
}

impl std::fmt::Display for TeamName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TeamName {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CORE" => Ok(TeamName::Core),
            "SWEEP" => Ok(TeamName::Sweep),
            _ => Err(RosterError::UnknownTeam(s.to_string())),
        }
    }
}

/// Roster errors.
#[derive(Debug, Error, PartialEq)]
pub enum RosterError {
    #[error("Team {0} has no members")]
    EmptyTeam(TeamName),

    #[error("Team {0} has a blank member name")]
    BlankName(TeamName),

    #[error("Agent {agent} is listed more than once ({first} and {second})")]
    DuplicateAgent {
        agent: String,
        first: TeamName,
        second: TeamName,
    },

    #[error("Unknown team: {0}")]
    UnknownTeam(String),
}

/// Static team membership. The two teams are disjoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Roster {
    core: Vec<String>,
    sweep: Vec<String>,
}

impl Roster {
    /// Build a roster, rejecting empty teams, blank names and agents listed twice.
    pub fn new(core: Vec<String>, sweep: Vec<String>) -> Result<Self, RosterError> {
        let roster = Self { core, sweep };
        let mut seen: Vec<(&str, TeamName)> = Vec::new();

        for team in TeamName::ALL {
            let members = roster.members(team);
            if members.is_empty() {
                return Err(RosterError::EmptyTeam(team));
            }
            for name in members {
                if name.trim().is_empty() {
                    return Err(RosterError::BlankName(team));
                }
                if let Some((_, first)) = seen.iter().find(|(n, _)| *n == name.as_str()) {
                    return Err(RosterError::DuplicateAgent {
                        agent: name.clone(),
                        first: *first,
                        second: team,
                    });
                }
                seen.push((name.as_str(), team));
            }
        }

        Ok(roster)
    }

    /// Members of one team, in configured order.
    pub fn members(&self, team: TeamName) -> &[String] {
        match team {
            TeamName::Core => &self.core,
            TeamName::Sweep => &self.sweep,
        }
    }

    /// The team an agent belongs to, if any.
    pub fn team_of(&self, agent: &str) -> Option<TeamName> {
        TeamName::ALL
            .into_iter()
            .find(|team| self.members(*team).iter().any(|m| m == agent))
    }

    pub fn contains(&self, agent: &str) -> bool {
        self.team_of(agent).is_some()
    }

    /// Every rostered agent, CORE first.
    pub fn all_members(&self) -> impl Iterator<Item = &str> {
        self.core.iter().chain(self.sweep.iter()).map(String::as_str)
    }
}

impl Default for Roster {
    fn default() -> Self {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            core: names(&["Craig", "Jamie", "Johnny", "Lar", "Shane"]),
            sweep: names(&["Bradley", "John", "Keith", "Ross"]),
        }
    }
}
