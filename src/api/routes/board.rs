use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{
    format_euros, Badge, BoardStatus, Connection, KpiView, Metric, TeamName, ViewState,
};

/// Full board status, including the last view when disconnected.
pub async fn get_board(State(state): State<AppState>) -> Json<BoardStatus> {
    Json(state.current())
}

fn require_view(status: BoardStatus) -> Result<(Connection, ViewState), ApiError> {
    match status.view {
        Some(view) => Ok((status.connection, view)),
        None => Err(ApiError::ServiceUnavailable(
            "Board has not computed a view yet".to_string(),
        )),
    }
}

#[derive(Debug, Serialize)]
pub struct ProgressBar {
    pub metric: Metric,
    pub label: String,
    pub percent: f64,
    pub color: &'static str,
}

#[derive(Debug, Serialize)]
pub struct KpisResponse {
    pub connection: Connection,
    pub kpis: KpiView,
    pub avg_revenue_display: String,
    pub avg_upfront_display: String,
    pub bars: Vec<ProgressBar>,
}

pub async fn get_kpis(State(state): State<AppState>) -> Result<Json<KpisResponse>, ApiError> {
    let (connection, view) = require_view(state.current())?;
    let kpis = view.kpis;

    let bars = Metric::ALL
        .iter()
        .map(|metric| {
            let progress = kpis.progress.get(*metric);
            ProgressBar {
                metric: *metric,
                label: progress.label(),
                percent: progress.percent,
                color: progress.tier.color(),
            }
        })
        .collect();

    Ok(Json(KpisResponse {
        connection,
        kpis,
        avg_revenue_display: format_euros(kpis.avg_revenue),
        avg_upfront_display: format_euros(kpis.avg_upfront),
        bars,
    }))
}

#[derive(Debug, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub agent: String,
    pub moved_up: bool,
    pub highlighted: bool,
    pub daily: u32,
    pub weekly: u32,
    pub monthly: u32,
    pub yearly: u32,
    pub avg_upfront: String,
    pub avg_monitoring: String,
    pub badges: Vec<Badge>,
}

#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub team: TeamName,
    pub connection: Connection,
    pub rows: Vec<LeaderboardRow>,
}

pub async fn get_team(
    State(state): State<AppState>,
    Path(team): Path<String>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team: TeamName = team
        .parse()
        .map_err(|_| ApiError::NotFound(format!("Team {}", team)))?;
    let (connection, view) = require_view(state.current())?;

    let rows = view
        .team(team)
        .iter()
        .map(|row| LeaderboardRow {
            rank: row.rank,
            agent: row.agent.clone(),
            moved_up: row.moved_up,
            highlighted: view.highlights.iter().any(|h| h.agent == row.agent),
            daily: row.stats.daily_count,
            weekly: row.stats.weekly_count,
            monthly: row.stats.monthly_count,
            yearly: row.stats.yearly_count,
            avg_upfront: format_euros(row.stats.avg_upfront),
            avg_monitoring: format_euros(row.stats.avg_monitoring),
            badges: row.badges.clone(),
        })
        .collect();

    Ok(Json(TeamResponse {
        team,
        connection,
        rows,
    }))
}
