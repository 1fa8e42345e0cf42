//! Statistics calculation engine.
//!
//! Pure functions over a record snapshot:
//! - Reporting windows (today, week, month, year)
//! - Per-agent aggregation
//! - Board-wide KPIs and target progress
//! - Team leaderboards and rank movement
//! - Achievement badges
//! - Transient celebration and highlight events

pub mod aggregate;
pub mod badges;
pub mod celebration;
pub mod kpi;
pub mod ranking;
pub mod window;

pub use aggregate::{aggregate, Aggregation};
pub use badges::TeamLeaders;
pub use celebration::{CelebrationDetector, EventWindows};
pub use kpi::compute_kpis;
pub use ranking::{rank, RankedAgent, RankingState};
