//! # Sales Board
//!
//! A real-time sales leaderboard. Sale records stream in from a store; each
//! change recomputes per-agent statistics, team rankings, badges and
//! board-wide KPIs against targets.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (sales, rosters, targets, view state)
//! - **calculate**: Time windows, aggregation, KPIs, ranking, badges, events
//! - **board**: One recomputation cycle and the async runner that drives it
//! - **storage**: Record feed and target store (in-memory, JSONL files)
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod board;
pub mod calculate;
pub mod config;
pub mod models;
pub mod storage;

pub use models::*;
