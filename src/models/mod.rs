//! Core data models for the sales board.

mod badge;
mod ids;
mod record;
mod snapshot;
mod stats;
mod targets;
mod team;
mod view;

pub use badge::*;
pub use ids::*;
pub use record::*;
pub use snapshot::*;
pub use stats::*;
pub use targets::*;
pub use team::*;
pub use view::*;
