//! Match materialization and lifecycle.

pub mod manager;
pub mod models;

pub use manager::MatchManager;
pub use models::{Match, MatchId, MatchResult, MatchSide, MatchStatus, MaterializePolicy};
