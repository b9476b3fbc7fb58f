//! Group standings.

pub mod calculator;
pub mod manager;

pub use calculator::{PointsPolicy, StandingRow, compute_standings};
pub use manager::StandingsManager;
