//! Round-robin scheduling of player groups.

pub mod manager;
pub mod models;
pub mod round_robin;

pub use manager::ScheduleManager;
pub use models::{Pairing, RoundRobinFormat, Schedule, ScheduleId, ScheduleSummary, WeekPlan};
pub use round_robin::generate_round_robin;
