//! Schedule data models.

use crate::enrollment::EnrollmentId;
use crate::hierarchy::GroupId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schedule ID type
pub type ScheduleId = i64;

/// Number of legs played between every pair of entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundRobinFormat {
    /// Every pair meets once
    #[default]
    Single,
    /// Every pair meets twice, home and away swapped in the second leg
    Double,
}

impl std::fmt::Display for RoundRobinFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundRobinFormat::Single => write!(f, "single"),
            RoundRobinFormat::Double => write!(f, "double"),
        }
    }
}

/// One pairing of a week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pairing {
    pub home: EnrollmentId,
    pub away: EnrollmentId,
}

impl Pairing {
    /// Same pairing with home and away swapped
    pub fn reversed(self) -> Self {
        Self {
            home: self.away,
            away: self.home,
        }
    }
}

/// Pairings of a single week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekPlan {
    /// 1-based week number
    pub week: u32,
    pub pairings: Vec<Pairing>,
    /// Entry sitting out this week (odd member counts only)
    pub bye: Option<EnrollmentId>,
}

/// Round-robin schedule of a player group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub group_id: GroupId,
    pub format: RoundRobinFormat,
    pub total_weeks: u32,
    pub matches_per_week: usize,
    pub weeks: Vec<WeekPlan>,
    pub generated_at: DateTime<Utc>,
}

impl Schedule {
    /// Plan for a 1-based week number
    pub fn week(&self, week: u32) -> Option<&WeekPlan> {
        self.weeks.iter().find(|plan| plan.week == week)
    }

    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary {
            schedule_id: self.id,
            group_id: self.group_id,
            format: self.format,
            total_weeks: self.total_weeks,
            matches_per_week: self.matches_per_week,
        }
    }
}

/// Compact description of a generated schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub schedule_id: ScheduleId,
    pub group_id: GroupId,
    pub format: RoundRobinFormat,
    pub total_weeks: u32,
    pub matches_per_week: usize,
}
