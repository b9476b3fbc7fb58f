//! League hierarchy data models.

use crate::enrollment::{EnrollmentId, JoinCode, PlayerId};
use crate::errors::{LeagueError, LeagueResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// League ID type
pub type LeagueId = i64;

/// Season ID type
pub type SeasonId = i64;

/// Format tier ID type
pub type FormatTierId = i64;

/// Rating tier ID type
pub type RatingTierId = i64;

/// Player group ID type
pub type GroupId = i64;

/// Sport played in a league
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SportType {
    Tennis,
    Pickleball,
    Padel,
    Badminton,
    TableTennis,
    Squash,
}

/// Season lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonStatus {
    Upcoming,
    Active,
    Completed,
}

impl std::fmt::Display for SeasonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeasonStatus::Upcoming => write!(f, "upcoming"),
            SeasonStatus::Active => write!(f, "active"),
            SeasonStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Competitive format of a format tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatType {
    Singles,
    Doubles,
}

/// How a rating tier decides its winner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionSystem {
    LeagueFormat,
    Knockout,
}

/// Generate-once guard for a rating tier
///
/// Open → Partitioned → Scheduled → Active
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierPhase {
    /// Accepting enrollments, no groups
    Open,
    /// Groups exist, no schedule yet
    Partitioned,
    /// At least one group has a schedule
    Scheduled,
    /// At least one week has been materialized
    Active,
}

impl TierPhase {
    /// Whether enrollments may still be added or withdrawn
    pub fn accepts_enrollment(self) -> bool {
        matches!(self, TierPhase::Open | TierPhase::Partitioned)
    }
}

/// Generate-once guard for a player group
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupPhase {
    Unscheduled,
    Scheduled,
    Active,
}

/// League record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub id: LeagueId,
    pub name: String,
    pub sport: SportType,
    pub owner: PlayerId,
    pub created_at: DateTime<Utc>,
}

/// Season record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub id: SeasonId,
    pub league_id: LeagueId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Explicitly recorded status; `None` means derived from dates
    pub status_override: Option<SeasonStatus>,
}

impl Season {
    /// Status on the given day
    ///
    /// An explicit transition wins over the date-derived status.
    pub fn status_on(&self, today: NaiveDate) -> SeasonStatus {
        if let Some(status) = self.status_override {
            return status;
        }

        if today < self.start_date {
            SeasonStatus::Upcoming
        } else if today > self.end_date {
            SeasonStatus::Completed
        } else {
            SeasonStatus::Active
        }
    }
}

/// Format tier record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatTier {
    pub id: FormatTierId,
    pub season_id: SeasonId,
    pub name: String,
    pub format: FormatType,
}

/// Rating tier record (the unit of enrollment)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingTier {
    pub id: RatingTierId,
    pub format_tier_id: FormatTierId,
    pub name: String,
    pub min_rating: f64,
    pub max_rating: f64,
    pub capacity: usize,
    pub competition: CompetitionSystem,
    pub playoff_spots: Option<usize>,
    pub join_code: JoinCode,
    pub phase: TierPhase,
    /// Seed of the last shuffled partition, if one was used
    pub partition_seed: Option<u64>,
}

impl RatingTier {
    /// Whether a rating falls within the tier's inclusive range
    pub fn rating_in_range(&self, rating: f64) -> bool {
        rating >= self.min_rating && rating <= self.max_rating
    }
}

/// Player group record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerGroup {
    pub id: GroupId,
    pub rating_tier_id: RatingTierId,
    pub name: String,
    /// Member entries in assignment order
    pub members: Vec<EnrollmentId>,
    pub phase: GroupPhase,
}

/// Request to create a league
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLeague {
    pub name: String,
    pub sport: SportType,
    pub owner: PlayerId,
}

/// Request to create a season
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSeason {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl NewSeason {
    pub(crate) fn validate(&self) -> LeagueResult<()> {
        validate_name("season", &self.name)?;
        validate_dates(self.start_date, self.end_date)
    }
}

/// Partial update of a season
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonUpdate {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Request to create a format tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFormatTier {
    pub name: String,
    pub format: FormatType,
}

/// Request to create a rating tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRatingTier {
    pub name: String,
    pub min_rating: f64,
    pub max_rating: f64,
    pub capacity: usize,
    pub competition: CompetitionSystem,
    pub playoff_spots: Option<usize>,
}

impl NewRatingTier {
    pub(crate) fn validate(&self) -> LeagueResult<()> {
        validate_name("rating tier", &self.name)?;
        validate_tier_rules(
            self.min_rating,
            self.max_rating,
            self.capacity,
            self.competition,
            self.playoff_spots,
        )
    }
}

/// Partial update of a rating tier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingTierUpdate {
    pub name: Option<String>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub capacity: Option<usize>,
    /// `Some(None)` clears the playoff spots
    pub playoff_spots: Option<Option<usize>>,
}

pub(crate) fn validate_name(what: &str, name: &str) -> LeagueResult<()> {
    if name.trim().is_empty() {
        return Err(LeagueError::InvalidState(format!("{what} name is empty")));
    }
    if name.chars().count() > 120 {
        return Err(LeagueError::InvalidState(format!(
            "{what} name is longer than 120 characters"
        )));
    }
    Ok(())
}

pub(crate) fn validate_dates(start: NaiveDate, end: NaiveDate) -> LeagueResult<()> {
    if end <= start {
        return Err(LeagueError::InvalidState(format!(
            "season end {end} must be after start {start}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_tier_rules(
    min_rating: f64,
    max_rating: f64,
    capacity: usize,
    competition: CompetitionSystem,
    playoff_spots: Option<usize>,
) -> LeagueResult<()> {
    if !min_rating.is_finite() || !max_rating.is_finite() {
        return Err(LeagueError::InvalidState(
            "rating bounds must be finite numbers".to_string(),
        ));
    }

    if min_rating > max_rating {
        return Err(LeagueError::InvalidState(format!(
            "min rating {min_rating} is above max rating {max_rating}"
        )));
    }

    if capacity == 0 {
        return Err(LeagueError::InvalidState(
            "capacity must be greater than 0".to_string(),
        ));
    }

    if let Some(spots) = playoff_spots {
        if competition != CompetitionSystem::LeagueFormat {
            return Err(LeagueError::InvalidState(
                "playoff spots are only allowed for league format tiers".to_string(),
            ));
        }
        if spots == 0 || spots > capacity {
            return Err(LeagueError::InvalidState(format!(
                "playoff spots must be in 1..={capacity}, got {spots}"
            )));
        }
    }

    Ok(())
}
