//! League engine error types.

use crate::hierarchy::{GroupId, LeagueId, RatingTierId};
use crate::enrollment::PlayerId;
use thiserror::Error;

/// Kind of stored entity, used to report missing records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    League,
    Season,
    FormatTier,
    RatingTier,
    Group,
    Enrollment,
    Schedule,
    Match,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::League => write!(f, "league"),
            EntityKind::Season => write!(f, "season"),
            EntityKind::FormatTier => write!(f, "format tier"),
            EntityKind::RatingTier => write!(f, "rating tier"),
            EntityKind::Group => write!(f, "group"),
            EntityKind::Enrollment => write!(f, "enrollment"),
            EntityKind::Schedule => write!(f, "schedule"),
            EntityKind::Match => write!(f, "match"),
        }
    }
}

/// League engine errors
#[derive(Debug, Error)]
pub enum LeagueError {
    /// Referenced entity (or parent) does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: i64 },

    /// Malformed input (names, dates, ranges, week numbers)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Rating tier has no free places left
    #[error("Rating tier {tier_id} is full (capacity {capacity})")]
    CapacityExceeded { tier_id: RatingTierId, capacity: usize },

    /// Player already holds an active enrollment in the tier
    #[error("Player {player_id} is already enrolled in rating tier {tier_id}")]
    AlreadyEnrolled {
        player_id: PlayerId,
        tier_id: RatingTierId,
    },

    /// Player rating is outside the tier's declared range
    #[error("Player {player_id} rating {rating} is outside [{min}, {max}]")]
    RatingOutOfRange {
        player_id: PlayerId,
        rating: f64,
        min: f64,
        max: f64,
    },

    /// No live rating tier uses this join code
    #[error("Join code not found: {0}")]
    CodeNotFound(String),

    /// Group already has published matches (or the tier has schedules)
    #[error("Schedule for group {0} is locked")]
    ScheduleLocked(GroupId),

    /// Week was already materialized (strict policy only)
    #[error("Week {week} of group {group_id} is already materialized")]
    AlreadyMaterialized { group_id: GroupId, week: u32 },

    /// State machine refused the transition
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Not enough players to partition or schedule
    #[error("Insufficient players: need {needed}, have {current}")]
    InsufficientPlayers { needed: usize, current: usize },

    /// Tier no longer accepts enrollment changes
    #[error("Enrollment is closed for rating tier {0}")]
    EnrollmentClosed(RatingTierId),

    /// Only the league owner may perform this action
    #[error("Player {requester} does not own league {league_id}")]
    NotOwner {
        league_id: LeagueId,
        requester: PlayerId,
    },

    /// Could not find an unused join code within the retry cap
    #[error("Join code space exhausted after {attempts} attempts")]
    JoinCodeSpaceExhausted { attempts: u32 },
}

impl LeagueError {
    /// Stable snake_case tag for this error, suitable for API responses
    pub fn kind(&self) -> &'static str {
        match self {
            LeagueError::NotFound { .. } => "not_found",
            LeagueError::InvalidState(_) => "invalid_state",
            LeagueError::CapacityExceeded { .. } => "capacity_exceeded",
            LeagueError::AlreadyEnrolled { .. } => "already_enrolled",
            LeagueError::RatingOutOfRange { .. } => "rating_out_of_range",
            LeagueError::CodeNotFound(_) => "code_not_found",
            LeagueError::ScheduleLocked(_) => "schedule_locked",
            LeagueError::AlreadyMaterialized { .. } => "already_materialized",
            LeagueError::InvalidTransition { .. } => "invalid_transition",
            LeagueError::InsufficientPlayers { .. } => "insufficient_players",
            LeagueError::EnrollmentClosed(_) => "enrollment_closed",
            LeagueError::NotOwner { .. } => "not_owner",
            LeagueError::JoinCodeSpaceExhausted { .. } => "join_code_space_exhausted",
        }
    }

    /// Get a client-safe error message
    ///
    /// Join codes are not echoed back and exhaustion of the code space is
    /// reported as an internal error.
    pub fn client_message(&self) -> String {
        match self {
            LeagueError::CodeNotFound(_) => "Join code not found".to_string(),
            LeagueError::JoinCodeSpaceExhausted { .. } => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    pub(crate) fn not_found(entity: EntityKind, id: i64) -> Self {
        LeagueError::NotFound { entity, id }
    }
}

/// Result type for league operations
pub type LeagueResult<T> = Result<T, LeagueError>;
