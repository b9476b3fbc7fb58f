//! Match data models and state machine.

use crate::enrollment::{EnrollmentId, PlayerId};
use crate::errors::{LeagueError, LeagueResult};
use crate::hierarchy::{FormatType, GroupId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Match ID type
pub type MatchId = i64;

/// Match status
///
/// Scheduled → InProgress → Completed, Scheduled/InProgress → Cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl MatchStatus {
    /// Completed and cancelled matches never change again
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Cancelled)
    }

    /// Whether the state machine allows moving to `next`
    pub fn can_transition_to(self, next: MatchStatus) -> bool {
        use MatchStatus::*;
        matches!(
            (self, next),
            (Scheduled, InProgress)
                | (Scheduled, Completed)
                | (InProgress, Completed)
                | (Scheduled, Cancelled)
                | (InProgress, Cancelled)
        )
    }

    /// Check a transition, producing `InvalidTransition` when refused
    pub fn transition(self, next: MatchStatus) -> LeagueResult<MatchStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(LeagueError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Scheduled => write!(f, "scheduled"),
            MatchStatus::InProgress => write!(f, "in_progress"),
            MatchStatus::Completed => write!(f, "completed"),
            MatchStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Side of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSide {
    Home,
    Away,
}

/// Generic match result
///
/// Scores are sport-neutral counts (points, games or sets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner: MatchSide,
    #[serde(default)]
    pub home_score: Option<u32>,
    #[serde(default)]
    pub away_score: Option<u32>,
    #[serde(default)]
    pub walkover: bool,
}

impl MatchResult {
    /// Result without scores
    pub fn winner(side: MatchSide) -> Self {
        Self {
            winner: side,
            home_score: None,
            away_score: None,
            walkover: false,
        }
    }

    /// Result with a score line
    pub fn scored(home_score: u32, away_score: u32) -> LeagueResult<Self> {
        let winner = match home_score.cmp(&away_score) {
            std::cmp::Ordering::Greater => MatchSide::Home,
            std::cmp::Ordering::Less => MatchSide::Away,
            std::cmp::Ordering::Equal => {
                return Err(LeagueError::InvalidState(
                    "a match result cannot be a draw".to_string(),
                ));
            }
        };

        Ok(Self {
            winner,
            home_score: Some(home_score),
            away_score: Some(away_score),
            walkover: false,
        })
    }

    /// Validate score consistency
    pub fn validate(&self) -> LeagueResult<()> {
        match (self.home_score, self.away_score) {
            (Some(home), Some(away)) => {
                let winner_higher = match self.winner {
                    MatchSide::Home => home > away,
                    MatchSide::Away => away > home,
                };
                if !winner_higher {
                    return Err(LeagueError::InvalidState(format!(
                        "winner must have the higher score ({home}-{away})"
                    )));
                }
                Ok(())
            }
            (None, None) => Ok(()),
            _ => Err(LeagueError::InvalidState(
                "both scores must be given, or neither".to_string(),
            )),
        }
    }

    /// Score for and against the given side, when scores were recorded
    pub fn scores_for(&self, side: MatchSide) -> Option<(u32, u32)> {
        let (home, away) = (self.home_score?, self.away_score?);
        Some(match side {
            MatchSide::Home => (home, away),
            MatchSide::Away => (away, home),
        })
    }
}

/// Behaviour of a repeated week materialization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterializePolicy {
    /// Return the matches already created for the week
    #[default]
    Lenient,
    /// Fail with `AlreadyMaterialized`
    Strict,
}

/// Match record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub group_id: GroupId,
    pub week: u32,
    pub home: EnrollmentId,
    pub away: EnrollmentId,
    pub home_players: Vec<PlayerId>,
    pub away_players: Vec<PlayerId>,
    pub format: FormatType,
    pub status: MatchStatus,
    pub result: Option<MatchResult>,
    pub cancel_reason: Option<String>,
    pub scheduled_for: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    /// Entry on the given side
    pub fn entry(&self, side: MatchSide) -> EnrollmentId {
        match side {
            MatchSide::Home => self.home,
            MatchSide::Away => self.away,
        }
    }

    /// Winning entry of a completed match
    pub fn winner_entry(&self) -> Option<EnrollmentId> {
        if self.status != MatchStatus::Completed {
            return None;
        }
        self.result.map(|r| self.entry(r.winner))
    }

    /// Losing entry of a completed match
    pub fn loser_entry(&self) -> Option<EnrollmentId> {
        if self.status != MatchStatus::Completed {
            return None;
        }
        self.result.map(|r| match r.winner {
            MatchSide::Home => self.away,
            MatchSide::Away => self.home,
        })
    }
}
