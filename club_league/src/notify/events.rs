//! Events published to players.

use crate::enrollment::{EnrollmentId, PlayerId};
use crate::hierarchy::{GroupId, RatingTierId};
use crate::matches::MatchId;
use crate::schedule::ScheduleId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Player-facing league events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LeagueEvent {
    /// A player was placed into a group
    JoinedGroup {
        player_id: PlayerId,
        rating_tier_id: RatingTierId,
        group_id: GroupId,
        group_name: String,
    },

    /// A group's round-robin schedule was generated
    ScheduleGenerated {
        group_id: GroupId,
        schedule_id: ScheduleId,
        total_weeks: u32,
        player_ids: Vec<PlayerId>,
    },

    /// A match was materialized
    MatchCreated {
        match_id: MatchId,
        group_id: GroupId,
        week: u32,
        scheduled_for: NaiveDate,
        player_ids: Vec<PlayerId>,
    },

    /// A match result was recorded
    ResultRecorded {
        match_id: MatchId,
        group_id: GroupId,
        winner: EnrollmentId,
        player_ids: Vec<PlayerId>,
    },
}

impl LeagueEvent {
    /// Players the event is addressed to
    pub fn recipients(&self) -> Vec<PlayerId> {
        match self {
            LeagueEvent::JoinedGroup { player_id, .. } => vec![*player_id],
            LeagueEvent::ScheduleGenerated { player_ids, .. }
            | LeagueEvent::MatchCreated { player_ids, .. }
            | LeagueEvent::ResultRecorded { player_ids, .. } => player_ids.clone(),
        }
    }

    /// Group the event concerns
    pub fn group_id(&self) -> GroupId {
        match self {
            LeagueEvent::JoinedGroup { group_id, .. }
            | LeagueEvent::ScheduleGenerated { group_id, .. }
            | LeagueEvent::MatchCreated { group_id, .. }
            | LeagueEvent::ResultRecorded { group_id, .. } => *group_id,
        }
    }
}

impl std::fmt::Display for LeagueEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeagueEvent::JoinedGroup {
                player_id,
                group_name,
                ..
            } => write!(f, "player {player_id} joined {group_name}"),
            LeagueEvent::ScheduleGenerated {
                group_id,
                total_weeks,
                ..
            } => write!(f, "schedule of {total_weeks} weeks generated for group {group_id}"),
            LeagueEvent::MatchCreated {
                match_id,
                week,
                scheduled_for,
                ..
            } => write!(f, "match {match_id} created for week {week} ({scheduled_for})"),
            LeagueEvent::ResultRecorded {
                match_id, winner, ..
            } => write!(f, "result recorded for match {match_id}, winner entry {winner}"),
        }
    }
}
