//! Enrollment data models.

use crate::hierarchy::{RatingTier, RatingTierId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Player ID type (issued by the external account service)
pub type PlayerId = i64;

/// Enrollment ID type
pub type EnrollmentId = i64;

/// Join code bound to a single rating tier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoinCode(String);

impl JoinCode {
    /// Normalize user input: surrounding whitespace removed, upper-cased
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    pub(crate) fn from_generated(code: String) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JoinCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Player details supplied with a join request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub player_id: PlayerId,
    pub display_name: String,
    /// Skill rating (e.g. NTRP or DUPR)
    pub rating: f64,
}

/// Enrollment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Active,
    Withdrawn,
}

/// Enrollment of a player (and partner, for doubles) in a rating tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub rating_tier_id: RatingTierId,
    pub player: PlayerProfile,
    pub partner: Option<PlayerProfile>,
    pub status: EnrollmentStatus,
    /// Admitted despite a rating outside the tier range
    pub admitted_by_override: bool,
    /// Creation order within the store
    pub sequence: u64,
    pub enrolled_at: DateTime<Utc>,
}

impl Enrollment {
    /// Whether the enrollment currently counts towards capacity
    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }

    /// All players of this entry
    pub fn player_ids(&self) -> Vec<PlayerId> {
        let mut ids = vec![self.player.player_id];
        if let Some(partner) = &self.partner {
            ids.push(partner.player_id);
        }
        ids
    }

    /// Whether the player takes part in this entry
    pub fn involves(&self, player_id: PlayerId) -> bool {
        self.player.player_id == player_id
            || self
                .partner
                .as_ref()
                .is_some_and(|p| p.player_id == player_id)
    }

    /// Display name of the entry ("Alice" or "Alice / Bob")
    pub fn display_name(&self) -> String {
        match &self.partner {
            Some(partner) => format!("{} / {}", self.player.display_name, partner.display_name),
            None => self.player.display_name.clone(),
        }
    }
}

/// Join code redemption request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemRequest {
    pub code: String,
    pub player: PlayerProfile,
    /// Required for doubles tiers, rejected for singles tiers
    #[serde(default)]
    pub partner: Option<PlayerProfile>,
    /// Manager override: admit players outside the rating range with a warning
    #[serde(default)]
    pub allow_out_of_range: bool,
}

/// Non-fatal findings attached to a successful enrollment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnrollmentWarning {
    /// Admitted by override although the rating is outside the range
    RatingOutOfRange {
        player_id: PlayerId,
        rating: f64,
        min: f64,
        max: f64,
    },
    /// Existing (unscheduled) groups were dissolved by this change
    GroupsDissolved { count: usize },
}

/// Result of a successful redemption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentOutcome {
    pub enrollment: Enrollment,
    pub tier: RatingTier,
    pub warnings: Vec<EnrollmentWarning>,
}
