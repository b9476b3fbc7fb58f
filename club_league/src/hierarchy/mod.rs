//! League hierarchy: leagues, seasons, format tiers, rating tiers and groups.

pub mod manager;
pub mod models;

pub use manager::HierarchyManager;
pub use models::{
    CompetitionSystem, FormatTier, FormatTierId, FormatType, GroupId, GroupPhase, League,
    LeagueId, NewFormatTier, NewLeague, NewRatingTier, NewSeason, PlayerGroup, RatingTier,
    RatingTierId, RatingTierUpdate, Season, SeasonId, SeasonStatus, SeasonUpdate, SportType,
    TierPhase,
};
