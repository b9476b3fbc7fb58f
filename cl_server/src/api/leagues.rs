//! League hierarchy API handlers.
//!
//! Leagues, seasons, format tiers, rating tiers and manually created groups.
//!
//! # Examples
//!
//! Create a league:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/leagues \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Riverside Tennis", "sport": "tennis", "owner": 7}'
//! ```
//!
//! Create a rating tier under format tier 3:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/formats/3/tiers \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "3.0-3.5", "min_rating": 3.0, "max_rating": 3.5, "capacity": 8,
//!        "competition": "league_format", "playoff_spots": 2}'
//! ```

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use club_league::hierarchy::{
    FormatTier, FormatTierId, GroupId, League, LeagueId, NewFormatTier, NewLeague, NewRatingTier,
    NewSeason, PlayerGroup, RatingTier, RatingTierId, RatingTierUpdate, Season, SeasonId,
    SeasonStatus,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::errors::ApiResult;
use super::middleware::Requester;
use super::request_id::RequestId;

/// Season with its effective status
#[derive(Debug, Serialize)]
pub struct SeasonView {
    #[serde(flatten)]
    pub season: Season,
    pub status: SeasonStatus,
}

impl From<Season> for SeasonView {
    fn from(season: Season) -> Self {
        let status = season.status_on(Utc::now().date_naive());
        Self { season, status }
    }
}

#[derive(Debug, Deserialize)]
pub struct TransitionPayload {
    pub status: SeasonStatus,
}

#[derive(Debug, Deserialize)]
pub struct NamePayload {
    pub name: String,
}

/// Create a league.
///
/// Returns `201 Created` with the league.
pub async fn create_league(
    State(state): State<AppState>,
    Json(payload): Json<NewLeague>,
) -> ApiResult<(StatusCode, Json<League>)> {
    let league = state.engine.hierarchy.create_league(payload).await?;
    Ok((StatusCode::CREATED, Json(league)))
}

pub async fn list_leagues(State(state): State<AppState>) -> Json<Vec<League>> {
    Json(state.engine.hierarchy.list_leagues().await)
}

pub async fn get_league(
    State(state): State<AppState>,
    Path(league_id): Path<LeagueId>,
) -> ApiResult<Json<League>> {
    Ok(Json(state.engine.hierarchy.get_league(league_id).await?))
}

/// Delete a league and everything below it.
///
/// Only the owner may delete; the caller is identified by `x-player-id`.
///
/// # Errors
///
/// - `400 Bad Request`: Missing or malformed `x-player-id`
/// - `403 Forbidden`: Caller is not the owner
/// - `404 Not Found`: Unknown league
pub async fn delete_league(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Requester(requester): Requester,
    Path(league_id): Path<LeagueId>,
) -> ApiResult<StatusCode> {
    state
        .engine
        .hierarchy
        .delete_league(league_id, requester)
        .await?;
    tracing::info!(
        request_id = %request_id.as_str(),
        league_id,
        requester,
        "League deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_season(
    State(state): State<AppState>,
    Path(league_id): Path<LeagueId>,
    Json(payload): Json<NewSeason>,
) -> ApiResult<(StatusCode, Json<SeasonView>)> {
    let season = state
        .engine
        .hierarchy
        .create_season(league_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(season.into())))
}

pub async fn list_seasons(
    State(state): State<AppState>,
    Path(league_id): Path<LeagueId>,
) -> ApiResult<Json<Vec<SeasonView>>> {
    let seasons = state.engine.hierarchy.list_seasons(league_id).await?;
    Ok(Json(seasons.into_iter().map(SeasonView::from).collect()))
}

pub async fn get_season(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
) -> ApiResult<Json<SeasonView>> {
    Ok(Json(state.engine.hierarchy.get_season(season_id).await?.into()))
}

/// Move a season forward (upcoming → active → completed).
pub async fn transition_season(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Json(payload): Json<TransitionPayload>,
) -> ApiResult<Json<SeasonView>> {
    let season = state
        .engine
        .hierarchy
        .transition_season(season_id, payload.status)
        .await?;
    Ok(Json(season.into()))
}

pub async fn create_format_tier(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Json(payload): Json<NewFormatTier>,
) -> ApiResult<(StatusCode, Json<FormatTier>)> {
    let tier = state
        .engine
        .hierarchy
        .create_format_tier(season_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(tier)))
}

pub async fn list_format_tiers(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
) -> ApiResult<Json<Vec<FormatTier>>> {
    Ok(Json(state.engine.hierarchy.list_format_tiers(season_id).await?))
}

/// Create a rating tier; the response carries its join code.
pub async fn create_rating_tier(
    State(state): State<AppState>,
    Path(format_tier_id): Path<FormatTierId>,
    Json(payload): Json<NewRatingTier>,
) -> ApiResult<(StatusCode, Json<RatingTier>)> {
    let tier = state
        .engine
        .hierarchy
        .create_rating_tier(format_tier_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(tier)))
}

pub async fn list_rating_tiers(
    State(state): State<AppState>,
    Path(format_tier_id): Path<FormatTierId>,
) -> ApiResult<Json<Vec<RatingTier>>> {
    Ok(Json(
        state.engine.hierarchy.list_rating_tiers(format_tier_id).await?,
    ))
}

pub async fn get_rating_tier(
    State(state): State<AppState>,
    Path(tier_id): Path<RatingTierId>,
) -> ApiResult<Json<RatingTier>> {
    Ok(Json(state.engine.hierarchy.get_rating_tier(tier_id).await?))
}

pub async fn update_rating_tier(
    State(state): State<AppState>,
    Path(tier_id): Path<RatingTierId>,
    Json(payload): Json<RatingTierUpdate>,
) -> ApiResult<Json<RatingTier>> {
    Ok(Json(
        state
            .engine
            .hierarchy
            .update_rating_tier(tier_id, payload)
            .await?,
    ))
}

/// Create an empty, manually named group.
pub async fn create_group(
    State(state): State<AppState>,
    Path(tier_id): Path<RatingTierId>,
    Json(payload): Json<NamePayload>,
) -> ApiResult<(StatusCode, Json<PlayerGroup>)> {
    let group = state
        .engine
        .hierarchy
        .create_group(tier_id, &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn list_groups(
    State(state): State<AppState>,
    Path(tier_id): Path<RatingTierId>,
) -> ApiResult<Json<Vec<PlayerGroup>>> {
    Ok(Json(state.engine.hierarchy.list_groups(tier_id).await?))
}

pub async fn get_group(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
) -> ApiResult<Json<PlayerGroup>> {
    Ok(Json(state.engine.hierarchy.get_group(group_id).await?))
}
