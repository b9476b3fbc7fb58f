//! Group API handlers: partitioning, schedules, weekly matches and standings.
//!
//! Typical flow once enrollment has closed:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/tiers/4/partition \
//!   -H "Content-Type: application/json" -d '{"target_size": 6}'
//! curl -X POST http://localhost:6969/api/v1/groups/9/schedule
//! curl -X POST http://localhost:6969/api/v1/groups/9/weeks/1/matches
//! curl http://localhost:6969/api/v1/groups/9/standings
//! ```

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use club_league::grouping::{PartitionOrder, PartitionRequest};
use club_league::hierarchy::{GroupId, PlayerGroup, RatingTierId};
use club_league::matches::Match;
use club_league::schedule::{RoundRobinFormat, Schedule, ScheduleSummary};
use club_league::standings::StandingRow;
use serde::{Deserialize, Serialize};

use super::AppState;
use super::errors::ApiResult;
use super::request_id::RequestId;
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct PartitionPayload {
    pub target_size: usize,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub ordering: PartitionOrder,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    /// Overrides the configured round-robin format
    pub format: Option<RoundRobinFormat>,
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub week: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    pub group_id: GroupId,
    pub removed_matches: usize,
}

/// Partition a tier's active enrollments into balanced groups.
///
/// Replaces existing groups as long as none of them is scheduled.
///
/// # Errors
///
/// - `409 Conflict`: A group of the tier already has a schedule
/// - `422 Unprocessable Entity`: Target size 0 or no active enrollments
pub async fn partition_tier(
    State(state): State<AppState>,
    Path(tier_id): Path<RatingTierId>,
    Json(payload): Json<PartitionPayload>,
) -> ApiResult<(StatusCode, Json<Vec<PlayerGroup>>)> {
    let request = PartitionRequest {
        tier_id,
        target_size: payload.target_size,
        names: payload.names,
        ordering: payload.ordering,
    };
    let groups = state.engine.partitioner.partition_tier(request).await?;
    metrics::partitions_total(groups.len());
    Ok((StatusCode::CREATED, Json(groups)))
}

/// Generate (or regenerate, while no match exists) a group's schedule.
pub async fn generate_schedule(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
    Query(query): Query<ScheduleQuery>,
) -> ApiResult<(StatusCode, Json<ScheduleSummary>)> {
    let schedules = &state.engine.schedules;
    let summary = match query.format {
        Some(format) => schedules.generate_schedule_with(group_id, format).await?,
        None => schedules.generate_schedule(group_id).await?,
    };
    metrics::schedules_generated_total();
    Ok((StatusCode::CREATED, Json(summary)))
}

pub async fn get_schedule(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
) -> ApiResult<Json<Schedule>> {
    Ok(Json(state.engine.schedules.get_schedule(group_id).await?))
}

/// Remove a group's schedule together with all of its matches.
pub async fn reset_schedule(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(group_id): Path<GroupId>,
) -> ApiResult<Json<ResetResponse>> {
    let removed_matches = state.engine.schedules.reset_schedule(group_id).await?;
    tracing::warn!(
        request_id = %request_id.as_str(),
        group_id,
        removed_matches,
        "Schedule reset"
    );
    Ok(Json(ResetResponse {
        group_id,
        removed_matches,
    }))
}

/// Create the matches of one week.
///
/// Repeating the call returns the existing matches (or `409` under the
/// strict materialization policy).
pub async fn materialize_week(
    State(state): State<AppState>,
    Path((group_id, week)): Path<(GroupId, u32)>,
) -> ApiResult<Json<Vec<Match>>> {
    let matches = &state.engine.matches;
    let existing = matches.list_matches(group_id, Some(week)).await?.len();
    let created = matches.materialize_week(group_id, week).await?;
    metrics::matches_materialized_total(created.len().saturating_sub(existing));
    Ok(Json(created))
}

/// Matches of a group, optionally restricted to one week (`?week=3`).
pub async fn list_matches(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<Json<Vec<Match>>> {
    Ok(Json(
        state.engine.matches.list_matches(group_id, query.week).await?,
    ))
}

/// Ranked standings, recomputed on every request.
pub async fn get_standings(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
) -> ApiResult<Json<Vec<StandingRow>>> {
    Ok(Json(state.engine.standings.get_standings(group_id).await?))
}
