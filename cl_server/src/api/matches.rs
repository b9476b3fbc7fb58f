//! Match lifecycle API handlers.
//!
//! Record a result:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/matches/31/result \
//!   -H "Content-Type: application/json" \
//!   -d '{"winner": "home", "home_score": 6, "away_score": 3}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
};
use club_league::matches::{Match, MatchId, MatchResult};
use serde::Deserialize;

use super::AppState;
use super::errors::ApiResult;
use crate::metrics;

#[derive(Debug, Default, Deserialize)]
pub struct CancelPayload {
    #[serde(default)]
    pub reason: String,
}

pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> ApiResult<Json<Match>> {
    Ok(Json(state.engine.matches.get_match(match_id).await?))
}

/// Scheduled → InProgress
pub async fn start_match(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> ApiResult<Json<Match>> {
    Ok(Json(state.engine.matches.start_match(match_id).await?))
}

/// Record the result and complete the match.
///
/// # Errors
///
/// - `409 Conflict`: Match already completed or cancelled
/// - `422 Unprocessable Entity`: Scores inconsistent with the winner
pub async fn record_result(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
    Json(result): Json<MatchResult>,
) -> ApiResult<Json<Match>> {
    let recorded = state.engine.matches.record_result(match_id, result).await?;
    metrics::results_recorded_total();
    Ok(Json(recorded))
}

/// Cancel a match; the JSON body with a `reason` is optional.
pub async fn cancel_match(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
    payload: Option<Json<CancelPayload>>,
) -> ApiResult<Json<Match>> {
    let Json(payload) = payload.unwrap_or_default();
    Ok(Json(
        state
            .engine
            .matches
            .cancel_match(match_id, &payload.reason)
            .await?,
    ))
}
