//! Enrollment API handlers.
//!
//! Join-code redemption, withdrawals and join-code rotation.
//!
//! Redeem a code:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/join \
//!   -H "Content-Type: application/json" \
//!   -d '{"code": "k7m2qp", "player": {"player_id": 12, "display_name": "Ana", "rating": 3.4}}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use club_league::enrollment::{Enrollment, EnrollmentId, EnrollmentOutcome, RedeemRequest};
use club_league::hierarchy::{RatingTier, RatingTierId};

use super::AppState;
use super::errors::ApiResult;
use crate::metrics;

/// Redeem a join code.
///
/// Codes are matched case-insensitively. Warnings (override admission,
/// dissolved groups) are returned with the enrollment.
///
/// # Errors
///
/// - `404 Not Found`: Unknown code
/// - `409 Conflict`: Tier full, player already enrolled, or enrollment closed
/// - `422 Unprocessable Entity`: Rating out of range without override
pub async fn redeem(
    State(state): State<AppState>,
    Json(payload): Json<RedeemRequest>,
) -> ApiResult<(StatusCode, Json<EnrollmentOutcome>)> {
    let outcome = state.engine.enrollment.redeem(payload).await?;
    metrics::enrollments_total(outcome.enrollment.admitted_by_override);
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Active enrollments of a tier, in enrollment order.
pub async fn list_enrollments(
    State(state): State<AppState>,
    Path(tier_id): Path<RatingTierId>,
) -> ApiResult<Json<Vec<Enrollment>>> {
    Ok(Json(state.engine.enrollment.list_enrollments(tier_id).await?))
}

pub async fn get_enrollment(
    State(state): State<AppState>,
    Path(enrollment_id): Path<EnrollmentId>,
) -> ApiResult<Json<Enrollment>> {
    Ok(Json(
        state.engine.enrollment.get_enrollment(enrollment_id).await?,
    ))
}

/// Withdraw an enrollment while its tier is still open.
pub async fn withdraw(
    State(state): State<AppState>,
    Path(enrollment_id): Path<EnrollmentId>,
) -> ApiResult<Json<Enrollment>> {
    let enrollment = state.engine.enrollment.withdraw(enrollment_id).await?;
    metrics::withdrawals_total();
    Ok(Json(enrollment))
}

/// Replace a tier's join code; the old code stops working immediately.
pub async fn rotate_join_code(
    State(state): State<AppState>,
    Path(tier_id): Path<RatingTierId>,
) -> ApiResult<Json<RatingTier>> {
    Ok(Json(state.engine.enrollment.rotate_join_code(tier_id).await?))
}
