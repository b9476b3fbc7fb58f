//! Caller identification for owner-only endpoints.
//!
//! Authentication is handled upstream; the gateway forwards the caller's
//! player id in the `x-player-id` header.
//!
//! ```rust,no_run
//! use cl_server::api::middleware::Requester;
//!
//! async fn owner_only(Requester(player_id): Requester) -> String {
//!     format!("Requested by player {}", player_id)
//! }
//! # let _ = owner_only;
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};
use club_league::enrollment::PlayerId;

use super::errors::ApiError;

/// Header carrying the caller's player id
pub const PLAYER_ID_HEADER: &str = "x-player-id";

/// Player id of the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester(pub PlayerId);

impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(PLAYER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::BadRequest(format!("Missing {PLAYER_ID_HEADER} header")))?;

        raw.trim()
            .parse()
            .map(Requester)
            .map_err(|_| ApiError::BadRequest(format!("Invalid {PLAYER_ID_HEADER} header")))
    }
}
