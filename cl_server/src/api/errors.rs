//! Mapping of engine errors to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use club_league::LeagueError;
use serde::{Deserialize, Serialize};

use crate::{logging, metrics};

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

/// Error returned by API handlers
#[derive(Debug)]
pub enum ApiError {
    /// Refused by the league engine
    League(LeagueError),
    /// Rejected before reaching the engine
    BadRequest(String),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::League(err) => match err {
                LeagueError::NotFound { .. } | LeagueError::CodeNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                LeagueError::InvalidState(_)
                | LeagueError::RatingOutOfRange { .. }
                | LeagueError::InsufficientPlayers { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                LeagueError::CapacityExceeded { .. }
                | LeagueError::AlreadyEnrolled { .. }
                | LeagueError::ScheduleLocked(_)
                | LeagueError::AlreadyMaterialized { .. }
                | LeagueError::InvalidTransition { .. }
                | LeagueError::EnrollmentClosed(_) => StatusCode::CONFLICT,
                LeagueError::NotOwner { .. } => StatusCode::FORBIDDEN,
                LeagueError::JoinCodeSpaceExhausted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::League(err) => err.kind(),
        }
    }
}

impl From<LeagueError> for ApiError {
    fn from(err: LeagueError) -> Self {
        ApiError::League(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();

        let message = match &self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::League(err) => {
                logging::log_rejected_operation(kind, &err.to_string());
                err.client_message()
            }
        };
        metrics::rejected_operations_total(kind);

        let body = ErrorResponse {
            error: message,
            kind: kind.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
