//! HTTP API for the club league server.
//!
//! # Modules
//!
//! - [`leagues`]: Leagues, seasons, format tiers, rating tiers and groups
//! - [`enrollment`]: Join-code redemption and withdrawals
//! - [`groups`]: Partitioning, schedules, weekly matches and standings
//! - [`matches`]: Match state changes and results
//! - [`errors`]: Engine error to HTTP status mapping
//! - [`middleware`]: Caller identification for owner-only endpoints
//! - [`request_id`]: Request correlation, access logs and HTTP metrics
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use cl_server::api::{AppState, create_router};
//! use club_league::{EngineConfig, LeagueEngine, notify::LogNotifier};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = LeagueEngine::new(&EngineConfig::default(), Arc::new(LogNotifier))?;
//! let app = create_router(AppState { engine });
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:6969").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod enrollment;
pub mod errors;
pub mod groups;
pub mod leagues;
pub mod matches;
pub mod middleware;
pub mod request_id;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use club_league::LeagueEngine;
use serde_json::json;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloning is cheap: the engine's managers share one store behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub engine: LeagueEngine,
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Endpoint Summary
///
/// ```text
/// GET    /health                                 - Health check
/// POST   /api/v1/leagues                         - Create league
/// GET    /api/v1/leagues                         - List leagues
/// GET    /api/v1/leagues/{id}                    - Get league
/// DELETE /api/v1/leagues/{id}                    - Delete league (owner, x-player-id)
/// POST   /api/v1/leagues/{id}/seasons            - Create season
/// GET    /api/v1/leagues/{id}/seasons            - List seasons
/// GET    /api/v1/seasons/{id}                    - Get season
/// POST   /api/v1/seasons/{id}/transition         - Move season forward
/// POST   /api/v1/seasons/{id}/formats            - Create format tier
/// GET    /api/v1/seasons/{id}/formats            - List format tiers
/// POST   /api/v1/formats/{id}/tiers              - Create rating tier
/// GET    /api/v1/formats/{id}/tiers              - List rating tiers
/// GET    /api/v1/tiers/{id}                      - Get rating tier
/// PATCH  /api/v1/tiers/{id}                      - Update rating tier
/// POST   /api/v1/tiers/{id}/join-code            - Rotate join code
/// GET    /api/v1/tiers/{id}/enrollments          - List active enrollments
/// POST   /api/v1/tiers/{id}/groups               - Create empty group
/// GET    /api/v1/tiers/{id}/groups               - List groups
/// POST   /api/v1/tiers/{id}/partition            - Partition tier
/// POST   /api/v1/join                            - Redeem join code
/// GET    /api/v1/enrollments/{id}                - Get enrollment
/// DELETE /api/v1/enrollments/{id}                - Withdraw
/// GET    /api/v1/groups/{id}                     - Get group
/// POST   /api/v1/groups/{id}/schedule            - Generate schedule (?format=double)
/// GET    /api/v1/groups/{id}/schedule            - Get schedule
/// DELETE /api/v1/groups/{id}/schedule            - Reset schedule and matches
/// POST   /api/v1/groups/{id}/weeks/{week}/matches - Materialize week
/// GET    /api/v1/groups/{id}/matches             - List matches (?week=N)
/// GET    /api/v1/groups/{id}/standings           - Standings
/// GET    /api/v1/matches/{id}                    - Get match
/// POST   /api/v1/matches/{id}/start              - Start match
/// POST   /api/v1/matches/{id}/result             - Record result
/// POST   /api/v1/matches/{id}/cancel             - Cancel match
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", create_v1_router())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create API v1 router with all versioned endpoints.
fn create_v1_router() -> Router<AppState> {
    let hierarchy_routes = Router::new()
        .route(
            "/leagues",
            post(leagues::create_league).get(leagues::list_leagues),
        )
        .route(
            "/leagues/{league_id}",
            get(leagues::get_league).delete(leagues::delete_league),
        )
        .route(
            "/leagues/{league_id}/seasons",
            post(leagues::create_season).get(leagues::list_seasons),
        )
        .route("/seasons/{season_id}", get(leagues::get_season))
        .route(
            "/seasons/{season_id}/transition",
            post(leagues::transition_season),
        )
        .route(
            "/seasons/{season_id}/formats",
            post(leagues::create_format_tier).get(leagues::list_format_tiers),
        )
        .route(
            "/formats/{format_tier_id}/tiers",
            post(leagues::create_rating_tier).get(leagues::list_rating_tiers),
        )
        .route(
            "/tiers/{tier_id}",
            get(leagues::get_rating_tier).patch(leagues::update_rating_tier),
        )
        .route(
            "/tiers/{tier_id}/groups",
            post(leagues::create_group).get(leagues::list_groups),
        )
        .route("/groups/{group_id}", get(leagues::get_group));

    let enrollment_routes = Router::new()
        .route("/join", post(enrollment::redeem))
        .route(
            "/tiers/{tier_id}/enrollments",
            get(enrollment::list_enrollments),
        )
        .route(
            "/tiers/{tier_id}/join-code",
            post(enrollment::rotate_join_code),
        )
        .route(
            "/enrollments/{enrollment_id}",
            get(enrollment::get_enrollment).delete(enrollment::withdraw),
        );

    let competition_routes = Router::new()
        .route("/tiers/{tier_id}/partition", post(groups::partition_tier))
        .route(
            "/groups/{group_id}/schedule",
            post(groups::generate_schedule)
                .get(groups::get_schedule)
                .delete(groups::reset_schedule),
        )
        .route(
            "/groups/{group_id}/weeks/{week}/matches",
            post(groups::materialize_week),
        )
        .route("/groups/{group_id}/matches", get(groups::list_matches))
        .route("/groups/{group_id}/standings", get(groups::get_standings))
        .route("/matches/{match_id}", get(matches::get_match))
        .route("/matches/{match_id}/start", post(matches::start_match))
        .route("/matches/{match_id}/result", post(matches::record_result))
        .route("/matches/{match_id}/cancel", post(matches::cancel_match));

    Router::new()
        .merge(hierarchy_routes)
        .merge(enrollment_routes)
        .merge(competition_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Reports entity counts from the store and the number of dead-lettered
/// notifications.
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","version":"0.1.0","store":{"leagues":1,...},"failed_notifications":0,...}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.engine.store.stats().await;
    let failed_notifications = state.engine.events.failed_deliveries().await.len();

    let response = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "store": stats,
        "failed_notifications": failed_notifications,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(response))
}
