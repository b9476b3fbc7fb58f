//! # Club League
//!
//! Competition engine for recreational racquet-sport leagues.
//!
//! Clubs organise play as a hierarchy:
//! League → Season → FormatTier (singles/doubles) → RatingTier → PlayerGroup.
//! Players join a rating tier by redeeming its join code; the tier is then
//! split into balanced groups, each group gets a round-robin schedule, matches
//! are created one week at a time and standings are derived from results.
//!
//! ## Core Modules
//!
//! - [`hierarchy`]: Leagues, seasons, format tiers, rating tiers and groups
//! - [`enrollment`]: Join codes and capacity-limited enrollment
//! - [`grouping`]: Balanced partitioning of a tier into groups
//! - [`schedule`]: Circle-method round-robin schedules
//! - [`matches`]: Weekly match materialization and the match state machine
//! - [`standings`]: Ranked standings with tie-breaks
//! - [`notify`]: Fire-and-forget notification fan-out
//!
//! ## Example
//!
//! ```no_run
//! use club_league::{EngineConfig, LeagueEngine, notify::LogNotifier};
//! use club_league::hierarchy::{NewLeague, SportType};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = LeagueEngine::new(&EngineConfig::default(), Arc::new(LogNotifier))?;
//!
//!     let league = engine
//!         .hierarchy
//!         .create_league(NewLeague {
//!             name: "Riverside Tennis".to_string(),
//!             sport: SportType::Tennis,
//!             owner: 1,
//!         })
//!         .await?;
//!     println!("Created league {}", league.id);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod enrollment;
pub mod errors;
pub mod grouping;
pub mod hierarchy;
pub mod matches;
pub mod notify;
pub mod schedule;
pub mod standings;
pub mod store;

pub use config::EngineConfig;
pub use engine::LeagueEngine;
pub use errors::{EntityKind, LeagueError, LeagueResult};
pub use store::{LeagueStore, StoreSnapshot, StoreStats};
