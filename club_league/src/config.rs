//! Engine configuration.
//!
//! Defaults can be overridden through `LEAGUE_*` environment variables.

use crate::errors::{LeagueError, LeagueResult};
use crate::matches::MaterializePolicy;
use crate::schedule::RoundRobinFormat;
use crate::standings::PointsPolicy;
use std::time::Duration;

/// Default join code length
pub const DEFAULT_JOIN_CODE_LENGTH: usize = 6;

/// Default number of attempts to find an unused join code
pub const DEFAULT_JOIN_CODE_RETRIES: u32 = 32;

/// Engine-wide configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Length of generated join codes
    pub join_code_length: usize,

    /// Attempts before giving up on finding a unique join code
    pub join_code_retries: u32,

    /// Points awarded per win/loss in standings
    pub points: PointsPolicy,

    /// Behaviour of repeated week materialization
    pub materialize_policy: MaterializePolicy,

    /// Round-robin format used by `generate_schedule`
    pub round_robin: RoundRobinFormat,

    /// Delivery attempts per notification
    pub notify_max_attempts: u32,

    /// Pause between delivery attempts
    pub notify_backoff: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            join_code_length: DEFAULT_JOIN_CODE_LENGTH,
            join_code_retries: DEFAULT_JOIN_CODE_RETRIES,
            points: PointsPolicy::default(),
            materialize_policy: MaterializePolicy::Lenient,
            round_robin: RoundRobinFormat::Single,
            notify_max_attempts: 3,
            notify_backoff: Duration::from_millis(250),
        }
    }
}

impl EngineConfig {
    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `LEAGUE_JOIN_CODE_LENGTH` (default: 6)
    /// - `LEAGUE_JOIN_CODE_RETRIES` (default: 32)
    /// - `LEAGUE_POINTS_PER_WIN` (default: 2)
    /// - `LEAGUE_POINTS_PER_LOSS` (default: 1)
    /// - `LEAGUE_MATERIALIZE_POLICY`: `lenient` or `strict` (default: lenient)
    /// - `LEAGUE_ROUND_ROBIN`: `single` or `double` (default: single)
    /// - `LEAGUE_NOTIFY_MAX_ATTEMPTS` (default: 3)
    /// - `LEAGUE_NOTIFY_BACKOFF_MS` (default: 250)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let materialize_policy = std::env::var("LEAGUE_MATERIALIZE_POLICY")
            .ok()
            .and_then(|v| match v.to_lowercase().as_str() {
                "lenient" => Some(MaterializePolicy::Lenient),
                "strict" => Some(MaterializePolicy::Strict),
                _ => None,
            })
            .unwrap_or(defaults.materialize_policy);

        let round_robin = std::env::var("LEAGUE_ROUND_ROBIN")
            .ok()
            .and_then(|v| match v.to_lowercase().as_str() {
                "single" => Some(RoundRobinFormat::Single),
                "double" => Some(RoundRobinFormat::Double),
                _ => None,
            })
            .unwrap_or(defaults.round_robin);

        Self {
            join_code_length: parse_env_or("LEAGUE_JOIN_CODE_LENGTH", defaults.join_code_length),
            join_code_retries: parse_env_or("LEAGUE_JOIN_CODE_RETRIES", defaults.join_code_retries),
            points: PointsPolicy {
                win: parse_env_or("LEAGUE_POINTS_PER_WIN", defaults.points.win),
                loss: parse_env_or("LEAGUE_POINTS_PER_LOSS", defaults.points.loss),
            },
            materialize_policy,
            round_robin,
            notify_max_attempts: parse_env_or(
                "LEAGUE_NOTIFY_MAX_ATTEMPTS",
                defaults.notify_max_attempts,
            ),
            notify_backoff: Duration::from_millis(parse_env_or(
                "LEAGUE_NOTIFY_BACKOFF_MS",
                defaults.notify_backoff.as_millis() as u64,
            )),
        }
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> LeagueResult<()> {
        if !(4..=12).contains(&self.join_code_length) {
            return Err(LeagueError::InvalidState(format!(
                "join code length must be in 4..=12, got {}",
                self.join_code_length
            )));
        }

        if self.join_code_retries == 0 {
            return Err(LeagueError::InvalidState(
                "join code retries must be greater than 0".to_string(),
            ));
        }

        if self.points.win < self.points.loss {
            return Err(LeagueError::InvalidState(format!(
                "points per win ({}) must not be below points per loss ({})",
                self.points.win, self.points.loss
            )));
        }

        if self.notify_max_attempts == 0 {
            return Err(LeagueError::InvalidState(
                "notification attempts must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Helper to parse environment variable with default fallback
pub(crate) fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
