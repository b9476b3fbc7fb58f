//! Join code generation.

use super::models::JoinCode;
use crate::config::{DEFAULT_JOIN_CODE_LENGTH, DEFAULT_JOIN_CODE_RETRIES};
use crate::errors::{LeagueError, LeagueResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

/// Join code alphabet: no 0/O or 1/I, which are easily confused
pub const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generates random join codes that are unique among live tiers
#[derive(Debug, Clone)]
pub struct JoinCodeGenerator {
    length: usize,
    max_attempts: u32,
    /// Deterministic source for tests; thread RNG when absent
    seeded: Option<Arc<Mutex<StdRng>>>,
}

impl Default for JoinCodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_JOIN_CODE_LENGTH, DEFAULT_JOIN_CODE_RETRIES)
    }
}

impl JoinCodeGenerator {
    /// Create a generator backed by the thread RNG
    pub fn new(length: usize, max_attempts: u32) -> Self {
        Self {
            length,
            max_attempts,
            seeded: None,
        }
    }

    /// Create a generator with a fixed seed (reproducible codes)
    pub fn with_seed(length: usize, max_attempts: u32, seed: u64) -> Self {
        Self {
            length,
            max_attempts,
            seeded: Some(Arc::new(Mutex::new(StdRng::seed_from_u64(seed)))),
        }
    }

    /// Produce one candidate code
    pub fn generate(&self) -> JoinCode {
        let code = match &self.seeded {
            Some(rng) => {
                let mut rng = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                Self::draw(&mut *rng, self.length)
            }
            None => Self::draw(&mut rand::rng(), self.length),
        };
        JoinCode::from_generated(code)
    }

    /// Generate codes until one is not in use
    ///
    /// # Arguments
    ///
    /// * `in_use` - Returns true when a candidate collides with a live code
    ///
    /// # Returns
    ///
    /// A free code, or `JoinCodeSpaceExhausted` after `max_attempts` collisions
    pub fn issue<F>(&self, in_use: F) -> LeagueResult<JoinCode>
    where
        F: Fn(&JoinCode) -> bool,
    {
        for attempt in 1..=self.max_attempts {
            let code = self.generate();
            if !in_use(&code) {
                return Ok(code);
            }
            log::debug!("Join code collision on attempt {attempt}");
        }

        log::error!(
            "Could not find a free join code after {} attempts",
            self.max_attempts
        );
        Err(LeagueError::JoinCodeSpaceExhausted {
            attempts: self.max_attempts,
        })
    }

    fn draw<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
        (0..length)
            .map(|_| JOIN_CODE_ALPHABET[rng.random_range(0..JOIN_CODE_ALPHABET.len())] as char)
            .collect()
    }
}
