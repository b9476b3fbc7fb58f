//! Standings manager.

use super::calculator::{PointsPolicy, StandingRow, compute_standings};
use crate::errors::LeagueResult;
use crate::hierarchy::GroupId;
use crate::store::LeagueStore;
use std::sync::Arc;

/// Serves group standings, recomputed on every request
#[derive(Clone)]
pub struct StandingsManager {
    store: Arc<LeagueStore>,
    points: PointsPolicy,
}

impl StandingsManager {
    /// Create a new standings manager
    pub fn new(store: Arc<LeagueStore>, points: PointsPolicy) -> Self {
        Self { store, points }
    }

    /// Ranked standings of a group
    ///
    /// Computed from a consistent snapshot taken under the read lock; nothing
    /// is cached between calls.
    pub async fn get_standings(&self, group_id: GroupId) -> LeagueResult<Vec<StandingRow>> {
        let state = self.store.read().await;
        let group = state.group(group_id)?;

        let mut entries = Vec::with_capacity(group.members.len());
        for entry in &group.members {
            entries.push((*entry, state.enrollment(*entry)?.display_name()));
        }

        Ok(compute_standings(
            &entries,
            state.matches_of_group(group_id),
            self.points,
        ))
    }
}
