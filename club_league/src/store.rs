//! In-memory league store.
//!
//! Every entity lives in an id-keyed map with a foreign key to its parent.
//! Join codes and the `(group, week, home, away)` match key are indexed
//! separately. All state sits behind one `RwLock`, so a write guard covers a
//! whole check-then-write sequence.

use crate::enrollment::{Enrollment, EnrollmentId, JoinCode};
use crate::errors::{EntityKind, LeagueError, LeagueResult};
use crate::hierarchy::{
    FormatTier, FormatTierId, FormatType, GroupId, GroupPhase, League, LeagueId, PlayerGroup,
    RatingTier, RatingTierId, Season, SeasonId, TierPhase,
};
use crate::matches::{Match, MatchId};
use crate::schedule::Schedule;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Uniqueness key of a materialized match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct MatchKey {
    pub group_id: GroupId,
    pub week: u32,
    pub home: EnrollmentId,
    pub away: EnrollmentId,
}

impl MatchKey {
    fn of(m: &Match) -> Self {
        Self {
            group_id: m.group_id,
            week: m.week,
            home: m.home,
            away: m.away,
        }
    }
}

/// Entity counts, reported by health checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub leagues: usize,
    pub seasons: usize,
    pub format_tiers: usize,
    pub rating_tiers: usize,
    pub groups: usize,
    pub enrollments: usize,
    pub schedules: usize,
    pub matches: usize,
}

/// Serializable copy of the whole store
///
/// Indexes are not part of the snapshot; they are rebuilt on restore.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub next_id: i64,
    pub next_sequence: u64,
    pub leagues: Vec<League>,
    pub seasons: Vec<Season>,
    pub format_tiers: Vec<FormatTier>,
    pub rating_tiers: Vec<RatingTier>,
    pub groups: Vec<PlayerGroup>,
    pub enrollments: Vec<Enrollment>,
    pub schedules: Vec<Schedule>,
    pub matches: Vec<Match>,
}

/// Store contents
#[derive(Debug, Default)]
pub(crate) struct StoreState {
    next_id: i64,
    next_sequence: u64,
    pub leagues: BTreeMap<LeagueId, League>,
    pub seasons: BTreeMap<SeasonId, Season>,
    pub format_tiers: BTreeMap<FormatTierId, FormatTier>,
    pub rating_tiers: BTreeMap<RatingTierId, RatingTier>,
    pub groups: BTreeMap<GroupId, PlayerGroup>,
    pub enrollments: BTreeMap<EnrollmentId, Enrollment>,
    /// Keyed by group: a group has at most one schedule
    pub schedules: BTreeMap<GroupId, Schedule>,
    pub matches: BTreeMap<MatchId, Match>,
    join_codes: HashMap<JoinCode, RatingTierId>,
    match_keys: HashMap<MatchKey, MatchId>,
}

impl StoreState {
    /// Allocate the next id (shared by all entity kinds)
    pub fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Allocate the next enrollment sequence number
    pub fn next_sequence(&mut self) -> u64 {
        self.next_sequence += 1;
        self.next_sequence
    }

    pub fn league(&self, id: LeagueId) -> LeagueResult<&League> {
        self.leagues
            .get(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::League, id))
    }

    pub fn season(&self, id: SeasonId) -> LeagueResult<&Season> {
        self.seasons
            .get(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Season, id))
    }

    pub fn format_tier(&self, id: FormatTierId) -> LeagueResult<&FormatTier> {
        self.format_tiers
            .get(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::FormatTier, id))
    }

    pub fn rating_tier(&self, id: RatingTierId) -> LeagueResult<&RatingTier> {
        self.rating_tiers
            .get(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::RatingTier, id))
    }

    pub fn rating_tier_mut(&mut self, id: RatingTierId) -> LeagueResult<&mut RatingTier> {
        self.rating_tiers
            .get_mut(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::RatingTier, id))
    }

    pub fn group(&self, id: GroupId) -> LeagueResult<&PlayerGroup> {
        self.groups
            .get(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Group, id))
    }

    pub fn group_mut(&mut self, id: GroupId) -> LeagueResult<&mut PlayerGroup> {
        self.groups
            .get_mut(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Group, id))
    }

    pub fn enrollment(&self, id: EnrollmentId) -> LeagueResult<&Enrollment> {
        self.enrollments
            .get(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Enrollment, id))
    }

    pub fn schedule(&self, group_id: GroupId) -> LeagueResult<&Schedule> {
        self.schedules
            .get(&group_id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Schedule, group_id))
    }

    pub fn match_record(&self, id: MatchId) -> LeagueResult<&Match> {
        self.matches
            .get(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Match, id))
    }

    pub fn match_mut(&mut self, id: MatchId) -> LeagueResult<&mut Match> {
        self.matches
            .get_mut(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Match, id))
    }

    /// Format (singles/doubles) of a rating tier
    pub fn format_of_tier(&self, tier_id: RatingTierId) -> LeagueResult<FormatType> {
        let tier = self.rating_tier(tier_id)?;
        Ok(self.format_tier(tier.format_tier_id)?.format)
    }

    /// Season a group plays in
    pub fn season_of_group(&self, group_id: GroupId) -> LeagueResult<&Season> {
        let group = self.group(group_id)?;
        let tier = self.rating_tier(group.rating_tier_id)?;
        let format_tier = self.format_tier(tier.format_tier_id)?;
        self.season(format_tier.season_id)
    }

    /// Active enrollments of a tier in creation order
    pub fn active_enrollments(&self, tier_id: RatingTierId) -> Vec<&Enrollment> {
        let mut list: Vec<&Enrollment> = self
            .enrollments
            .values()
            .filter(|e| e.rating_tier_id == tier_id && e.is_active())
            .collect();
        list.sort_by_key(|e| e.sequence);
        list
    }

    /// Groups of a tier in creation order
    pub fn groups_of_tier(&self, tier_id: RatingTierId) -> Vec<&PlayerGroup> {
        self.groups
            .values()
            .filter(|g| g.rating_tier_id == tier_id)
            .collect()
    }

    /// First group of the tier that has a schedule
    pub fn scheduled_group_of_tier(&self, tier_id: RatingTierId) -> Option<GroupId> {
        self.groups_of_tier(tier_id)
            .iter()
            .find(|g| self.schedules.contains_key(&g.id))
            .map(|g| g.id)
    }

    /// Matches of a group ordered by week, then id
    pub fn matches_of_group(&self, group_id: GroupId) -> Vec<&Match> {
        let mut list: Vec<&Match> = self
            .matches
            .values()
            .filter(|m| m.group_id == group_id)
            .collect();
        list.sort_by_key(|m| (m.week, m.id));
        list
    }

    pub fn group_has_matches(&self, group_id: GroupId) -> bool {
        self.matches.values().any(|m| m.group_id == group_id)
    }

    pub fn tier_for_code(&self, code: &JoinCode) -> Option<RatingTierId> {
        self.join_codes.get(code).copied()
    }

    pub fn code_in_use(&self, code: &JoinCode) -> bool {
        self.join_codes.contains_key(code)
    }

    /// Bind a code to a tier, releasing the tier's previous code
    pub fn bind_join_code(&mut self, tier_id: RatingTierId, code: JoinCode) -> LeagueResult<()> {
        let tier = self.rating_tier_mut(tier_id)?;
        let previous = std::mem::replace(&mut tier.join_code, code.clone());
        if previous != code {
            self.join_codes.remove(&previous);
        }
        self.join_codes.insert(code, tier_id);
        Ok(())
    }

    /// Insert a freshly created tier and index its code
    pub fn insert_rating_tier(&mut self, tier: RatingTier) {
        self.join_codes.insert(tier.join_code.clone(), tier.id);
        self.rating_tiers.insert(tier.id, tier);
    }

    /// Existing match for a key, if any
    pub fn match_for_key(
        &self,
        group_id: GroupId,
        week: u32,
        home: EnrollmentId,
        away: EnrollmentId,
    ) -> Option<MatchId> {
        self.match_keys
            .get(&MatchKey {
                group_id,
                week,
                home,
                away,
            })
            .copied()
    }

    /// Insert a match, refusing a second match with the same key
    pub fn insert_match(&mut self, m: Match) -> LeagueResult<()> {
        let key = MatchKey::of(&m);
        if self.match_keys.contains_key(&key) {
            return Err(LeagueError::AlreadyMaterialized {
                group_id: m.group_id,
                week: m.week,
            });
        }
        self.match_keys.insert(key, m.id);
        self.matches.insert(m.id, m);
        Ok(())
    }

    /// Derive a tier's phase from its groups
    pub fn recompute_tier_phase(&mut self, tier_id: RatingTierId) -> LeagueResult<TierPhase> {
        let phase = self
            .groups_of_tier(tier_id)
            .iter()
            .map(|g| match g.phase {
                GroupPhase::Unscheduled => TierPhase::Partitioned,
                GroupPhase::Scheduled => TierPhase::Scheduled,
                GroupPhase::Active => TierPhase::Active,
            })
            .max()
            .unwrap_or(TierPhase::Open);

        self.rating_tier_mut(tier_id)?.phase = phase;
        Ok(phase)
    }

    /// Remove every group of a tier; callers ensure none is scheduled
    pub fn dissolve_groups(&mut self, tier_id: RatingTierId) -> usize {
        let ids: Vec<GroupId> = self.groups_of_tier(tier_id).iter().map(|g| g.id).collect();
        for id in &ids {
            self.remove_group(*id);
        }
        ids.len()
    }

    /// Delete the group's matches and their index entries
    pub fn remove_group_matches(&mut self, group_id: GroupId) -> usize {
        let ids: Vec<MatchId> = self
            .matches
            .values()
            .filter(|m| m.group_id == group_id)
            .map(|m| m.id)
            .collect();
        for id in &ids {
            if let Some(m) = self.matches.remove(id) {
                self.match_keys.remove(&MatchKey::of(&m));
            }
        }
        ids.len()
    }

    pub fn remove_group(&mut self, group_id: GroupId) {
        self.remove_group_matches(group_id);
        self.schedules.remove(&group_id);
        self.groups.remove(&group_id);
    }

    pub fn remove_rating_tier(&mut self, tier_id: RatingTierId) {
        let groups: Vec<GroupId> = self.groups_of_tier(tier_id).iter().map(|g| g.id).collect();
        for id in groups {
            self.remove_group(id);
        }
        self.enrollments.retain(|_, e| e.rating_tier_id != tier_id);
        if let Some(tier) = self.rating_tiers.remove(&tier_id) {
            self.join_codes.remove(&tier.join_code);
        }
    }

    pub fn remove_format_tier(&mut self, format_tier_id: FormatTierId) {
        let tiers: Vec<RatingTierId> = self
            .rating_tiers
            .values()
            .filter(|t| t.format_tier_id == format_tier_id)
            .map(|t| t.id)
            .collect();
        for id in tiers {
            self.remove_rating_tier(id);
        }
        self.format_tiers.remove(&format_tier_id);
    }

    pub fn remove_season(&mut self, season_id: SeasonId) {
        let format_tiers: Vec<FormatTierId> = self
            .format_tiers
            .values()
            .filter(|f| f.season_id == season_id)
            .map(|f| f.id)
            .collect();
        for id in format_tiers {
            self.remove_format_tier(id);
        }
        self.seasons.remove(&season_id);
    }

    pub fn remove_league(&mut self, league_id: LeagueId) {
        let seasons: Vec<SeasonId> = self
            .seasons
            .values()
            .filter(|s| s.league_id == league_id)
            .map(|s| s.id)
            .collect();
        for id in seasons {
            self.remove_season(id);
        }
        self.leagues.remove(&league_id);
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            leagues: self.leagues.len(),
            seasons: self.seasons.len(),
            format_tiers: self.format_tiers.len(),
            rating_tiers: self.rating_tiers.len(),
            groups: self.groups.len(),
            enrollments: self.enrollments.len(),
            schedules: self.schedules.len(),
            matches: self.matches.len(),
        }
    }

    fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            next_id: self.next_id,
            next_sequence: self.next_sequence,
            leagues: self.leagues.values().cloned().collect(),
            seasons: self.seasons.values().cloned().collect(),
            format_tiers: self.format_tiers.values().cloned().collect(),
            rating_tiers: self.rating_tiers.values().cloned().collect(),
            groups: self.groups.values().cloned().collect(),
            enrollments: self.enrollments.values().cloned().collect(),
            schedules: self.schedules.values().cloned().collect(),
            matches: self.matches.values().cloned().collect(),
        }
    }

    fn from_snapshot(snapshot: StoreSnapshot) -> LeagueResult<Self> {
        let mut state = StoreState {
            next_id: snapshot.next_id,
            next_sequence: snapshot.next_sequence,
            ..StoreState::default()
        };

        state.leagues = snapshot.leagues.into_iter().map(|l| (l.id, l)).collect();
        state.seasons = snapshot.seasons.into_iter().map(|s| (s.id, s)).collect();
        state.format_tiers = snapshot
            .format_tiers
            .into_iter()
            .map(|f| (f.id, f))
            .collect();
        state.groups = snapshot.groups.into_iter().map(|g| (g.id, g)).collect();
        state.enrollments = snapshot
            .enrollments
            .into_iter()
            .map(|e| (e.id, e))
            .collect();
        state.schedules = snapshot
            .schedules
            .into_iter()
            .map(|s| (s.group_id, s))
            .collect();

        for tier in snapshot.rating_tiers {
            if state.code_in_use(&tier.join_code) {
                return Err(LeagueError::InvalidState(format!(
                    "duplicate join code in snapshot for rating tier {}",
                    tier.id
                )));
            }
            state.insert_rating_tier(tier);
        }

        for m in snapshot.matches {
            state.insert_match(m)?;
        }

        let max_id = state
            .leagues
            .keys()
            .chain(state.seasons.keys())
            .chain(state.format_tiers.keys())
            .chain(state.rating_tiers.keys())
            .chain(state.groups.keys())
            .chain(state.enrollments.keys())
            .chain(state.matches.keys())
            .chain(state.schedules.values().map(|s| &s.id))
            .copied()
            .max()
            .unwrap_or(0);
        state.next_id = state.next_id.max(max_id);

        Ok(state)
    }
}

/// Shared league store
#[derive(Debug, Default)]
pub struct LeagueStore {
    state: RwLock<StoreState>,
}

impl LeagueStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a store from a snapshot, rebuilding the indexes
    pub fn from_snapshot(snapshot: StoreSnapshot) -> LeagueResult<Self> {
        Ok(Self {
            state: RwLock::new(StoreState::from_snapshot(snapshot)?),
        })
    }

    /// Consistent copy of all stored entities
    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.snapshot()
    }

    /// Entity counts
    pub async fn stats(&self) -> StoreStats {
        self.state.read().await.stats()
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().await
    }
}
