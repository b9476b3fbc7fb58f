//! League hierarchy manager.

use super::models::{
    FormatTier, FormatTierId, GroupId, GroupPhase, League, LeagueId, NewFormatTier, NewLeague,
    NewRatingTier, NewSeason, PlayerGroup, RatingTier, RatingTierId, RatingTierUpdate, Season,
    SeasonId, SeasonStatus, SeasonUpdate, TierPhase, validate_dates, validate_name,
    validate_tier_rules,
};
use crate::enrollment::{JoinCodeGenerator, PlayerId};
use crate::errors::{EntityKind, LeagueError, LeagueResult};
use crate::store::LeagueStore;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

/// Creates, reads, updates and deletes the league hierarchy
#[derive(Clone)]
pub struct HierarchyManager {
    store: Arc<LeagueStore>,
    codes: JoinCodeGenerator,
}

impl HierarchyManager {
    /// Create a new hierarchy manager
    pub fn new(store: Arc<LeagueStore>, codes: JoinCodeGenerator) -> Self {
        Self { store, codes }
    }

    // === Leagues ===

    /// Create a league owned by the requesting player
    pub async fn create_league(&self, new: NewLeague) -> LeagueResult<League> {
        validate_name("league", &new.name)?;

        let mut state = self.store.write().await;
        let league = League {
            id: state.next_id(),
            name: new.name.trim().to_string(),
            sport: new.sport,
            owner: new.owner,
            created_at: Utc::now(),
        };
        state.leagues.insert(league.id, league.clone());

        log::info!(
            "Created league {} '{}' for owner {}",
            league.id,
            league.name,
            league.owner
        );
        Ok(league)
    }

    pub async fn get_league(&self, id: LeagueId) -> LeagueResult<League> {
        Ok(self.store.read().await.league(id)?.clone())
    }

    pub async fn list_leagues(&self) -> Vec<League> {
        self.store.read().await.leagues.values().cloned().collect()
    }

    pub async fn rename_league(&self, id: LeagueId, name: &str) -> LeagueResult<League> {
        validate_name("league", name)?;

        let mut state = self.store.write().await;
        let league = state
            .leagues
            .get_mut(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::League, id))?;
        league.name = name.trim().to_string();
        Ok(league.clone())
    }

    /// Delete a league and everything below it
    ///
    /// Only the league owner may delete it.
    pub async fn delete_league(&self, id: LeagueId, requester: PlayerId) -> LeagueResult<()> {
        let mut state = self.store.write().await;
        let league = state.league(id)?;
        if league.owner != requester {
            log::warn!("Player {requester} tried to delete league {id} without owning it");
            return Err(LeagueError::NotOwner {
                league_id: id,
                requester,
            });
        }

        state.remove_league(id);
        log::info!("Deleted league {id}");
        Ok(())
    }

    // === Seasons ===

    pub async fn create_season(&self, league_id: LeagueId, new: NewSeason) -> LeagueResult<Season> {
        new.validate()?;

        let mut state = self.store.write().await;
        state.league(league_id)?;

        let season = Season {
            id: state.next_id(),
            league_id,
            name: new.name.trim().to_string(),
            start_date: new.start_date,
            end_date: new.end_date,
            status_override: None,
        };
        state.seasons.insert(season.id, season.clone());

        log::info!(
            "Created season {} '{}' ({} to {}) in league {}",
            season.id,
            season.name,
            season.start_date,
            season.end_date,
            league_id
        );
        Ok(season)
    }

    pub async fn get_season(&self, id: SeasonId) -> LeagueResult<Season> {
        Ok(self.store.read().await.season(id)?.clone())
    }

    pub async fn list_seasons(&self, league_id: LeagueId) -> LeagueResult<Vec<Season>> {
        let state = self.store.read().await;
        state.league(league_id)?;
        Ok(state
            .seasons
            .values()
            .filter(|s| s.league_id == league_id)
            .cloned()
            .collect())
    }

    /// Apply a partial update; the resulting dates are re-validated
    pub async fn update_season(&self, id: SeasonId, update: SeasonUpdate) -> LeagueResult<Season> {
        let mut state = self.store.write().await;
        let current = state.season(id)?.clone();

        let name = match update.name {
            Some(name) => {
                validate_name("season", &name)?;
                name.trim().to_string()
            }
            None => current.name,
        };
        let start_date = update.start_date.unwrap_or(current.start_date);
        let end_date = update.end_date.unwrap_or(current.end_date);
        validate_dates(start_date, end_date)?;

        let season = state
            .seasons
            .get_mut(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Season, id))?;
        season.name = name;
        season.start_date = start_date;
        season.end_date = end_date;
        Ok(season.clone())
    }

    /// Status of a season on the given day
    pub async fn season_status(&self, id: SeasonId, today: NaiveDate) -> LeagueResult<SeasonStatus> {
        Ok(self.store.read().await.season(id)?.status_on(today))
    }

    /// Record an explicit status; seasons only move forward
    pub async fn transition_season(
        &self,
        id: SeasonId,
        status: SeasonStatus,
    ) -> LeagueResult<Season> {
        let today = Utc::now().date_naive();

        let mut state = self.store.write().await;
        let current = state.season(id)?.status_on(today);
        if status < current {
            return Err(LeagueError::InvalidTransition {
                from: current.to_string(),
                to: status.to_string(),
            });
        }

        let season = state
            .seasons
            .get_mut(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Season, id))?;
        season.status_override = Some(status);

        log::info!("Season {id} moved from {current} to {status}");
        Ok(season.clone())
    }

    pub async fn delete_season(&self, id: SeasonId) -> LeagueResult<()> {
        let mut state = self.store.write().await;
        state.season(id)?;
        state.remove_season(id);
        log::info!("Deleted season {id}");
        Ok(())
    }

    // === Format tiers ===

    pub async fn create_format_tier(
        &self,
        season_id: SeasonId,
        new: NewFormatTier,
    ) -> LeagueResult<FormatTier> {
        validate_name("format tier", &new.name)?;

        let mut state = self.store.write().await;
        state.season(season_id)?;

        let tier = FormatTier {
            id: state.next_id(),
            season_id,
            name: new.name.trim().to_string(),
            format: new.format,
        };
        state.format_tiers.insert(tier.id, tier.clone());

        log::info!(
            "Created format tier {} '{}' ({:?}) in season {}",
            tier.id,
            tier.name,
            tier.format,
            season_id
        );
        Ok(tier)
    }

    pub async fn get_format_tier(&self, id: FormatTierId) -> LeagueResult<FormatTier> {
        Ok(self.store.read().await.format_tier(id)?.clone())
    }

    pub async fn list_format_tiers(&self, season_id: SeasonId) -> LeagueResult<Vec<FormatTier>> {
        let state = self.store.read().await;
        state.season(season_id)?;
        Ok(state
            .format_tiers
            .values()
            .filter(|f| f.season_id == season_id)
            .cloned()
            .collect())
    }

    pub async fn rename_format_tier(&self, id: FormatTierId, name: &str) -> LeagueResult<FormatTier> {
        validate_name("format tier", name)?;

        let mut state = self.store.write().await;
        let tier = state
            .format_tiers
            .get_mut(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::FormatTier, id))?;
        tier.name = name.trim().to_string();
        Ok(tier.clone())
    }

    pub async fn delete_format_tier(&self, id: FormatTierId) -> LeagueResult<()> {
        let mut state = self.store.write().await;
        state.format_tier(id)?;
        state.remove_format_tier(id);
        log::info!("Deleted format tier {id}");
        Ok(())
    }

    // === Rating tiers ===

    /// Create a rating tier and issue its join code
    pub async fn create_rating_tier(
        &self,
        format_tier_id: FormatTierId,
        new: NewRatingTier,
    ) -> LeagueResult<RatingTier> {
        new.validate()?;

        let mut state = self.store.write().await;
        state.format_tier(format_tier_id)?;

        let join_code = self.codes.issue(|code| state.code_in_use(code))?;
        let tier = RatingTier {
            id: state.next_id(),
            format_tier_id,
            name: new.name.trim().to_string(),
            min_rating: new.min_rating,
            max_rating: new.max_rating,
            capacity: new.capacity,
            competition: new.competition,
            playoff_spots: new.playoff_spots,
            join_code,
            phase: TierPhase::Open,
            partition_seed: None,
        };
        state.insert_rating_tier(tier.clone());

        log::info!(
            "Created rating tier {} '{}' [{}, {}] capacity {} in format tier {}",
            tier.id,
            tier.name,
            tier.min_rating,
            tier.max_rating,
            tier.capacity,
            format_tier_id
        );
        Ok(tier)
    }

    pub async fn get_rating_tier(&self, id: RatingTierId) -> LeagueResult<RatingTier> {
        Ok(self.store.read().await.rating_tier(id)?.clone())
    }

    pub async fn list_rating_tiers(&self, format_tier_id: FormatTierId) -> LeagueResult<Vec<RatingTier>> {
        let state = self.store.read().await;
        state.format_tier(format_tier_id)?;
        Ok(state
            .rating_tiers
            .values()
            .filter(|t| t.format_tier_id == format_tier_id)
            .cloned()
            .collect())
    }

    /// Apply a partial update
    ///
    /// Capacity may not drop below the number of active enrollments.
    pub async fn update_rating_tier(
        &self,
        id: RatingTierId,
        update: RatingTierUpdate,
    ) -> LeagueResult<RatingTier> {
        let mut state = self.store.write().await;
        let current = state.rating_tier(id)?.clone();

        if let Some(name) = &update.name {
            validate_name("rating tier", name)?;
        }
        let min_rating = update.min_rating.unwrap_or(current.min_rating);
        let max_rating = update.max_rating.unwrap_or(current.max_rating);
        let capacity = update.capacity.unwrap_or(current.capacity);
        let playoff_spots = update.playoff_spots.unwrap_or(current.playoff_spots);
        validate_tier_rules(
            min_rating,
            max_rating,
            capacity,
            current.competition,
            playoff_spots,
        )?;

        let enrolled = state.active_enrollments(id).len();
        if capacity < enrolled {
            return Err(LeagueError::InvalidState(format!(
                "capacity {capacity} is below the {enrolled} active enrollments"
            )));
        }

        let tier = state.rating_tier_mut(id)?;
        if let Some(name) = update.name {
            tier.name = name.trim().to_string();
        }
        tier.min_rating = min_rating;
        tier.max_rating = max_rating;
        tier.capacity = capacity;
        tier.playoff_spots = playoff_spots;
        Ok(tier.clone())
    }

    /// Delete a rating tier; its join code is released
    pub async fn delete_rating_tier(&self, id: RatingTierId) -> LeagueResult<()> {
        let mut state = self.store.write().await;
        state.rating_tier(id)?;
        state.remove_rating_tier(id);
        log::info!("Deleted rating tier {id}");
        Ok(())
    }

    // === Groups ===

    /// Create an empty group in a tier
    ///
    /// Only allowed while nobody is enrolled; enrolled players are grouped
    /// by partitioning the tier.
    pub async fn create_group(&self, tier_id: RatingTierId, name: &str) -> LeagueResult<PlayerGroup> {
        validate_name("group", name)?;

        let mut state = self.store.write().await;
        state.rating_tier(tier_id)?;
        if let Some(scheduled) = state.scheduled_group_of_tier(tier_id) {
            return Err(LeagueError::ScheduleLocked(scheduled));
        }
        let enrolled = state.active_enrollments(tier_id).len();
        if enrolled > 0 {
            return Err(LeagueError::InvalidState(format!(
                "rating tier {tier_id} has {enrolled} active enrollments; partition it instead"
            )));
        }

        let group = PlayerGroup {
            id: state.next_id(),
            rating_tier_id: tier_id,
            name: name.trim().to_string(),
            members: Vec::new(),
            phase: GroupPhase::Unscheduled,
        };
        state.groups.insert(group.id, group.clone());
        state.recompute_tier_phase(tier_id)?;

        log::info!("Created group {} '{}' in rating tier {}", group.id, group.name, tier_id);
        Ok(group)
    }

    pub async fn get_group(&self, id: GroupId) -> LeagueResult<PlayerGroup> {
        Ok(self.store.read().await.group(id)?.clone())
    }

    pub async fn list_groups(&self, tier_id: RatingTierId) -> LeagueResult<Vec<PlayerGroup>> {
        let state = self.store.read().await;
        state.rating_tier(tier_id)?;
        Ok(state.groups_of_tier(tier_id).into_iter().cloned().collect())
    }

    pub async fn rename_group(&self, id: GroupId, name: &str) -> LeagueResult<PlayerGroup> {
        validate_name("group", name)?;

        let mut state = self.store.write().await;
        let group = state.group_mut(id)?;
        group.name = name.trim().to_string();
        Ok(group.clone())
    }

    /// Delete a group together with its schedule and matches
    ///
    /// A group with members can only go when it is the tier's last group,
    /// which returns the tier to Open. Otherwise its members would be left
    /// without a group.
    pub async fn delete_group(&self, id: GroupId) -> LeagueResult<()> {
        let mut state = self.store.write().await;
        let group = state.group(id)?;
        let tier_id = group.rating_tier_id;
        if !group.members.is_empty() && state.groups_of_tier(tier_id).len() > 1 {
            return Err(LeagueError::InvalidState(format!(
                "group {id} has {} members and sibling groups; re-partition rating tier {tier_id} instead",
                group.members.len()
            )));
        }
        state.remove_group(id);
        state.recompute_tier_phase(tier_id)?;
        log::info!("Deleted group {id} from rating tier {tier_id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{CompetitionSystem, FormatType, SportType};

    fn manager() -> HierarchyManager {
        HierarchyManager::new(Arc::new(LeagueStore::new()), JoinCodeGenerator::default())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_tier(capacity: usize) -> NewRatingTier {
        NewRatingTier {
            name: "3.0-3.5".to_string(),
            min_rating: 3.0,
            max_rating: 3.5,
            capacity,
            competition: CompetitionSystem::LeagueFormat,
            playoff_spots: None,
        }
    }

    async fn tier_chain(manager: &HierarchyManager) -> (League, RatingTier) {
        let league = manager
            .create_league(NewLeague {
                name: "Riverside Tennis".to_string(),
                sport: SportType::Tennis,
                owner: 100,
            })
            .await
            .unwrap();
        let season = manager
            .create_season(
                league.id,
                NewSeason {
                    name: "Spring".to_string(),
                    start_date: date(2026, 3, 1),
                    end_date: date(2026, 5, 31),
                },
            )
            .await
            .unwrap();
        let format = manager
            .create_format_tier(
                season.id,
                NewFormatTier {
                    name: "Singles".to_string(),
                    format: FormatType::Singles,
                },
            )
            .await
            .unwrap();
        let tier = manager.create_rating_tier(format.id, new_tier(8)).await.unwrap();
        (league, tier)
    }

    #[tokio::test]
    async fn test_create_hierarchy() {
        let manager = manager();
        let (league, tier) = tier_chain(&manager).await;

        assert_eq!(tier.phase, TierPhase::Open);
        assert_eq!(tier.join_code.as_str().len(), 6);
        assert_eq!(manager.list_leagues().await, vec![league.clone()]);
        assert_eq!(manager.list_seasons(league.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_parent_is_not_found() {
        let manager = manager();
        let err = manager
            .create_season(
                999,
                NewSeason {
                    name: "Spring".to_string(),
                    start_date: date(2026, 3, 1),
                    end_date: date(2026, 5, 31),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LeagueError::NotFound { id: 999, .. }));
    }

    #[tokio::test]
    async fn test_bad_season_dates_rejected() {
        let manager = manager();
        let (league, _) = tier_chain(&manager).await;
        let err = manager
            .create_season(
                league.id,
                NewSeason {
                    name: "Backwards".to_string(),
                    start_date: date(2026, 5, 1),
                    end_date: date(2026, 3, 1),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LeagueError::InvalidState(_)));
        assert_eq!(manager.list_seasons(league.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_season_revalidates_dates() {
        let manager = manager();
        let (league, _) = tier_chain(&manager).await;
        let season = manager.list_seasons(league.id).await.unwrap().remove(0);

        let err = manager
            .update_season(
                season.id,
                SeasonUpdate {
                    end_date: Some(date(2026, 2, 1)),
                    ..SeasonUpdate::default()
                },
            )
            .await;
        assert!(err.is_err());

        let updated = manager
            .update_season(
                season.id,
                SeasonUpdate {
                    name: Some("Spring Ladder".to_string()),
                    ..SeasonUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Spring Ladder");
        assert_eq!(updated.end_date, season.end_date);
    }

    #[tokio::test]
    async fn test_season_transitions_only_move_forward() {
        let manager = manager();
        let league = manager
            .create_league(NewLeague {
                name: "Future".to_string(),
                sport: SportType::Padel,
                owner: 1,
            })
            .await
            .unwrap();
        let season = manager
            .create_season(
                league.id,
                NewSeason {
                    name: "Far".to_string(),
                    start_date: date(2099, 1, 1),
                    end_date: date(2099, 6, 1),
                },
            )
            .await
            .unwrap();

        let active = manager
            .transition_season(season.id, SeasonStatus::Active)
            .await
            .unwrap();
        assert_eq!(active.status_override, Some(SeasonStatus::Active));

        let err = manager
            .transition_season(season.id, SeasonStatus::Upcoming)
            .await
            .unwrap_err();
        assert!(matches!(err, LeagueError::InvalidTransition { .. }));

        assert_eq!(
            manager
                .season_status(season.id, date(2099, 1, 1))
                .await
                .unwrap(),
            SeasonStatus::Active
        );
    }

    #[tokio::test]
    async fn test_only_owner_deletes_league() {
        let manager = manager();
        let (league, tier) = tier_chain(&manager).await;

        let err = manager.delete_league(league.id, 5).await.unwrap_err();
        assert!(matches!(err, LeagueError::NotOwner { requester: 5, .. }));

        manager.delete_league(league.id, 100).await.unwrap();
        assert!(manager.get_rating_tier(tier.id).await.is_err());
        assert!(manager.list_leagues().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_rating_tier_validates_rules() {
        let manager = manager();
        let (_, tier) = tier_chain(&manager).await;

        let err = manager
            .update_rating_tier(
                tier.id,
                RatingTierUpdate {
                    min_rating: Some(4.0),
                    ..RatingTierUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LeagueError::InvalidState(_)));

        let updated = manager
            .update_rating_tier(
                tier.id,
                RatingTierUpdate {
                    capacity: Some(12),
                    playoff_spots: Some(Some(4)),
                    ..RatingTierUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.capacity, 12);
        assert_eq!(updated.playoff_spots, Some(4));
        assert_eq!(updated.join_code, tier.join_code);
    }

    #[tokio::test]
    async fn test_groups_move_tier_phase() {
        let manager = manager();
        let (_, tier) = tier_chain(&manager).await;

        let group = manager.create_group(tier.id, "Group A").await.unwrap();
        assert_eq!(
            manager.get_rating_tier(tier.id).await.unwrap().phase,
            TierPhase::Partitioned
        );

        manager.rename_group(group.id, "Court 1").await.unwrap();
        assert_eq!(manager.get_group(group.id).await.unwrap().name, "Court 1");

        manager.delete_group(group.id).await.unwrap();
        assert_eq!(
            manager.get_rating_tier(tier.id).await.unwrap().phase,
            TierPhase::Open
        );
        assert!(manager.list_groups(tier.id).await.unwrap().is_empty());
    }
}
