//! Tier partitioning into player groups.

use super::partition::{auto_group_name, partition_balanced};
use crate::enrollment::EnrollmentId;
use crate::errors::{LeagueError, LeagueResult};
use crate::hierarchy::{GroupPhase, PlayerGroup, RatingTierId};
use crate::notify::{LeagueEvent, NotificationDispatcher};
use crate::store::LeagueStore;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Order in which enrollments are dealt into groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "seed", rename_all = "snake_case")]
pub enum PartitionOrder {
    /// Enrollment creation order
    #[default]
    EnrollmentOrder,
    /// Shuffle with a fixed seed (reproducible)
    Seeded(u64),
    /// Shuffle with a fresh random seed, which is recorded on the tier
    Shuffled,
}

/// Partition request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionRequest {
    pub tier_id: RatingTierId,
    pub target_size: usize,
    /// Custom group names; used only when the count matches the group count
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub ordering: PartitionOrder,
}

impl PartitionRequest {
    pub fn new(tier_id: RatingTierId, target_size: usize) -> Self {
        Self {
            tier_id,
            target_size,
            names: Vec::new(),
            ordering: PartitionOrder::EnrollmentOrder,
        }
    }
}

/// Splits a tier's active enrollments into balanced groups
#[derive(Clone)]
pub struct GroupPartitioner {
    store: Arc<LeagueStore>,
    events: Arc<NotificationDispatcher>,
}

impl GroupPartitioner {
    /// Create a new partitioner
    pub fn new(store: Arc<LeagueStore>, events: Arc<NotificationDispatcher>) -> Self {
        Self { store, events }
    }

    /// Partition a tier, replacing any unscheduled groups
    ///
    /// # Arguments
    ///
    /// * `request` - Tier, target group size, optional names and ordering
    ///
    /// # Returns
    ///
    /// * `Vec<PlayerGroup>` - New groups in order
    pub async fn partition_tier(&self, request: PartitionRequest) -> LeagueResult<Vec<PlayerGroup>> {
        if request.target_size == 0 {
            return Err(LeagueError::InvalidState(
                "target group size must be greater than 0".to_string(),
            ));
        }

        let tier_id = request.tier_id;
        let mut state = self.store.write().await;
        state.rating_tier(tier_id)?;

        if let Some(scheduled) = state.scheduled_group_of_tier(tier_id) {
            return Err(LeagueError::ScheduleLocked(scheduled));
        }

        let mut roster: Vec<EnrollmentId> = state
            .active_enrollments(tier_id)
            .iter()
            .map(|e| e.id)
            .collect();
        if roster.is_empty() {
            return Err(LeagueError::InsufficientPlayers {
                needed: 1,
                current: 0,
            });
        }

        let seed = match request.ordering {
            PartitionOrder::EnrollmentOrder => None,
            PartitionOrder::Seeded(seed) => Some(seed),
            PartitionOrder::Shuffled => Some(rand::rng().random()),
        };
        if let Some(seed) = seed {
            roster.shuffle(&mut StdRng::seed_from_u64(seed));
        }

        let chunks = partition_balanced(roster, request.target_size);
        let names: Vec<String> = if request.names.len() == chunks.len() {
            request.names.iter().map(|n| n.trim().to_string()).collect()
        } else {
            if !request.names.is_empty() {
                log::warn!(
                    "Got {} group names for {} groups in rating tier {}; using default names",
                    request.names.len(),
                    chunks.len(),
                    tier_id
                );
            }
            (0..chunks.len()).map(auto_group_name).collect()
        };

        let dissolved = state.dissolve_groups(tier_id);
        if dissolved > 0 {
            log::info!("Replacing {dissolved} unscheduled groups of rating tier {tier_id}");
        }

        let mut groups = Vec::with_capacity(chunks.len());
        let mut events = Vec::new();
        for (members, name) in chunks.into_iter().zip(names) {
            let group = PlayerGroup {
                id: state.next_id(),
                rating_tier_id: tier_id,
                name,
                members,
                phase: GroupPhase::Unscheduled,
            };

            for entry in &group.members {
                for player_id in state.enrollment(*entry)?.player_ids() {
                    events.push(LeagueEvent::JoinedGroup {
                        player_id,
                        rating_tier_id: tier_id,
                        group_id: group.id,
                        group_name: group.name.clone(),
                    });
                }
            }

            state.groups.insert(group.id, group.clone());
            groups.push(group);
        }

        state.rating_tier_mut(tier_id)?.partition_seed = seed;
        state.recompute_tier_phase(tier_id)?;
        drop(state);

        log::info!(
            "Partitioned rating tier {} into {} groups (sizes {:?})",
            tier_id,
            groups.len(),
            groups.iter().map(|g| g.members.len()).collect::<Vec<_>>()
        );
        self.events.publish_all(events);

        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrollment::{EnrollmentManager, JoinCodeGenerator, PlayerProfile, RedeemRequest};
    use crate::hierarchy::{
        CompetitionSystem, FormatType, HierarchyManager, NewFormatTier, NewLeague, NewRatingTier,
        NewSeason, RatingTier, SportType, TierPhase,
    };
    use crate::notify::MemoryNotifier;
    use chrono::NaiveDate;
    use std::time::Duration;

    struct Fixture {
        hierarchy: HierarchyManager,
        partitioner: GroupPartitioner,
        enrollment: EnrollmentManager,
        events: Arc<NotificationDispatcher>,
        inbox: MemoryNotifier,
        tier: RatingTier,
    }

    async fn fixture(players: i64) -> Fixture {
        let store = Arc::new(LeagueStore::new());
        let codes = JoinCodeGenerator::default();
        let inbox = MemoryNotifier::new();
        let events = Arc::new(NotificationDispatcher::new(
            Arc::new(inbox.clone()),
            1,
            Duration::ZERO,
        ));
        let hierarchy = HierarchyManager::new(store.clone(), codes.clone());
        let enrollment = EnrollmentManager::new(store.clone(), codes);
        let partitioner = GroupPartitioner::new(store, events.clone());

        let league = hierarchy
            .create_league(NewLeague {
                name: "Club".to_string(),
                sport: SportType::Badminton,
                owner: 1,
            })
            .await
            .unwrap();
        let season = hierarchy
            .create_season(
                league.id,
                NewSeason {
                    name: "Winter".to_string(),
                    start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
                    end_date: NaiveDate::from_ymd_opt(2026, 3, 30).unwrap(),
                },
            )
            .await
            .unwrap();
        let format = hierarchy
            .create_format_tier(
                season.id,
                NewFormatTier {
                    name: "Singles".to_string(),
                    format: FormatType::Singles,
                },
            )
            .await
            .unwrap();
        let tier = hierarchy
            .create_rating_tier(
                format.id,
                NewRatingTier {
                    name: "Open".to_string(),
                    min_rating: 0.0,
                    max_rating: 10.0,
                    capacity: 32,
                    competition: CompetitionSystem::LeagueFormat,
                    playoff_spots: None,
                },
            )
            .await
            .unwrap();

        for id in 1..=players {
            enrollment
                .redeem(RedeemRequest {
                    code: tier.join_code.to_string(),
                    player: PlayerProfile {
                        player_id: id,
                        display_name: format!("Player {id}"),
                        rating: 5.0,
                    },
                    partner: None,
                    allow_out_of_range: false,
                })
                .await
                .unwrap();
        }

        Fixture {
            hierarchy,
            partitioner,
            enrollment,
            events,
            inbox,
            tier,
        }
    }

    #[tokio::test]
    async fn test_partition_thirteen_players() {
        let f = fixture(13).await;
        let groups = f
            .partitioner
            .partition_tier(PartitionRequest::new(f.tier.id, 4))
            .await
            .unwrap();

        let sizes: Vec<usize> = groups.iter().map(|g| g.members.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3, 3]);
        assert_eq!(groups[0].name, "Group A");
        assert_eq!(groups[3].name, "Group D");

        f.events.flush().await;
        let joined = f.inbox.delivered().await;
        assert_eq!(joined.len(), 13);
        assert!(joined
            .iter()
            .all(|e| matches!(e, LeagueEvent::JoinedGroup { .. })));
    }

    #[tokio::test]
    async fn test_custom_names_used_when_count_matches() {
        let f = fixture(6).await;
        let mut request = PartitionRequest::new(f.tier.id, 3);
        request.names = vec!["Lions".to_string(), "Tigers".to_string()];
        let groups = f.partitioner.partition_tier(request).await.unwrap();
        assert_eq!(groups[0].name, "Lions");
        assert_eq!(groups[1].name, "Tigers");

        let mut request = PartitionRequest::new(f.tier.id, 3);
        request.names = vec!["Only One".to_string()];
        let groups = f.partitioner.partition_tier(request).await.unwrap();
        assert_eq!(groups[0].name, "Group A");
        assert_eq!(groups[1].name, "Group B");
    }

    #[tokio::test]
    async fn test_repartition_replaces_groups() {
        let f = fixture(8).await;
        f.partitioner
            .partition_tier(PartitionRequest::new(f.tier.id, 4))
            .await
            .unwrap();
        let groups = f
            .partitioner
            .partition_tier(PartitionRequest::new(f.tier.id, 8))
            .await
            .unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members.len(), 8);
    }

    #[tokio::test]
    async fn test_seeded_partition_is_reproducible() {
        let f = fixture(10).await;
        let mut request = PartitionRequest::new(f.tier.id, 5);
        request.ordering = PartitionOrder::Seeded(99);

        let first = f.partitioner.partition_tier(request.clone()).await.unwrap();
        let second = f.partitioner.partition_tier(request).await.unwrap();
        let members = |groups: &[PlayerGroup]| -> Vec<Vec<EnrollmentId>> {
            groups.iter().map(|g| g.members.clone()).collect()
        };
        assert_eq!(members(&first), members(&second));

        let enrolled = f.enrollment.list_enrollments(f.tier.id).await.unwrap();
        let mut all: Vec<EnrollmentId> = first.iter().flat_map(|g| g.members.clone()).collect();
        all.sort_unstable();
        let mut expected: Vec<EnrollmentId> = enrolled.iter().map(|e| e.id).collect();
        expected.sort_unstable();
        assert_eq!(all, expected);
    }

    #[tokio::test]
    async fn test_empty_tier_and_zero_size() {
        let f = fixture(0).await;
        let err = f
            .partitioner
            .partition_tier(PartitionRequest::new(f.tier.id, 4))
            .await
            .unwrap_err();
        assert!(matches!(err, LeagueError::InsufficientPlayers { .. }));

        let err = f
            .partitioner
            .partition_tier(PartitionRequest::new(f.tier.id, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, LeagueError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_tier_becomes_partitioned() {
        let f = fixture(4).await;
        f.partitioner
            .partition_tier(PartitionRequest::new(f.tier.id, 2))
            .await
            .unwrap();
        let tier = f.hierarchy.get_rating_tier(f.tier.id).await.unwrap();
        assert_eq!(tier.phase, TierPhase::Partitioned);
        assert_eq!(tier.partition_seed, None);
        assert_eq!(f.hierarchy.list_groups(f.tier.id).await.unwrap().len(), 2);

        let err = f
            .partitioner
            .partition_tier(PartitionRequest::new(999, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, LeagueError::NotFound { .. }));
    }
}
