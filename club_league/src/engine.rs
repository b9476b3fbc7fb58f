//! Wiring of all managers around one shared store.

use crate::config::EngineConfig;
use crate::enrollment::{EnrollmentManager, JoinCodeGenerator};
use crate::errors::LeagueResult;
use crate::grouping::GroupPartitioner;
use crate::hierarchy::HierarchyManager;
use crate::matches::MatchManager;
use crate::notify::{NotificationDispatcher, Notifier};
use crate::schedule::ScheduleManager;
use crate::standings::StandingsManager;
use crate::store::LeagueStore;
use std::sync::Arc;

/// All league managers sharing one store and one dispatcher
#[derive(Clone)]
pub struct LeagueEngine {
    pub store: Arc<LeagueStore>,
    pub events: Arc<NotificationDispatcher>,
    pub hierarchy: HierarchyManager,
    pub enrollment: EnrollmentManager,
    pub partitioner: GroupPartitioner,
    pub schedules: ScheduleManager,
    pub matches: MatchManager,
    pub standings: StandingsManager,
}

impl LeagueEngine {
    /// Build an engine over an empty store
    ///
    /// # Arguments
    ///
    /// * `config` - Engine configuration (validated here)
    /// * `notifier` - Delivery transport for league events
    pub fn new(config: &EngineConfig, notifier: Arc<dyn Notifier>) -> LeagueResult<Self> {
        Self::with_store(config, notifier, Arc::new(LeagueStore::new()))
    }

    /// Build an engine over an existing store (e.g. one restored from a snapshot)
    pub fn with_store(
        config: &EngineConfig,
        notifier: Arc<dyn Notifier>,
        store: Arc<LeagueStore>,
    ) -> LeagueResult<Self> {
        config.validate()?;

        let codes = JoinCodeGenerator::new(config.join_code_length, config.join_code_retries);
        let events = Arc::new(NotificationDispatcher::from_config(notifier, config));

        Ok(Self {
            hierarchy: HierarchyManager::new(store.clone(), codes.clone()),
            enrollment: EnrollmentManager::new(store.clone(), codes),
            partitioner: GroupPartitioner::new(store.clone(), events.clone()),
            schedules: ScheduleManager::new(store.clone(), events.clone(), config.round_robin),
            matches: MatchManager::new(store.clone(), events.clone(), config.materialize_policy),
            standings: StandingsManager::new(store.clone(), config.points),
            store,
            events,
        })
    }
}
