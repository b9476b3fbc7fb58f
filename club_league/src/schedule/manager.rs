//! Schedule manager.

use super::models::{RoundRobinFormat, Schedule, ScheduleSummary};
use super::round_robin::generate_round_robin;
use crate::errors::{LeagueError, LeagueResult};
use crate::hierarchy::{GroupId, GroupPhase};
use crate::notify::{LeagueEvent, NotificationDispatcher};
use crate::store::LeagueStore;
use chrono::Utc;
use std::sync::Arc;

/// Generates and stores round-robin schedules for player groups
#[derive(Clone)]
pub struct ScheduleManager {
    store: Arc<LeagueStore>,
    events: Arc<NotificationDispatcher>,
    default_format: RoundRobinFormat,
}

impl ScheduleManager {
    /// Create a new schedule manager
    ///
    /// # Arguments
    ///
    /// * `store` - Shared league store
    /// * `events` - Notification dispatcher
    /// * `default_format` - Format used by `generate_schedule`
    pub fn new(
        store: Arc<LeagueStore>,
        events: Arc<NotificationDispatcher>,
        default_format: RoundRobinFormat,
    ) -> Self {
        Self {
            store,
            events,
            default_format,
        }
    }

    /// Generate a schedule in the configured default format
    pub async fn generate_schedule(&self, group_id: GroupId) -> LeagueResult<ScheduleSummary> {
        self.generate_schedule_with(group_id, self.default_format)
            .await
    }

    /// Generate a schedule in the given format
    ///
    /// A schedule that has not produced any matches yet is replaced; once a
    /// week has been materialized the schedule is locked.
    pub async fn generate_schedule_with(
        &self,
        group_id: GroupId,
        format: RoundRobinFormat,
    ) -> LeagueResult<ScheduleSummary> {
        let mut state = self.store.write().await;
        let group = state.group(group_id)?.clone();

        if group.members.len() < 2 {
            return Err(LeagueError::InsufficientPlayers {
                needed: 2,
                current: group.members.len(),
            });
        }

        if state.group_has_matches(group_id) {
            return Err(LeagueError::ScheduleLocked(group_id));
        }

        let weeks = generate_round_robin(&group.members, format);
        let schedule = Schedule {
            id: state.next_id(),
            group_id,
            format,
            total_weeks: weeks.len() as u32,
            matches_per_week: group.members.len() / 2,
            weeks,
            generated_at: Utc::now(),
        };
        let summary = schedule.summary();

        if state.schedules.insert(group_id, schedule).is_some() {
            log::info!("Replaced unused schedule of group {group_id}");
        }
        state.group_mut(group_id)?.phase = GroupPhase::Scheduled;
        state.recompute_tier_phase(group.rating_tier_id)?;

        let mut player_ids = Vec::new();
        for entry in &group.members {
            player_ids.extend(state.enrollment(*entry)?.player_ids());
        }
        drop(state);

        log::info!(
            "Generated {} round-robin for group {}: {} weeks, {} matches per week",
            format,
            group_id,
            summary.total_weeks,
            summary.matches_per_week
        );
        self.events.publish(LeagueEvent::ScheduleGenerated {
            group_id,
            schedule_id: summary.schedule_id,
            total_weeks: summary.total_weeks,
            player_ids,
        });

        Ok(summary)
    }

    pub async fn get_schedule(&self, group_id: GroupId) -> LeagueResult<Schedule> {
        let state = self.store.read().await;
        state.group(group_id)?;
        Ok(state.schedule(group_id)?.clone())
    }

    /// Drop a group's schedule and all its matches
    ///
    /// # Returns
    ///
    /// * `usize` - Number of matches removed
    pub async fn reset_schedule(&self, group_id: GroupId) -> LeagueResult<usize> {
        let mut state = self.store.write().await;
        let tier_id = state.group(group_id)?.rating_tier_id;
        state.schedule(group_id)?;

        let removed = state.remove_group_matches(group_id);
        state.schedules.remove(&group_id);
        state.group_mut(group_id)?.phase = GroupPhase::Unscheduled;
        state.recompute_tier_phase(tier_id)?;

        log::warn!("Reset schedule of group {group_id}, removed {removed} matches");
        Ok(removed)
    }
}
