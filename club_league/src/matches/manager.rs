//! Match lifecycle manager.

use super::models::{Match, MatchId, MatchResult, MatchStatus, MaterializePolicy};
use crate::errors::{LeagueError, LeagueResult};
use crate::hierarchy::{GroupId, GroupPhase};
use crate::notify::{LeagueEvent, NotificationDispatcher};
use crate::store::LeagueStore;
use chrono::{Days, Utc};
use std::sync::Arc;

/// Creates matches from schedules and drives their state machine
#[derive(Clone)]
pub struct MatchManager {
    store: Arc<LeagueStore>,
    events: Arc<NotificationDispatcher>,
    policy: MaterializePolicy,
}

impl MatchManager {
    /// Create a new match manager
    pub fn new(
        store: Arc<LeagueStore>,
        events: Arc<NotificationDispatcher>,
        policy: MaterializePolicy,
    ) -> Self {
        Self {
            store,
            events,
            policy,
        }
    }

    /// Create the matches of one scheduled week
    ///
    /// Byes are skipped. A week that already has matches is either returned
    /// as-is (lenient policy) or refused with `AlreadyMaterialized` (strict).
    ///
    /// # Arguments
    ///
    /// * `group_id` - Group whose schedule is used
    /// * `week` - 1-based week number
    ///
    /// # Returns
    ///
    /// * `Vec<Match>` - Matches of the week, in pairing order
    pub async fn materialize_week(&self, group_id: GroupId, week: u32) -> LeagueResult<Vec<Match>> {
        let mut state = self.store.write().await;
        let group = state.group(group_id)?.clone();
        let schedule = state.schedule(group_id)?;

        let plan = schedule.week(week).cloned().ok_or_else(|| {
            LeagueError::InvalidState(format!(
                "week {week} is outside 1..={} for group {group_id}",
                schedule.total_weeks
            ))
        })?;

        let existing: Vec<Match> = state
            .matches_of_group(group_id)
            .into_iter()
            .filter(|m| m.week == week)
            .cloned()
            .collect();
        if !existing.is_empty() {
            return match self.policy {
                MaterializePolicy::Lenient => {
                    log::debug!("Week {week} of group {group_id} already materialized");
                    Ok(existing)
                }
                MaterializePolicy::Strict => {
                    Err(LeagueError::AlreadyMaterialized { group_id, week })
                }
            };
        }

        let season = state.season_of_group(group_id)?;
        let scheduled_for = season
            .start_date
            .checked_add_days(Days::new(7 * u64::from(week - 1)))
            .ok_or_else(|| {
                LeagueError::InvalidState(format!("week {week} falls outside the calendar"))
            })?;
        let format = state.format_of_tier(group.rating_tier_id)?;

        let mut created = Vec::with_capacity(plan.pairings.len());
        for pairing in &plan.pairings {
            if let Some(id) = state.match_for_key(group_id, week, pairing.home, pairing.away) {
                log::debug!("Match {id} already exists for week {week} of group {group_id}");
                continue;
            }

            let now = Utc::now();
            let m = Match {
                id: state.next_id(),
                group_id,
                week,
                home: pairing.home,
                away: pairing.away,
                home_players: state.enrollment(pairing.home)?.player_ids(),
                away_players: state.enrollment(pairing.away)?.player_ids(),
                format,
                status: MatchStatus::Scheduled,
                result: None,
                cancel_reason: None,
                scheduled_for,
                created_at: now,
                updated_at: now,
            };
            state.insert_match(m.clone())?;
            created.push(m);
        }

        state.group_mut(group_id)?.phase = GroupPhase::Active;
        state.recompute_tier_phase(group.rating_tier_id)?;
        drop(state);

        log::info!(
            "Materialized week {} of group {}: {} matches on {}",
            week,
            group_id,
            created.len(),
            scheduled_for
        );
        self.events.publish_all(created.iter().map(|m| LeagueEvent::MatchCreated {
            match_id: m.id,
            group_id,
            week,
            scheduled_for: m.scheduled_for,
            player_ids: m.home_players.iter().chain(&m.away_players).copied().collect(),
        }));

        Ok(created)
    }

    /// Scheduled → InProgress
    pub async fn start_match(&self, match_id: MatchId) -> LeagueResult<Match> {
        let mut state = self.store.write().await;
        let m = state.match_mut(match_id)?;
        m.status = m.status.transition(MatchStatus::InProgress)?;
        m.updated_at = Utc::now();

        log::info!("Match {match_id} started");
        Ok(m.clone())
    }

    /// Complete a match with its result
    pub async fn record_result(&self, match_id: MatchId, result: MatchResult) -> LeagueResult<Match> {
        result.validate()?;

        let mut state = self.store.write().await;
        let m = state.match_mut(match_id)?;
        m.status = m.status.transition(MatchStatus::Completed)?;
        m.result = Some(result);
        m.updated_at = Utc::now();
        let m = m.clone();
        drop(state);

        let winner = m.entry(result.winner);
        log::info!(
            "Recorded result for match {} (week {}, group {}): entry {} won",
            m.id,
            m.week,
            m.group_id,
            winner
        );
        self.events.publish(LeagueEvent::ResultRecorded {
            match_id: m.id,
            group_id: m.group_id,
            winner,
            player_ids: m.home_players.iter().chain(&m.away_players).copied().collect(),
        });

        Ok(m)
    }

    /// Cancel a match; cancelled matches never count in standings
    pub async fn cancel_match(&self, match_id: MatchId, reason: &str) -> LeagueResult<Match> {
        let mut state = self.store.write().await;
        let m = state.match_mut(match_id)?;
        m.status = m.status.transition(MatchStatus::Cancelled)?;
        let reason = reason.trim();
        m.cancel_reason = (!reason.is_empty()).then(|| reason.to_string());
        m.updated_at = Utc::now();

        log::info!("Match {match_id} cancelled: {reason}");
        Ok(m.clone())
    }

    pub async fn get_match(&self, match_id: MatchId) -> LeagueResult<Match> {
        Ok(self.store.read().await.match_record(match_id)?.clone())
    }

    /// Matches of a group, optionally limited to one week
    pub async fn list_matches(&self, group_id: GroupId, week: Option<u32>) -> LeagueResult<Vec<Match>> {
        let state = self.store.read().await;
        state.group(group_id)?;
        Ok(state
            .matches_of_group(group_id)
            .into_iter()
            .filter(|m| week.is_none_or(|w| m.week == w))
            .cloned()
            .collect())
    }
}
