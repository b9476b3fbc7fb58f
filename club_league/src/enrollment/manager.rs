//! Enrollment manager: join-code redemption and withdrawals.

use super::join_code::JoinCodeGenerator;
use super::models::{
    Enrollment, EnrollmentId, EnrollmentOutcome, EnrollmentStatus, EnrollmentWarning, JoinCode,
    PlayerProfile, RedeemRequest,
};
use crate::errors::{EntityKind, LeagueError, LeagueResult};
use crate::hierarchy::{FormatType, RatingTier, RatingTierId, TierPhase};
use crate::store::{LeagueStore, StoreState};
use chrono::Utc;
use std::sync::Arc;

/// Enrollment manager
#[derive(Clone)]
pub struct EnrollmentManager {
    store: Arc<LeagueStore>,
    codes: JoinCodeGenerator,
}

impl EnrollmentManager {
    /// Create a new enrollment manager
    pub fn new(store: Arc<LeagueStore>, codes: JoinCodeGenerator) -> Self {
        Self { store, codes }
    }

    /// Redeem a join code
    ///
    /// The whole check-then-insert sequence runs under the store's write lock,
    /// so concurrent redemptions can never oversell a tier.
    ///
    /// # Arguments
    ///
    /// * `request` - Code, player, optional partner and range override
    ///
    /// # Returns
    ///
    /// * `EnrollmentOutcome` - The new enrollment, the tier after the change
    ///   and any warnings
    pub async fn redeem(&self, request: RedeemRequest) -> LeagueResult<EnrollmentOutcome> {
        let code = JoinCode::normalize(&request.code);
        validate_profile(&request.player)?;
        if let Some(partner) = &request.partner {
            validate_profile(partner)?;
        }

        let mut state = self.store.write().await;

        let tier_id = state
            .tier_for_code(&code)
            .ok_or_else(|| LeagueError::CodeNotFound(code.to_string()))?;
        let tier = state.rating_tier(tier_id)?.clone();

        if !tier.phase.accepts_enrollment() {
            return Err(LeagueError::EnrollmentClosed(tier_id));
        }

        check_partner_rules(state.format_of_tier(tier_id)?, &request)?;

        let mut warnings = Vec::new();
        let mut admitted_by_override = false;
        for profile in std::iter::once(&request.player).chain(request.partner.as_ref()) {
            if tier.rating_in_range(profile.rating) {
                continue;
            }

            if !request.allow_out_of_range {
                return Err(LeagueError::RatingOutOfRange {
                    player_id: profile.player_id,
                    rating: profile.rating,
                    min: tier.min_rating,
                    max: tier.max_rating,
                });
            }

            log::warn!(
                "Admitting player {} with rating {} outside [{}, {}] of tier {} by override",
                profile.player_id,
                profile.rating,
                tier.min_rating,
                tier.max_rating,
                tier_id
            );
            admitted_by_override = true;
            warnings.push(EnrollmentWarning::RatingOutOfRange {
                player_id: profile.player_id,
                rating: profile.rating,
                min: tier.min_rating,
                max: tier.max_rating,
            });
        }

        let active = state.active_enrollments(tier_id);
        for profile in std::iter::once(&request.player).chain(request.partner.as_ref()) {
            if active.iter().any(|e| e.involves(profile.player_id)) {
                return Err(LeagueError::AlreadyEnrolled {
                    player_id: profile.player_id,
                    tier_id,
                });
            }
        }

        if active.len() >= tier.capacity {
            return Err(LeagueError::CapacityExceeded {
                tier_id,
                capacity: tier.capacity,
            });
        }

        if let Some(warning) = reopen_tier(&mut state, &tier)? {
            warnings.push(warning);
        }

        let enrollment = Enrollment {
            id: state.next_id(),
            rating_tier_id: tier_id,
            player: request.player,
            partner: request.partner,
            status: EnrollmentStatus::Active,
            admitted_by_override,
            sequence: state.next_sequence(),
            enrolled_at: Utc::now(),
        };
        state.enrollments.insert(enrollment.id, enrollment.clone());
        let tier = state.rating_tier(tier_id)?.clone();

        log::info!(
            "Enrolled {} in rating tier {} ({}/{})",
            enrollment.display_name(),
            tier_id,
            state.active_enrollments(tier_id).len(),
            tier.capacity
        );

        Ok(EnrollmentOutcome {
            enrollment,
            tier,
            warnings,
        })
    }

    /// Withdraw an active enrollment while the tier is still open
    pub async fn withdraw(&self, enrollment_id: EnrollmentId) -> LeagueResult<Enrollment> {
        let mut state = self.store.write().await;

        let enrollment = state.enrollment(enrollment_id)?.clone();
        if !enrollment.is_active() {
            return Err(LeagueError::InvalidState(format!(
                "enrollment {enrollment_id} is already withdrawn"
            )));
        }

        let tier = state.rating_tier(enrollment.rating_tier_id)?.clone();
        if !tier.phase.accepts_enrollment() {
            return Err(LeagueError::EnrollmentClosed(tier.id));
        }

        reopen_tier(&mut state, &tier)?;

        let stored = state
            .enrollments
            .get_mut(&enrollment_id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Enrollment, enrollment_id))?;
        stored.status = EnrollmentStatus::Withdrawn;

        log::info!(
            "Withdrew {} from rating tier {}",
            stored.display_name(),
            tier.id
        );
        Ok(stored.clone())
    }

    pub async fn get_enrollment(&self, enrollment_id: EnrollmentId) -> LeagueResult<Enrollment> {
        Ok(self.store.read().await.enrollment(enrollment_id)?.clone())
    }

    /// Active enrollments of a tier in creation order
    pub async fn list_enrollments(&self, tier_id: RatingTierId) -> LeagueResult<Vec<Enrollment>> {
        let state = self.store.read().await;
        state.rating_tier(tier_id)?;
        Ok(state
            .active_enrollments(tier_id)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Replace a tier's join code; the old code stops working immediately
    pub async fn rotate_join_code(&self, tier_id: RatingTierId) -> LeagueResult<RatingTier> {
        let mut state = self.store.write().await;
        state.rating_tier(tier_id)?;

        let code = self.codes.issue(|c| state.code_in_use(c))?;
        state.bind_join_code(tier_id, code)?;

        log::info!("Rotated join code of rating tier {tier_id}");
        Ok(state.rating_tier(tier_id)?.clone())
    }
}

fn validate_profile(profile: &PlayerProfile) -> LeagueResult<()> {
    if profile.display_name.trim().is_empty() {
        return Err(LeagueError::InvalidState(format!(
            "player {} has an empty display name",
            profile.player_id
        )));
    }
    if !profile.rating.is_finite() {
        return Err(LeagueError::InvalidState(format!(
            "player {} has an invalid rating",
            profile.player_id
        )));
    }
    Ok(())
}

fn check_partner_rules(format: FormatType, request: &RedeemRequest) -> LeagueResult<()> {
    match (format, &request.partner) {
        (FormatType::Singles, Some(_)) => Err(LeagueError::InvalidState(
            "singles tiers do not take a partner".to_string(),
        )),
        (FormatType::Doubles, None) => Err(LeagueError::InvalidState(
            "doubles tiers require a partner".to_string(),
        )),
        (FormatType::Doubles, Some(partner)) if partner.player_id == request.player.player_id => {
            Err(LeagueError::InvalidState(
                "a player cannot partner themselves".to_string(),
            ))
        }
        _ => Ok(()),
    }
}

/// Dissolve unscheduled groups so every active enrollment stays in exactly
/// one group (or none) after the roster changes
fn reopen_tier(
    state: &mut StoreState,
    tier: &RatingTier,
) -> LeagueResult<Option<EnrollmentWarning>> {
    if tier.phase != TierPhase::Partitioned {
        return Ok(None);
    }

    let count = state.dissolve_groups(tier.id);
    state.recompute_tier_phase(tier.id)?;
    log::warn!(
        "Roster of rating tier {} changed after partitioning; dissolved {} groups",
        tier.id,
        count
    );
    Ok(Some(EnrollmentWarning::GroupsDissolved { count }))
}
