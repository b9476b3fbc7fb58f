//! Circle-method round-robin generation.
//!
//! Slot 0 stays fixed while the remaining slots rotate one step per week.
//! Odd member counts get an empty slot; whoever is paired with it has a bye.

use super::models::{Pairing, RoundRobinFormat, WeekPlan};
use crate::enrollment::EnrollmentId;

/// Generate the weekly pairings for the given members
///
/// # Arguments
///
/// * `members` - Entries in group order
/// * `format` - Single or double round-robin
///
/// # Returns
///
/// One `WeekPlan` per week, numbered from 1. Fewer than two members yield no
/// weeks.
pub fn generate_round_robin(members: &[EnrollmentId], format: RoundRobinFormat) -> Vec<WeekPlan> {
    if members.len() < 2 {
        return Vec::new();
    }

    let mut slots: Vec<Option<EnrollmentId>> = members.iter().copied().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }

    let n = slots.len();
    let rounds = n - 1;
    let mut first_leg = Vec::with_capacity(rounds);

    for round in 0..rounds {
        let mut pairings = Vec::with_capacity(n / 2);
        let mut bye = None;

        for i in 0..n / 2 {
            match (slots[i], slots[n - 1 - i]) {
                (Some(a), Some(b)) => {
                    // Alternate sides by week so the fixed slot is not always at home
                    let pairing = if (round + i) % 2 == 0 {
                        Pairing { home: a, away: b }
                    } else {
                        Pairing { home: b, away: a }
                    };
                    pairings.push(pairing);
                }
                (Some(a), None) | (None, Some(a)) => bye = Some(a),
                (None, None) => {}
            }
        }

        first_leg.push(WeekPlan {
            week: (round + 1) as u32,
            pairings,
            bye,
        });

        slots[1..].rotate_right(1);
    }

    match format {
        RoundRobinFormat::Single => first_leg,
        RoundRobinFormat::Double => {
            let second_leg: Vec<WeekPlan> = first_leg
                .iter()
                .map(|plan| WeekPlan {
                    week: plan.week + rounds as u32,
                    pairings: plan.pairings.iter().map(|p| p.reversed()).collect(),
                    bye: plan.bye,
                })
                .collect();
            first_leg.into_iter().chain(second_leg).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn unordered_pairs(weeks: &[WeekPlan]) -> Vec<(EnrollmentId, EnrollmentId)> {
        weeks
            .iter()
            .flat_map(|w| w.pairings.iter())
            .map(|p| (p.home.min(p.away), p.home.max(p.away)))
            .collect()
    }

    #[test]
    fn test_five_members_have_five_weeks_with_byes() {
        let members = [1, 2, 3, 4, 5];
        let weeks = generate_round_robin(&members, RoundRobinFormat::Single);

        assert_eq!(weeks.len(), 5);
        for plan in &weeks {
            assert_eq!(plan.pairings.len(), 2);
            assert!(plan.bye.is_some());
        }

        let byes: HashSet<_> = weeks.iter().filter_map(|w| w.bye).collect();
        assert_eq!(byes.len(), 5);

        let pairs = unordered_pairs(&weeks);
        let distinct: HashSet<_> = pairs.iter().copied().collect();
        assert_eq!(pairs.len(), 10);
        assert_eq!(distinct.len(), 10);
    }

    #[test]
    fn test_six_members_cover_all_pairs() {
        let members = [11, 12, 13, 14, 15, 16];
        let weeks = generate_round_robin(&members, RoundRobinFormat::Single);

        assert_eq!(weeks.len(), 5);
        assert!(weeks.iter().all(|w| w.pairings.len() == 3 && w.bye.is_none()));

        let distinct: HashSet<_> = unordered_pairs(&weeks).into_iter().collect();
        assert_eq!(distinct.len(), 15);
    }

    #[test]
    fn test_each_member_plays_once_per_week() {
        let members: Vec<EnrollmentId> = (1..=8).collect();
        for plan in generate_round_robin(&members, RoundRobinFormat::Single) {
            let mut seen = HashSet::new();
            for p in &plan.pairings {
                assert!(seen.insert(p.home));
                assert!(seen.insert(p.away));
            }
            assert_eq!(seen.len(), 8);
        }
    }

    #[test]
    fn test_fixed_slot_alternates_home_and_away() {
        let members = [1, 2, 3, 4];
        let weeks = generate_round_robin(&members, RoundRobinFormat::Single);

        let sides: Vec<bool> = weeks
            .iter()
            .map(|w| w.pairings.iter().any(|p| p.home == 1))
            .collect();
        assert_eq!(sides, vec![true, false, true]);
    }

    #[test]
    fn test_week_numbers_are_sequential() {
        let weeks = generate_round_robin(&[1, 2, 3, 4], RoundRobinFormat::Single);
        let numbers: Vec<u32> = weeks.iter().map(|w| w.week).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_double_round_robin_swaps_sides() {
        let members = [1, 2, 3, 4];
        let weeks = generate_round_robin(&members, RoundRobinFormat::Double);
        assert_eq!(weeks.len(), 6);
        assert_eq!(weeks[3].week, 4);

        for (first, second) in weeks[..3].iter().zip(&weeks[3..]) {
            for (a, b) in first.pairings.iter().zip(&second.pairings) {
                assert_eq!(*a, b.reversed());
            }
        }

        let directed: HashSet<_> = weeks
            .iter()
            .flat_map(|w| w.pairings.iter().map(|p| (p.home, p.away)))
            .collect();
        assert_eq!(directed.len(), 12);
    }

    #[test]
    fn test_too_few_members() {
        assert!(generate_round_robin(&[], RoundRobinFormat::Single).is_empty());
        assert!(generate_round_robin(&[7], RoundRobinFormat::Single).is_empty());
    }

    #[test]
    fn test_two_members_single_week() {
        let weeks = generate_round_robin(&[7, 9], RoundRobinFormat::Single);
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].pairings, vec![Pairing { home: 7, away: 9 }]);
    }
}
