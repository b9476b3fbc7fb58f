/// Property-based tests for partitioning and round-robin generation
///
/// These tests check group balance and pairing coverage across a wide
/// range of roster sizes.
use club_league::grouping::{auto_group_name, partition_balanced};
use club_league::schedule::{RoundRobinFormat, generate_round_robin};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

// Roster of distinct entry ids in enrollment order
fn roster_strategy(max: usize) -> impl Strategy<Value = Vec<i64>> {
    (0..=max).prop_map(|n| (1..=n as i64).map(|id| id * 7).collect())
}

fn unordered(a: i64, b: i64) -> (i64, i64) {
    (a.min(b), a.max(b))
}

proptest! {
    #[test]
    fn test_partition_sizes_differ_by_at_most_one(
        roster in roster_strategy(200),
        target in 1usize..=16,
    ) {
        let n = roster.len();
        let groups = partition_balanced(roster, target);

        if n == 0 {
            prop_assert!(groups.is_empty());
        } else {
            prop_assert_eq!(groups.len(), n.div_ceil(target));
            let max = groups.iter().map(Vec::len).max().unwrap();
            let min = groups.iter().map(Vec::len).min().unwrap();
            prop_assert!(max - min <= 1);
            prop_assert!(max <= target);
            // Larger groups come first
            prop_assert!(groups.windows(2).all(|w| w[0].len() >= w[1].len()));
        }
    }

    #[test]
    fn test_partition_keeps_every_member_once_in_order(
        roster in roster_strategy(120),
        target in 1usize..=12,
    ) {
        let groups = partition_balanced(roster.clone(), target);
        let flattened: Vec<i64> = groups.into_iter().flatten().collect();
        prop_assert_eq!(flattened, roster);
    }

    #[test]
    fn test_round_robin_every_pair_meets_exactly_once(roster in roster_strategy(24)) {
        prop_assume!(roster.len() >= 2);
        let n = roster.len();
        let weeks = generate_round_robin(&roster, RoundRobinFormat::Single);

        let expected_weeks = if n % 2 == 0 { n - 1 } else { n };
        prop_assert_eq!(weeks.len(), expected_weeks);

        let mut seen = HashSet::new();
        for plan in &weeks {
            prop_assert_eq!(plan.pairings.len(), n / 2);
            for pairing in &plan.pairings {
                prop_assert_ne!(pairing.home, pairing.away);
                prop_assert!(seen.insert(unordered(pairing.home, pairing.away)));
            }
        }
        prop_assert_eq!(seen.len(), n * (n - 1) / 2);
    }

    #[test]
    fn test_round_robin_one_match_per_entry_per_week(roster in roster_strategy(24)) {
        prop_assume!(roster.len() >= 2);
        let weeks = generate_round_robin(&roster, RoundRobinFormat::Single);
        let mut byes: HashMap<i64, usize> = HashMap::new();

        for plan in &weeks {
            let mut busy = HashSet::new();
            for pairing in &plan.pairings {
                prop_assert!(busy.insert(pairing.home));
                prop_assert!(busy.insert(pairing.away));
            }
            match plan.bye {
                Some(idle) => {
                    prop_assert!(!busy.contains(&idle));
                    *byes.entry(idle).or_default() += 1;
                    prop_assert_eq!(busy.len() + 1, roster.len());
                }
                None => prop_assert_eq!(busy.len(), roster.len()),
            }
        }

        // Odd rosters: everyone sits out exactly once
        if roster.len() % 2 == 1 {
            prop_assert_eq!(byes.len(), roster.len());
            prop_assert!(byes.values().all(|&count| count == 1));
        }
    }

    #[test]
    fn test_double_round_robin_mirrors_first_leg(roster in roster_strategy(16)) {
        prop_assume!(roster.len() >= 2);
        let single = generate_round_robin(&roster, RoundRobinFormat::Single);
        let double = generate_round_robin(&roster, RoundRobinFormat::Double);
        prop_assert_eq!(double.len(), single.len() * 2);

        for (first, second) in double.iter().zip(double.iter().skip(single.len())) {
            prop_assert_eq!(second.week, first.week + single.len() as u32);
            for (a, b) in first.pairings.iter().zip(&second.pairings) {
                prop_assert_eq!((a.home, a.away), (b.away, b.home));
            }
        }
    }

    #[test]
    fn test_auto_group_names_are_unique(count in 1usize..=800) {
        let names: HashSet<String> = (0..count).map(auto_group_name).collect();
        prop_assert_eq!(names.len(), count);
    }
}
