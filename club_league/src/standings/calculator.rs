//! Standings derivation from completed matches.

use crate::enrollment::EnrollmentId;
use crate::matches::{Match, MatchSide, MatchStatus};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Points awarded per match outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsPolicy {
    pub win: u32,
    pub loss: u32,
}

impl Default for PointsPolicy {
    fn default() -> Self {
        Self { win: 2, loss: 1 }
    }
}

/// One line of a standings table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingRow {
    /// 1-based position
    pub rank: usize,
    pub entry: EnrollmentId,
    pub display_name: String,
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    pub points: u64,
    pub score_for: u64,
    pub score_against: u64,
    pub differential: i64,
}

/// Compute ranked standings
///
/// Only completed matches count. Rows are ordered by points, then by wins
/// in matches between the tied entries, then by score differential, then
/// by display name and finally by entry id.
///
/// # Arguments
///
/// * `entries` - Group members with their display names
/// * `matches` - Matches of the group (any status)
/// * `policy` - Points per win and per loss
pub fn compute_standings<'a, I>(
    entries: &[(EnrollmentId, String)],
    matches: I,
    policy: PointsPolicy,
) -> Vec<StandingRow>
where
    I: IntoIterator<Item = &'a Match>,
{
    let mut rows: HashMap<EnrollmentId, StandingRow> = entries
        .iter()
        .map(|(entry, name)| {
            (
                *entry,
                StandingRow {
                    rank: 0,
                    entry: *entry,
                    display_name: name.clone(),
                    played: 0,
                    wins: 0,
                    losses: 0,
                    points: 0,
                    score_for: 0,
                    score_against: 0,
                    differential: 0,
                },
            )
        })
        .collect();

    // (winner, loser) of every counted match
    let mut outcomes: Vec<(EnrollmentId, EnrollmentId)> = Vec::new();

    for m in matches {
        if m.status != MatchStatus::Completed {
            continue;
        }
        let (Some(result), Some(winner), Some(loser)) = (m.result, m.winner_entry(), m.loser_entry())
        else {
            continue;
        };
        if !rows.contains_key(&winner) || !rows.contains_key(&loser) {
            log::warn!("Match {} involves an entry outside the group; skipped", m.id);
            continue;
        }

        outcomes.push((winner, loser));
        for (entry, side, won) in [
            (m.home, MatchSide::Home, result.winner == MatchSide::Home),
            (m.away, MatchSide::Away, result.winner == MatchSide::Away),
        ] {
            if let Some(row) = rows.get_mut(&entry) {
                row.played += 1;
                if won {
                    row.wins += 1;
                    row.points = row.points.saturating_add(u64::from(policy.win));
                } else {
                    row.losses += 1;
                    row.points = row.points.saturating_add(u64::from(policy.loss));
                }
                if let Some((scored, conceded)) = result.scores_for(side) {
                    row.score_for = row.score_for.saturating_add(u64::from(scored));
                    row.score_against = row.score_against.saturating_add(u64::from(conceded));
                }
            }
        }
    }

    let mut table: Vec<StandingRow> = rows
        .into_values()
        .map(|mut row| {
            let score_for = i64::try_from(row.score_for).unwrap_or(i64::MAX);
            let score_against = i64::try_from(row.score_against).unwrap_or(i64::MAX);
            row.differential = score_for.saturating_sub(score_against);
            row
        })
        .collect();
    table.sort_by(|a, b| b.points.cmp(&a.points).then(a.entry.cmp(&b.entry)));

    // Break ties within each cluster of equal points
    let mut start = 0;
    while start < table.len() {
        let points = table[start].points;
        let end = table[start..]
            .iter()
            .position(|row| row.points != points)
            .map_or(table.len(), |offset| start + offset);

        if end - start > 1 {
            let cluster: HashSet<EnrollmentId> = table[start..end].iter().map(|r| r.entry).collect();
            let mut head_to_head: HashMap<EnrollmentId, u32> = HashMap::new();
            for (winner, loser) in &outcomes {
                if cluster.contains(winner) && cluster.contains(loser) {
                    *head_to_head.entry(*winner).or_default() += 1;
                }
            }

            table[start..end].sort_by(|a, b| {
                let h2h_a = head_to_head.get(&a.entry).copied().unwrap_or(0);
                let h2h_b = head_to_head.get(&b.entry).copied().unwrap_or(0);
                h2h_b
                    .cmp(&h2h_a)
                    .then_with(|| b.differential.cmp(&a.differential))
                    .then_with(|| compare_names(&a.display_name, &b.display_name))
                    .then_with(|| a.entry.cmp(&b.entry))
            });
        }

        start = end;
    }

    for (index, row) in table.iter_mut().enumerate() {
        row.rank = index + 1;
    }

    table
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::FormatType;
    use crate::matches::MatchResult;
    use chrono::{NaiveDate, Utc};

    fn entries(names: &[(EnrollmentId, &str)]) -> Vec<(EnrollmentId, String)> {
        names.iter().map(|(id, n)| (*id, n.to_string())).collect()
    }

    fn completed(id: i64, home: EnrollmentId, away: EnrollmentId, result: MatchResult) -> Match {
        Match {
            id,
            group_id: 1,
            week: 1,
            home,
            away,
            home_players: vec![home],
            away_players: vec![away],
            format: FormatType::Singles,
            status: MatchStatus::Completed,
            result: Some(result),
            cancel_reason: None,
            scheduled_for: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn order(table: &[StandingRow]) -> Vec<EnrollmentId> {
        table.iter().map(|r| r.entry).collect()
    }

    #[test]
    fn test_points_and_ranks() {
        let players = entries(&[(1, "Ana"), (2, "Ben"), (3, "Cleo")]);
        let matches = vec![
            completed(10, 1, 2, MatchResult::winner(MatchSide::Home)),
            completed(11, 1, 3, MatchResult::winner(MatchSide::Home)),
            completed(12, 2, 3, MatchResult::winner(MatchSide::Away)),
        ];

        let table = compute_standings(&players, &matches, PointsPolicy::default());
        assert_eq!(order(&table), vec![1, 3, 2]);
        assert_eq!(table[0].points, 4);
        assert_eq!(table[0].wins, 2);
        assert_eq!(table[1].points, 3);
        assert_eq!(table[2].points, 2);
        assert_eq!(table[2].losses, 2);
        assert_eq!(
            table.iter().map(|r| r.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_only_completed_matches_count() {
        let players = entries(&[(1, "Ana"), (2, "Ben")]);
        let mut cancelled = completed(10, 1, 2, MatchResult::winner(MatchSide::Home));
        cancelled.status = MatchStatus::Cancelled;
        let mut scheduled = completed(11, 1, 2, MatchResult::winner(MatchSide::Home));
        scheduled.status = MatchStatus::Scheduled;
        scheduled.result = None;

        let table = compute_standings(&players, [&cancelled, &scheduled], PointsPolicy::default());
        assert!(table.iter().all(|r| r.played == 0 && r.points == 0));
        // No matches: ordered by name
        assert_eq!(order(&table), vec![1, 2]);
    }

    #[test]
    fn test_head_to_head_breaks_tie() {
        // Ana beats Ben, Ben beats Cleo, Cleo beats Dev, Dev beats Ana,
        // Ben beats Dev, Ana beats Cleo. Ana and Ben finish on equal points.
        let players = entries(&[(1, "Ana"), (2, "Ben"), (3, "Cleo"), (4, "Dev")]);
        let matches = vec![
            completed(10, 1, 2, MatchResult::winner(MatchSide::Home)),
            completed(11, 2, 3, MatchResult::winner(MatchSide::Home)),
            completed(12, 3, 4, MatchResult::winner(MatchSide::Home)),
            completed(13, 4, 1, MatchResult::winner(MatchSide::Home)),
            completed(14, 2, 4, MatchResult::winner(MatchSide::Home)),
            completed(15, 1, 3, MatchResult::winner(MatchSide::Home)),
        ];

        let table = compute_standings(&players, &matches, PointsPolicy::default());
        assert_eq!(table[0].points, table[1].points);
        assert_eq!(order(&table)[..2], [1, 2]);
    }

    #[test]
    fn test_differential_breaks_tie_without_head_to_head() {
        let players = entries(&[(1, "Ana"), (2, "Ben"), (3, "Cleo"), (4, "Dev")]);
        let matches = vec![
            completed(10, 1, 3, MatchResult::scored(6, 4).unwrap()),
            completed(11, 2, 4, MatchResult::scored(6, 0).unwrap()),
        ];

        let table = compute_standings(&players, &matches, PointsPolicy::default());
        assert_eq!(order(&table), vec![2, 1, 3, 4]);
        assert_eq!(table[0].differential, 6);
        assert_eq!(table[1].differential, 2);
        assert_eq!(table[3].score_against, 6);
    }

    #[test]
    fn test_name_then_id_break_full_ties() {
        let players = entries(&[(9, "Zoe"), (3, "amy"), (5, "Amy")]);
        let table = compute_standings(&players, &Vec::<Match>::new(), PointsPolicy::default());
        assert_eq!(order(&table), vec![5, 3, 9]);
    }

    #[test]
    fn test_extreme_scores_accumulate_without_overflow() {
        let players = entries(&[(1, "Ana"), (2, "Ben")]);
        let matches = vec![
            completed(10, 1, 2, MatchResult::scored(u32::MAX, 0).unwrap()),
            completed(11, 1, 2, MatchResult::scored(u32::MAX, 0).unwrap()),
        ];
        let policy = PointsPolicy {
            win: u32::MAX,
            loss: u32::MAX,
        };

        let table = compute_standings(&players, &matches, policy);
        assert_eq!(order(&table), vec![1, 2]);
        assert_eq!(table[0].score_for, 2 * u64::from(u32::MAX));
        assert_eq!(table[0].points, 2 * u64::from(u32::MAX));
        assert_eq!(table[0].differential, 2 * i64::from(u32::MAX));
        assert_eq!(table[1].differential, -2 * i64::from(u32::MAX));
    }

    #[test]
    fn test_custom_points_policy() {
        let players = entries(&[(1, "Ana"), (2, "Ben")]);
        let matches = vec![completed(10, 1, 2, MatchResult::winner(MatchSide::Away))];
        let table = compute_standings(&players, &matches, PointsPolicy { win: 3, loss: 0 });
        assert_eq!(order(&table), vec![2, 1]);
        assert_eq!(table[0].points, 3);
        assert_eq!(table[1].points, 0);
    }
}
