//! Balanced partitioning of an ordered roster.

/// Split `items` into groups of roughly `target_size`
///
/// The group count is `ceil(N / target_size)`. Sizes differ by at most one:
/// the first `N mod g` groups get one extra member. Members are taken
/// contiguously in input order.
///
/// # Arguments
///
/// * `items` - Roster in the order it should be dealt
/// * `target_size` - Desired group size (0 yields no groups)
///
/// # Returns
///
/// * `Vec<Vec<T>>` - Groups in order, empty when there is nothing to split
pub fn partition_balanced<T>(items: Vec<T>, target_size: usize) -> Vec<Vec<T>> {
    let n = items.len();
    if n == 0 || target_size == 0 {
        return Vec::new();
    }

    let group_count = n.div_ceil(target_size);
    let base = n / group_count;
    let larger = n % group_count;

    let mut groups = Vec::with_capacity(group_count);
    let mut rest = items.into_iter();
    for index in 0..group_count {
        let size = if index < larger { base + 1 } else { base };
        groups.push(rest.by_ref().take(size).collect());
    }

    groups
}

/// Default name of the group at `index` ("Group A" … "Group Z", "Group AA", …)
pub fn auto_group_name(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();

    format!("Group {}", String::from_utf8_lossy(&letters))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes<T>(groups: &[Vec<T>]) -> Vec<usize> {
        groups.iter().map(Vec::len).collect()
    }

    #[test]
    fn test_thirteen_by_four() {
        let groups = partition_balanced((1..=13).collect(), 4);
        assert_eq!(sizes(&groups), vec![4, 3, 3, 3]);
        assert_eq!(groups[0], vec![1, 2, 3, 4]);
        assert_eq!(groups[3], vec![11, 12, 13]);
    }

    #[test]
    fn test_even_split() {
        let groups = partition_balanced((1..=12).collect(), 4);
        assert_eq!(sizes(&groups), vec![4, 4, 4]);
    }

    #[test]
    fn test_fewer_than_target() {
        let groups = partition_balanced(vec!['a', 'b', 'c'], 8);
        assert_eq!(groups, vec![vec!['a', 'b', 'c']]);
    }

    #[test]
    fn test_nine_by_four_stays_balanced() {
        // ceil(9/4) = 3 groups of 3 rather than 4/4/1
        let groups = partition_balanced((1..=9).collect(), 4);
        assert_eq!(sizes(&groups), vec![3, 3, 3]);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(partition_balanced(Vec::<i64>::new(), 4).is_empty());
        assert!(partition_balanced(vec![1, 2], 0).is_empty());
    }

    #[test]
    fn test_auto_group_names() {
        assert_eq!(auto_group_name(0), "Group A");
        assert_eq!(auto_group_name(25), "Group Z");
        assert_eq!(auto_group_name(26), "Group AA");
        assert_eq!(auto_group_name(27), "Group AB");
        assert_eq!(auto_group_name(52), "Group BA");
    }
}
