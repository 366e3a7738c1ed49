use garnet_tree::{Interval, IntervalTree};
use proptest::prelude::*;

fn iv(lo: i64, hi: i64) -> Interval {
    Interval::new(lo, hi)
}

// ─── Deterministic scenarios ─────────────────────────────────────────────────

#[test]
fn textbook_overlap_scenario() {
    let tree = IntervalTree::from_iter([
        iv(16, 21),
        iv(8, 9),
        iv(25, 30),
        iv(5, 8),
        iv(0, 3),
        iv(6, 10),
        iv(15, 23),
        iv(17, 19),
        iv(19, 20),
        iv(26, 26),
    ]);

    // The minimum-low-endpoint overlap of [9, 17] is [6, 10].
    let node = tree.find_min_overlap(&iv(9, 17)).unwrap();
    assert_eq!(*tree.get(node), iv(6, 10));

    // Exact lookup distinguishes stored from merely-overlapping intervals.
    assert!(tree.find_exact(&iv(10, 12)).is_none());
    let node = tree.find_exact(&iv(6, 10)).unwrap();
    assert_eq!(*tree.get(node), iv(6, 10));

    // [10, 12] overlaps [6, 10] even though it is not stored.
    let node = tree.find_overlap(&iv(10, 12)).unwrap();
    assert_eq!(*tree.get(node), iv(6, 10));
}

#[test]
fn coincident_intervals_are_distinct_nodes() {
    let mut tree = IntervalTree::new();
    let first = tree.insert(iv(1, 5));
    let second = tree.insert(iv(1, 5));
    assert_ne!(first, second);
    assert_eq!(tree.len(), 2);

    tree.remove(first);
    assert_eq!(tree.len(), 1);
    assert!(tree.find_exact(&iv(1, 5)).is_some());
    tree.remove(second);
    assert!(tree.find_exact(&iv(1, 5)).is_none());
}

#[test]
fn exact_lookup_uses_both_endpoints() {
    let tree = IntervalTree::from_iter([iv(4, 6), iv(4, 9), iv(4, 12)]);
    for hi in [6, 9, 12] {
        let node = tree.find_exact(&iv(4, hi)).unwrap();
        assert_eq!(*tree.get(node), iv(4, hi));
    }
    assert!(tree.find_exact(&iv(4, 7)).is_none());
}

#[test]
fn touching_endpoints_count_as_overlap() {
    let mut tree = IntervalTree::new();
    tree.insert(iv(0, 5));
    assert!(tree.find_overlap(&iv(5, 9)).is_some());
    assert!(tree.find_overlap(&iv(6, 9)).is_none());
}

// ─── Randomized model tests ──────────────────────────────────────────────────

fn interval_strategy() -> impl Strategy<Value = Interval> {
    (0i64..200, 0i64..30).prop_map(|(lo, width)| Interval::new(lo, lo + width))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// `find_min_overlap` never reports a non-overlap and never misses a
    /// strictly-smaller low endpoint, per a brute-force scan.
    #[test]
    fn min_overlap_matches_brute_force(
        intervals in proptest::collection::vec(interval_strategy(), 0..128),
        queries in proptest::collection::vec(interval_strategy(), 16),
    ) {
        let tree: IntervalTree = intervals.iter().copied().collect();

        for query in &queries {
            let expected_lo = intervals.iter().filter(|i| i.overlaps(query)).map(|i| i.lo()).min();
            match tree.find_min_overlap(query) {
                Some(node) => {
                    let found = *tree.get(node);
                    prop_assert!(found.overlaps(query));
                    prop_assert_eq!(Some(found.lo()), expected_lo);
                }
                None => prop_assert_eq!(expected_lo, None),
            }
        }
    }

    /// Insert-then-remove of the same interval leaves the in-order sequence
    /// exactly where it started.
    #[test]
    fn insert_remove_round_trip(
        intervals in proptest::collection::vec(interval_strategy(), 1..64),
        extra in interval_strategy(),
    ) {
        let mut tree: IntervalTree = intervals.iter().copied().collect();
        let before: Vec<Interval> = tree.iter().copied().collect();

        let node = tree.insert(extra);
        prop_assert_eq!(tree.remove(node), extra);

        let after: Vec<Interval> = tree.iter().copied().collect();
        prop_assert_eq!(before, after);
    }
}
