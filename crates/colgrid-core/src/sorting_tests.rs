//! Tests for `sorting` module - stable permutation sorts.

use super::sorting::*;
use std::cmp::Ordering;

fn apply(data: &[f64], permutation: &[usize]) -> Vec<f64> {
    permutation.iter().map(|&i| data[i]).collect()
}

#[test]
fn test_empty_input() {
    assert!(sort_f64(&[], Order::Ascending).is_empty());
    assert!(sort_i32(&[], Order::Descending).is_empty());
    assert!(sort_by(0, Order::Ascending, |_, _| Ordering::Equal).is_empty());
}

#[test]
fn test_single_element() {
    assert_eq!(sort_f64(&[4.2], Order::Ascending), vec![0]);
    assert_eq!(sort_i32(&[7], Order::Descending), vec![0]);
}

#[test]
fn test_small_ascending() {
    let data = [3.0, 1.0, 2.0];
    assert_eq!(sort_f64(&data, Order::Ascending), vec![1, 2, 0]);
}

#[test]
fn test_small_descending() {
    let data = [3.0, 1.0, 2.0];
    assert_eq!(sort_f64(&data, Order::Descending), vec![0, 2, 1]);
}

#[test]
fn test_already_sorted_and_reversed() {
    let sorted: Vec<i32> = (0..500).collect();
    let reversed: Vec<i32> = (0..500).rev().collect();

    assert_eq!(sort_i32(&sorted, Order::Ascending), (0..500).collect::<Vec<_>>());
    assert_eq!(sort_i32(&reversed, Order::Ascending), (0..500).rev().collect::<Vec<_>>());
    assert_eq!(sort_i32(&sorted, Order::Descending), (0..500).rev().collect::<Vec<_>>());
}

#[test]
fn test_nan_sorts_last_ascending() {
    let data = [f64::NAN, 1.0, f64::INFINITY, -f64::INFINITY, f64::NAN, 0.5];

    let permutation = sort_f64(&data, Order::Ascending);

    assert_eq!(permutation, vec![3, 5, 1, 2, 0, 4]);
}

#[test]
fn test_nan_sorts_first_descending() {
    let data = [1.0, f64::NAN, f64::INFINITY, f64::NAN];

    let permutation = sort_f64(&data, Order::Descending);

    // NaNs keep their original relative order.
    assert_eq!(permutation, vec![1, 3, 2, 0]);
}

#[test]
fn test_negative_zero_before_zero() {
    let data = [0.0, -0.0, 0.0, -0.0];

    assert_eq!(sort_f64(&data, Order::Ascending), vec![1, 3, 0, 2]);
    assert_eq!(sort_f64(&data, Order::Descending), vec![0, 2, 1, 3]);
}

#[test]
fn test_compare_f64_total_order() {
    assert_eq!(compare_f64(-0.0, 0.0), Ordering::Less);
    assert_eq!(compare_f64(f64::NAN, f64::INFINITY), Ordering::Greater);
    assert_eq!(compare_f64(f64::NAN, -f64::NAN), Ordering::Equal);
    assert_eq!(compare_f64(1.0, 1.0), Ordering::Equal);
    assert_eq!(compare_f64(-1.0, 2.0), Ordering::Less);
}

#[test]
fn test_descending_is_not_reversed_ascending() {
    // Ties must keep their input order in both directions.
    let data = [1, 2, 1, 2, 1];

    assert_eq!(sort_i32(&data, Order::Ascending), vec![0, 2, 4, 1, 3]);
    assert_eq!(sort_i32(&data, Order::Descending), vec![1, 3, 0, 2, 4]);
}

#[test]
fn test_stability_large_input() {
    // Exercises the merge path with many ties.
    let data: Vec<i64> = (0..10_000).map(|i| (i * 7_919) % 13).collect();

    for order in [Order::Ascending, Order::Descending] {
        let permutation = sort_i64(&data, order);
        for pair in permutation.windows(2) {
            let (a, b) = (data[pair[0]], data[pair[1]]);
            match order {
                Order::Ascending => assert!(a <= b),
                Order::Descending => assert!(a >= b),
            }
            if a == b {
                assert!(pair[0] < pair[1], "ties out of order: {pair:?}");
            }
        }
    }
}

#[test]
fn test_sort_by_strings() {
    let data = ["pear", "apple", "fig", "apple"];

    let permutation = sort_by(data.len(), Order::Ascending, |a, b| data[a].cmp(data[b]));

    assert_eq!(permutation, vec![1, 3, 2, 0]);
}

#[test]
fn test_doubles_large_with_specials() {
    let mut data: Vec<f64> = (0..1_000).map(|i| f64::from((i * 31) % 97) - 48.0).collect();
    data[10] = f64::NAN;
    data[500] = -0.0;
    data[900] = f64::NEG_INFINITY;

    let sorted = apply(&data, &sort_f64(&data, Order::Ascending));

    assert_eq!(sorted[0], f64::NEG_INFINITY);
    assert!(sorted[999].is_nan());
    for pair in sorted.windows(2) {
        assert_ne!(compare_f64(pair[0], pair[1]), Ordering::Greater);
    }
}

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn is_permutation(permutation: &[usize], len: usize) -> bool {
        let mut seen = vec![false; len];
        permutation.len() == len
            && permutation
                .iter()
                .all(|&i| i < len && !std::mem::replace(&mut seen[i], true))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        /// Property: the permutation orders the data and keeps ties stable.
        #[test]
        fn prop_i32_sorted_and_stable(data in proptest::collection::vec(-20i32..20, 0..300)) {
            for order in [Order::Ascending, Order::Descending] {
                let permutation = sort_i32(&data, order);
                prop_assert!(is_permutation(&permutation, data.len()));
                for pair in permutation.windows(2) {
                    let (a, b) = (data[pair[0]], data[pair[1]]);
                    match order {
                        Order::Ascending => prop_assert!(a <= b),
                        Order::Descending => prop_assert!(a >= b),
                    }
                    if a == b {
                        prop_assert!(pair[0] < pair[1]);
                    }
                }
            }
        }

        /// Property: the double sort agrees with `compare_f64` and is stable.
        #[test]
        fn prop_f64_sorted_and_stable(
            data in proptest::collection::vec(
                prop_oneof![
                    (-5i32..5).prop_map(f64::from),
                    Just(f64::NAN),
                    Just(-0.0),
                    Just(f64::INFINITY),
                ],
                0..300,
            )
        ) {
            for order in [Order::Ascending, Order::Descending] {
                let permutation = sort_f64(&data, order);
                prop_assert!(is_permutation(&permutation, data.len()));
                for pair in permutation.windows(2) {
                    let cmp = compare_f64(data[pair[0]], data[pair[1]]);
                    match order {
                        Order::Ascending => prop_assert_ne!(cmp, Ordering::Greater),
                        Order::Descending => prop_assert_ne!(cmp, Ordering::Less),
                    }
                    if cmp == Ordering::Equal {
                        prop_assert!(pair[0] < pair[1]);
                    }
                }
            }
        }
    }
}
