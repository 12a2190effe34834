//! Fuzz target for the double sort.
//!
//! The result must be a permutation of the rows, ordered by `compare_f64`
//! and stable for equal values.

#![no_main]

use colgrid_core::sorting::{compare_f64, sort_f64};
use colgrid_core::Order;
use libfuzzer_sys::fuzz_target;
use std::cmp::Ordering;

fuzz_target!(|data: (bool, Vec<f64>)| {
    let (descending, values) = data;
    let order = if descending {
        Order::Descending
    } else {
        Order::Ascending
    };

    let permutation = sort_f64(&values, order);

    let mut seen = vec![false; values.len()];
    for &row in &permutation {
        assert!(!seen[row], "row {row} appears twice");
        seen[row] = true;
    }
    assert!(seen.iter().all(|&s| s));

    for pair in permutation.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let cmp = compare_f64(values[a], values[b]);
        let expected = if descending {
            Ordering::Less
        } else {
            Ordering::Greater
        };
        assert_ne!(cmp, expected, "rows {a} and {b} out of order");
        if cmp == Ordering::Equal {
            assert!(a < b, "rows {a} and {b} not stable");
        }
    }
});
