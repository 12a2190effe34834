//! Stable permutation sorts.
//!
//! The sorts never move data. They return a permutation `p` such that
//! `data[p[0]], data[p[1]], ...` is ordered, keeping equal elements in their
//! original relative order for both directions.
//!
//! Short ranges are sorted with binary insertion sort, longer ranges with a
//! top-down merge sort that alternates between the permutation and an
//! auxiliary index array.
//!
//! Doubles use a total order: `-0.0` sorts before `0.0` and every NaN sorts
//! after `+Infinity` in ascending order (and before everything descending).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ranges shorter than this are sorted by binary insertion.
const INSERTION_SORT_THRESHOLD: usize = 32;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    /// Smallest value first.
    #[default]
    Ascending,
    /// Largest value first.
    Descending,
}

/// Total order on doubles used by the double sort.
///
/// Agrees with `<` and `>` on ordinary values, orders `-0.0` before `0.0`
/// and treats all NaNs as equal and greater than `+Infinity`.
#[must_use]
pub fn compare_f64(a: f64, b: f64) -> Ordering {
    if a < b {
        Ordering::Less
    } else if a > b {
        Ordering::Greater
    } else {
        canonical_bits(a).cmp(&canonical_bits(b))
    }
}

#[inline]
fn canonical_bits(value: f64) -> i64 {
    if value.is_nan() {
        f64::NAN.to_bits() as i64
    } else {
        value.to_bits() as i64
    }
}

/// Returns the stable sort permutation of `data`.
#[must_use]
pub fn sort_f64(data: &[f64], order: Order) -> Vec<usize> {
    match order {
        Order::Ascending => permutation_sort(data.len(), &|a: usize, b: usize| {
            compare_f64(data[a], data[b]) == Ordering::Less
        }),
        Order::Descending => permutation_sort(data.len(), &|a: usize, b: usize| {
            compare_f64(data[a], data[b]) == Ordering::Greater
        }),
    }
}

/// Returns the stable sort permutation of `data`.
#[must_use]
pub fn sort_i32(data: &[i32], order: Order) -> Vec<usize> {
    match order {
        Order::Ascending => permutation_sort(data.len(), &|a: usize, b: usize| data[a] < data[b]),
        Order::Descending => permutation_sort(data.len(), &|a: usize, b: usize| data[a] > data[b]),
    }
}

/// Returns the stable sort permutation of `data`.
#[must_use]
pub fn sort_i64(data: &[i64], order: Order) -> Vec<usize> {
    match order {
        Order::Ascending => permutation_sort(data.len(), &|a: usize, b: usize| data[a] < data[b]),
        Order::Descending => permutation_sort(data.len(), &|a: usize, b: usize| data[a] > data[b]),
    }
}

/// Returns the stable sort permutation of `len` elements compared by row.
///
/// `compare(a, b)` compares the elements at rows `a` and `b` in ascending
/// order; the descending sort uses the same comparator reversed.
#[must_use]
pub fn sort_by<F>(len: usize, order: Order, compare: F) -> Vec<usize>
where
    F: Fn(usize, usize) -> Ordering,
{
    match order {
        Order::Ascending => {
            permutation_sort(len, &|a: usize, b: usize| compare(a, b) == Ordering::Less)
        }
        Order::Descending => {
            permutation_sort(len, &|a: usize, b: usize| compare(a, b) == Ordering::Greater)
        }
    }
}

/// Sorts the identity permutation of `len` rows.
///
/// `precedes(a, b)` must be a strict order: true only if row `a` has to be
/// placed before row `b`.
fn permutation_sort<P>(len: usize, precedes: &P) -> Vec<usize>
where
    P: Fn(usize, usize) -> bool,
{
    let mut permutation: Vec<usize> = (0..len).collect();
    if len > 1 {
        let mut aux = permutation.clone();
        merge_sort(&mut aux, &mut permutation, 0, len, precedes);
    }
    permutation
}

/// Sorts `dest[low..high]`, using `src[low..high]` (same contents) as scratch.
fn merge_sort<P>(src: &mut [usize], dest: &mut [usize], low: usize, high: usize, precedes: &P)
where
    P: Fn(usize, usize) -> bool,
{
    let length = high - low;
    if length < INSERTION_SORT_THRESHOLD {
        binary_insertion_sort(dest, low, high, precedes);
        return;
    }

    let mid = low + length / 2;
    merge_sort(dest, src, low, mid, precedes);
    merge_sort(dest, src, mid, high, precedes);

    // Halves already in order: plain copy.
    if !precedes(src[mid], src[mid - 1]) {
        dest[low..high].copy_from_slice(&src[low..high]);
        return;
    }

    let (mut left, mut right) = (low, mid);
    for slot in &mut dest[low..high] {
        // Take from the right half only if it strictly precedes, for stability.
        if right >= high || (left < mid && !precedes(src[right], src[left])) {
            *slot = src[left];
            left += 1;
        } else {
            *slot = src[right];
            right += 1;
        }
    }
}

fn binary_insertion_sort<P>(rows: &mut [usize], low: usize, high: usize, precedes: &P)
where
    P: Fn(usize, usize) -> bool,
{
    for i in (low + 1)..high {
        let pivot = rows[i];
        // Upper bound: insert after every element the pivot does not precede.
        let (mut left, mut right) = (low, i);
        while left < right {
            let mid = left + (right - left) / 2;
            if precedes(pivot, rows[mid]) {
                right = mid;
            } else {
                left = mid + 1;
            }
        }
        rows[left..=i].rotate_right(1);
    }
}
