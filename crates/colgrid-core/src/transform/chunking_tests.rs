//! Tests for `chunking` - row range partitioning.

use super::chunking::*;
use proptest::prelude::*;

#[test]
fn test_zero_rows_need_no_chunks() {
    assert_eq!(chunk_count(0, 8, Workload::Huge), 0);
    assert!(chunk_bounds(0, 0).is_empty());
}

#[test]
fn test_small_inputs_use_one_chunk() {
    assert_eq!(chunk_count(75, 16, Workload::Default), 1);
    assert_eq!(chunk_count(1, 1, Workload::Small), 1);
}

#[test]
fn test_chunks_capped_by_parallelism() {
    assert_eq!(chunk_count(1_000_000, 4, Workload::Default), 8);
    assert_eq!(chunk_count(1_000_000, 4, Workload::Huge), 64);
    assert_eq!(chunk_count(1_000_000, 0, Workload::Small), 1);
}

#[test]
fn test_heavier_workloads_use_more_chunks() {
    let rows = 10_000;
    let counts: Vec<usize> = [
        Workload::Small,
        Workload::Default,
        Workload::Medium,
        Workload::Large,
        Workload::Huge,
    ]
    .into_iter()
    .map(|w| chunk_count(rows, 8, w))
    .collect();

    assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{counts:?}");
}

#[test]
fn test_bounds_balanced() {
    assert_eq!(chunk_bounds(10, 3), vec![(0, 4), (4, 7), (7, 10)]);
    assert_eq!(chunk_bounds(4, 4), vec![(0, 1), (1, 2), (2, 3), (3, 4)]);
}

#[test]
fn test_workload_parses_snake_case() {
    #[derive(serde::Deserialize)]
    struct Wrapper {
        workload: Workload,
    }

    let parsed: Wrapper = toml::from_str("workload = \"huge\"").unwrap();

    assert_eq!(parsed.workload, Workload::Huge);
    assert!(toml::from_str::<Wrapper>("workload = \"enormous\"").is_err());
}

proptest! {
    #[test]
    fn prop_bounds_cover_rows(rows in 0usize..10_000, chunks in 1usize..64) {
        let bounds = chunk_bounds(rows, chunks);

        prop_assert_eq!(bounds.len(), chunks);
        prop_assert_eq!(bounds.first().map(|b| b.0), Some(0));
        prop_assert_eq!(bounds.last().map(|b| b.1), Some(rows));
        for pair in bounds.windows(2) {
            prop_assert_eq!(pair[0].1, pair[1].0);
        }
        let sizes: Vec<usize> = bounds.iter().map(|(s, e)| e - s).collect();
        let min = sizes.iter().min().copied().unwrap_or(0);
        let max = sizes.iter().max().copied().unwrap_or(0);
        prop_assert!(max - min <= 1);
    }

    #[test]
    fn prop_chunk_count_in_range(rows in 1usize..1_000_000, parallelism in 1usize..64) {
        let chunks = chunk_count(rows, parallelism, Workload::Default);

        prop_assert!(chunks >= 1);
        prop_assert!(chunks <= rows);
        prop_assert!(chunks <= parallelism * Workload::Default.chunks_per_worker());
    }
}
