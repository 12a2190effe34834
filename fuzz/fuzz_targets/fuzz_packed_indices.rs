//! Fuzz target for packed category indices.
//!
//! Packing must either reject an index that does not fit the format or
//! store every index so that `get`, `fill` and `remap` read it back.

#![no_main]

use arbitrary::Arbitrary;
use colgrid_core::{Format, PackedIndices};
use libfuzzer_sys::fuzz_target;

/// Cap on rows per input to keep iterations fast.
const MAX_ROWS: usize = 4096;

#[derive(Debug, Arbitrary)]
struct Input {
    format: u8,
    indices: Vec<u32>,
    mapping: Vec<u16>,
    fill_start: u16,
}

fuzz_target!(|input: Input| {
    let format = Format::ALL[usize::from(input.format) % Format::ALL.len()];
    let indices: Vec<u32> = input.indices.into_iter().take(MAX_ROWS).collect();

    let Ok(packed) = PackedIndices::from_indices(format, &indices) else {
        assert!(indices.iter().any(|&i| i as usize >= format.max_value()));
        return;
    };

    assert_eq!(packed.len(), indices.len());
    for (row, &index) in indices.iter().enumerate() {
        assert_eq!(packed.get(row), index);
    }

    let start = usize::from(input.fill_start);
    let mut target = vec![0u32; 64];
    let filled = packed.fill(&mut target, start);
    assert_eq!(filled, 64.min(indices.len().saturating_sub(start)));
    assert_eq!(&target[..filled], &indices[start.min(indices.len())..][..filled]);

    let mapping: Vec<usize> = input.mapping.into_iter().map(usize::from).collect();
    let remapped = packed.remap(&mapping);
    assert_eq!(remapped.len(), mapping.len());
    for (row, &source) in mapping.iter().enumerate() {
        let expected = indices.get(source).copied().unwrap_or(0);
        assert_eq!(remapped.get(row), expected);
    }
});
