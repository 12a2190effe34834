//! Tests for `packing` module - fixed-width category index storage.

use super::packing::*;

#[test]
fn test_format_capacity() {
    assert_eq!(Format::UnsignedInt2.max_value(), 4);
    assert_eq!(Format::UnsignedInt4.max_value(), 16);
    assert_eq!(Format::UnsignedInt8.max_value(), 256);
    assert_eq!(Format::UnsignedInt16.max_value(), 65_536);
    assert_eq!(Format::SignedInt32.max_value(), i32::MAX as usize);
    assert_eq!(Format::UnsignedInt2.max_categories(), 3);
}

#[test]
fn test_minimal_format() {
    assert_eq!(Format::minimal_for(0).unwrap(), Format::UnsignedInt2);
    assert_eq!(Format::minimal_for(3).unwrap(), Format::UnsignedInt2);
    assert_eq!(Format::minimal_for(4).unwrap(), Format::UnsignedInt4);
    assert_eq!(Format::minimal_for(255).unwrap(), Format::UnsignedInt8);
    assert_eq!(Format::minimal_for(256).unwrap(), Format::UnsignedInt16);
    assert_eq!(Format::minimal_for(70_000).unwrap(), Format::SignedInt32);
    assert!(Format::minimal_for(usize::MAX).is_err());
}

#[test]
fn test_u2_layout_is_index_ordered() {
    let mut bytes = vec![0u8; 1];
    write_u2(&mut bytes, 0, 1);
    write_u2(&mut bytes, 1, 2);
    write_u2(&mut bytes, 2, 3);
    write_u2(&mut bytes, 3, 0);
    assert_eq!(bytes[0], 0b00_11_10_01);
}

#[test]
fn test_u4_layout_is_index_ordered() {
    let mut bytes = vec![0u8; 1];
    write_u4(&mut bytes, 0, 0xA);
    write_u4(&mut bytes, 1, 0x5);
    assert_eq!(bytes[0], 0x5A);
}

#[test]
fn test_overwrite_keeps_neighbours() {
    let mut bytes = vec![0xFFu8; 2];
    write_u2(&mut bytes, 5, 0);
    assert_eq!(read_u2(&bytes, 4), 3);
    assert_eq!(read_u2(&bytes, 5), 0);
    assert_eq!(read_u2(&bytes, 6), 3);

    write_u4(&mut bytes, 0, 7);
    assert_eq!(read_u4(&bytes, 0), 7);
    assert_eq!(read_u4(&bytes, 1), 0xF);
}

#[test]
fn test_u8_and_u16_are_unsigned() {
    let mut bytes = vec![0u8; 2];
    write_u8(&mut bytes, 1, 255);
    assert_eq!(read_u8(&bytes, 1), 255);
    assert_eq!(read_u16(&[u16::MAX], 0), 65_535);
}

#[test]
fn test_packed_len() {
    assert_eq!(packed_len(0, 2), 0);
    assert_eq!(packed_len(5, 2), 2);
    assert_eq!(packed_len(5, 4), 3);
}

#[test]
fn test_packed_indices_from_indices() {
    let indices = [0, 1, 2, 3, 2, 1];
    for format in Format::ALL {
        let packed = PackedIndices::from_indices(format, &indices).unwrap();
        assert_eq!(packed.format(), format);
        assert_eq!(packed.len(), indices.len());
        for (row, &expected) in indices.iter().enumerate() {
            assert_eq!(packed.get(row), expected, "format {format:?} row {row}");
        }
    }
}

#[test]
fn test_packed_indices_rejects_wide_values() {
    let result = PackedIndices::from_indices(Format::UnsignedInt2, &[0, 4]);
    assert!(result.is_err());
}

#[test]
fn test_packed_indices_fill_partial() {
    let packed = PackedIndices::from_indices(Format::UnsignedInt4, &[1, 2, 3, 4, 5]).unwrap();
    let mut target = [0u32; 4];

    let copied = packed.fill(&mut target, 3);

    assert_eq!(copied, 2);
    assert_eq!(&target[..2], &[4, 5]);
}

#[test]
fn test_packed_indices_remap_with_holes() {
    let packed = PackedIndices::from_indices(Format::UnsignedInt8, &[7, 8, 9]).unwrap();

    let remapped = packed.remap(&[2, 0, 10]);

    assert_eq!(remapped.len(), 3);
    assert_eq!(remapped.get(0), 9);
    assert_eq!(remapped.get(1), 7);
    assert_eq!(remapped.get(2), 0);
}

#[test]
fn test_atomic_indices_snapshot() {
    for format in Format::ALL {
        let atomic = AtomicIndices::new(format, 9);
        for row in 0..9 {
            atomic.store(row, (row % 4) as u32);
        }
        atomic.store(4, 1);

        let packed = atomic.snapshot();

        assert_eq!(atomic.len(), 9);
        assert_eq!(packed.format(), format);
        assert_eq!(packed.get(4), 1);
        assert_eq!(atomic.load(7), 3);
        assert_eq!(packed.get(8), 0);
    }
}

#[test]
fn test_atomic_sub_byte_concurrent_neighbours() {
    // Rows sharing a byte are written from different threads.
    let atomic = AtomicIndices::new(Format::UnsignedInt2, 4_000);
    std::thread::scope(|scope| {
        for t in 0..4usize {
            let atomic = &atomic;
            scope.spawn(move || {
                for row in (t..4_000).step_by(4) {
                    atomic.store(row, (t as u32 % 3) + 1);
                }
            });
        }
    });

    for row in 0..4_000 {
        assert_eq!(atomic.load(row), (row as u32 % 4 % 3) + 1);
    }
}

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Property: reading back a written 2-bit value returns it unchanged.
        #[test]
        fn prop_u2_roundtrip(values in proptest::collection::vec(0u8..4, 1..200)) {
            let mut bytes = vec![0u8; packed_len(values.len(), 2)];
            for (i, &v) in values.iter().enumerate() {
                write_u2(&mut bytes, i, v);
            }
            for (i, &v) in values.iter().enumerate() {
                prop_assert_eq!(read_u2(&bytes, i), v);
            }
        }

        /// Property: reading back a written 4-bit value returns it unchanged.
        #[test]
        fn prop_u4_roundtrip(values in proptest::collection::vec(0u8..16, 1..200)) {
            let mut bytes = vec![0u8; packed_len(values.len(), 4)];
            for (i, &v) in values.iter().enumerate() {
                write_u4(&mut bytes, i, v);
            }
            for (i, &v) in values.iter().enumerate() {
                prop_assert_eq!(read_u4(&bytes, i), v);
            }
        }
    }
}
