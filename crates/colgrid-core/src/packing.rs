//! Fixed-width integer packing for category indices.
//!
//! Category indices are small non-negative integers. Depending on the number
//! of distinct categories they are stored with 2, 4, 8, 16 or 32 bits:
//!
//! ```text
//! UnsignedInt2   4 indices per byte   [i0 i1 i2 i3] -> bits 0-1, 2-3, 4-5, 6-7
//! UnsignedInt4   2 indices per byte   [i0 i1]       -> bits 0-3, 4-7
//! UnsignedInt8   1 index per byte
//! UnsignedInt16  u16 per index
//! SignedInt32    i32 per index
//! ```
//!
//! The sub-byte helpers do not check the written value against the width;
//! callers guarantee `value < 2^K`. Index 0 always means "missing".

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI32, AtomicU16, AtomicU8, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Integer packing width of a categorical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// 2 bits per index, at most 3 categories.
    UnsignedInt2,
    /// 4 bits per index, at most 15 categories.
    UnsignedInt4,
    /// 8 bits per index, at most 255 categories.
    UnsignedInt8,
    /// 16 bits per index, at most 65535 categories.
    UnsignedInt16,
    /// 32 bit signed index, effectively unbounded.
    SignedInt32,
}

impl Format {
    /// All formats ordered from narrowest to widest.
    pub const ALL: [Format; 5] = [
        Self::UnsignedInt2,
        Self::UnsignedInt4,
        Self::UnsignedInt8,
        Self::UnsignedInt16,
        Self::SignedInt32,
    ];

    /// Storage width in bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::UnsignedInt2 => 2,
            Self::UnsignedInt4 => 4,
            Self::UnsignedInt8 => 8,
            Self::UnsignedInt16 => 16,
            Self::SignedInt32 => 32,
        }
    }

    /// Number of representable index values, including the missing index 0.
    #[must_use]
    pub const fn max_value(self) -> usize {
        match self {
            Self::UnsignedInt2 => 4,
            Self::UnsignedInt4 => 16,
            Self::UnsignedInt8 => 256,
            Self::UnsignedInt16 => 65_536,
            Self::SignedInt32 => i32::MAX as usize,
        }
    }

    /// Maximum number of distinct non-missing categories.
    #[must_use]
    pub const fn max_categories(self) -> usize {
        self.max_value() - 1
    }

    /// Returns the narrowest format able to hold `categories` distinct values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if no format is wide enough.
    pub fn minimal_for(categories: usize) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|format| categories <= format.max_categories())
            .ok_or_else(|| {
                Error::InvalidArgument(format!("{categories} categories exceed every format"))
            })
    }
}

#[inline]
const fn sub_byte_slot(index: usize, bits: u32) -> (usize, u32) {
    let per_byte = (8 / bits) as usize;
    (index / per_byte, (index % per_byte) as u32 * bits)
}

#[inline]
const fn sub_byte_merge(old: u8, value: u8, shift: u32, bits: u32) -> u8 {
    let mask = ((1u16 << bits) - 1) as u8;
    (old & !(mask << shift)) | ((value & mask) << shift)
}

/// Number of bytes needed to pack `len` indices of a sub-byte format.
#[must_use]
pub const fn packed_len(len: usize, bits: u32) -> usize {
    let per_byte = (8 / bits) as usize;
    len.div_ceil(per_byte)
}

/// Reads the 2-bit value at `index`.
#[inline]
#[must_use]
pub fn read_u2(bytes: &[u8], index: usize) -> u8 {
    let (byte, shift) = sub_byte_slot(index, 2);
    (bytes[byte] >> shift) & 0b11
}

/// Writes the 2-bit value at `index`. `value` must be smaller than 4.
#[inline]
pub fn write_u2(bytes: &mut [u8], index: usize, value: u8) {
    let (byte, shift) = sub_byte_slot(index, 2);
    bytes[byte] = sub_byte_merge(bytes[byte], value, shift, 2);
}

/// Reads the 4-bit value at `index`.
#[inline]
#[must_use]
pub fn read_u4(bytes: &[u8], index: usize) -> u8 {
    let (byte, shift) = sub_byte_slot(index, 4);
    (bytes[byte] >> shift) & 0b1111
}

/// Writes the 4-bit value at `index`. `value` must be smaller than 16.
#[inline]
pub fn write_u4(bytes: &mut [u8], index: usize, value: u8) {
    let (byte, shift) = sub_byte_slot(index, 4);
    bytes[byte] = sub_byte_merge(bytes[byte], value, shift, 4);
}

/// Reads the byte at `index`.
#[inline]
#[must_use]
pub fn read_u8(bytes: &[u8], index: usize) -> u8 {
    bytes[index]
}

/// Writes the byte at `index`.
#[inline]
pub fn write_u8(bytes: &mut [u8], index: usize, value: u8) {
    bytes[index] = value;
}

/// Reads the 16-bit value at `index` zero-extended.
#[inline]
#[must_use]
pub fn read_u16(values: &[u16], index: usize) -> u32 {
    u32::from(values[index])
}

/// Immutable packed category indices backing a categorical column.
#[derive(Debug, Clone)]
pub enum PackedIndices {
    /// Four indices per byte.
    UnsignedInt2 {
        /// Packed bytes.
        bytes: Arc<[u8]>,
        /// Number of indices.
        len: usize,
    },
    /// Two indices per byte.
    UnsignedInt4 {
        /// Packed bytes.
        bytes: Arc<[u8]>,
        /// Number of indices.
        len: usize,
    },
    /// One index per byte.
    UnsignedInt8(Arc<[u8]>),
    /// One `u16` per index.
    UnsignedInt16(Arc<[u16]>),
    /// One `i32` per index.
    SignedInt32(Arc<[i32]>),
}

impl PackedIndices {
    /// Packs `indices` with the given format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if an index does not fit the format.
    pub fn from_indices(format: Format, indices: &[u32]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= format.max_value()) {
            return Err(Error::InvalidArgument(format!(
                "index {bad} does not fit format {format:?}"
            )));
        }
        Ok(Self::pack_unchecked(format, indices))
    }

    fn pack_unchecked(format: Format, indices: &[u32]) -> Self {
        let len = indices.len();
        match format {
            Format::UnsignedInt2 => {
                let mut bytes = vec![0u8; packed_len(len, 2)];
                for (i, &v) in indices.iter().enumerate() {
                    write_u2(&mut bytes, i, v as u8);
                }
                Self::UnsignedInt2 {
                    bytes: bytes.into(),
                    len,
                }
            }
            Format::UnsignedInt4 => {
                let mut bytes = vec![0u8; packed_len(len, 4)];
                for (i, &v) in indices.iter().enumerate() {
                    write_u4(&mut bytes, i, v as u8);
                }
                Self::UnsignedInt4 {
                    bytes: bytes.into(),
                    len,
                }
            }
            Format::UnsignedInt8 => Self::UnsignedInt8(indices.iter().map(|&v| v as u8).collect()),
            Format::UnsignedInt16 => {
                Self::UnsignedInt16(indices.iter().map(|&v| v as u16).collect())
            }
            Format::SignedInt32 => Self::SignedInt32(indices.iter().map(|&v| v as i32).collect()),
        }
    }

    /// Returns the packing format.
    #[must_use]
    pub fn format(&self) -> Format {
        match self {
            Self::UnsignedInt2 { .. } => Format::UnsignedInt2,
            Self::UnsignedInt4 { .. } => Format::UnsignedInt4,
            Self::UnsignedInt8(_) => Format::UnsignedInt8,
            Self::UnsignedInt16(_) => Format::UnsignedInt16,
            Self::SignedInt32(_) => Format::SignedInt32,
        }
    }

    /// Number of stored indices.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::UnsignedInt2 { len, .. } | Self::UnsignedInt4 { len, .. } => *len,
            Self::UnsignedInt8(v) => v.len(),
            Self::UnsignedInt16(v) => v.len(),
            Self::SignedInt32(v) => v.len(),
        }
    }

    /// Returns true if no indices are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the index at `row`. Panics if `row` is out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, row: usize) -> u32 {
        match self {
            Self::UnsignedInt2 { bytes, .. } => u32::from(read_u2(bytes, row)),
            Self::UnsignedInt4 { bytes, .. } => u32::from(read_u4(bytes, row)),
            Self::UnsignedInt8(v) => u32::from(read_u8(v, row)),
            Self::UnsignedInt16(v) => read_u16(v, row),
            Self::SignedInt32(v) => v[row] as u32,
        }
    }

    /// Copies indices starting at `start` into `target`.
    ///
    /// Copies `min(target.len(), len - start)` values and returns that count.
    pub fn fill(&self, target: &mut [u32], start: usize) -> usize {
        let count = target.len().min(self.len().saturating_sub(start));
        if count == 0 {
            return 0;
        }
        match self {
            Self::UnsignedInt16(v) => {
                for (t, &s) in target.iter_mut().zip(&v[start..start + count]) {
                    *t = u32::from(s);
                }
            }
            Self::SignedInt32(v) => {
                for (t, &s) in target.iter_mut().zip(&v[start..start + count]) {
                    *t = s as u32;
                }
            }
            _ => {
                for (offset, t) in target.iter_mut().take(count).enumerate() {
                    *t = self.get(start + offset);
                }
            }
        }
        count
    }

    /// Builds new indices where row `i` holds the index at `mapping[i]`.
    ///
    /// Mapping entries beyond the stored length produce the missing index 0.
    #[must_use]
    pub fn remap(&self, mapping: &[usize]) -> Self {
        let len = self.len();
        let remapped: Vec<u32> = mapping
            .iter()
            .map(|&row| if row < len { self.get(row) } else { 0 })
            .collect();
        Self::pack_unchecked(self.format(), &remapped)
    }
}

/// Mutable packed indices that tolerate concurrent writes to different rows.
///
/// Sub-byte formats share bytes between neighbouring rows, so every store is
/// a read-modify-write on an atomic byte.
#[derive(Debug)]
pub(crate) enum AtomicIndices {
    SubByte {
        bits: u32,
        bytes: Box<[AtomicU8]>,
        len: usize,
    },
    UnsignedInt8(Box<[AtomicU8]>),
    UnsignedInt16(Box<[AtomicU16]>),
    SignedInt32(Box<[AtomicI32]>),
}

impl AtomicIndices {
    pub(crate) fn new(format: Format, len: usize) -> Self {
        match format {
            Format::UnsignedInt2 | Format::UnsignedInt4 => {
                let bits = format.bits();
                Self::SubByte {
                    bits,
                    bytes: (0..packed_len(len, bits)).map(|_| AtomicU8::new(0)).collect(),
                    len,
                }
            }
            Format::UnsignedInt8 => Self::UnsignedInt8((0..len).map(|_| AtomicU8::new(0)).collect()),
            Format::UnsignedInt16 => {
                Self::UnsignedInt16((0..len).map(|_| AtomicU16::new(0)).collect())
            }
            Format::SignedInt32 => Self::SignedInt32((0..len).map(|_| AtomicI32::new(0)).collect()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::SubByte { len, .. } => *len,
            Self::UnsignedInt8(v) => v.len(),
            Self::UnsignedInt16(v) => v.len(),
            Self::SignedInt32(v) => v.len(),
        }
    }

    /// Stores `value` at `row`; the caller checked bounds and width.
    pub(crate) fn store(&self, row: usize, value: u32) {
        match self {
            Self::SubByte { bits, bytes, .. } => {
                let (byte, shift) = sub_byte_slot(row, *bits);
                // The closure never returns None, so the update cannot fail.
                let _ = bytes[byte].fetch_update(Ordering::Relaxed, Ordering::Relaxed, |old| {
                    Some(sub_byte_merge(old, value as u8, shift, *bits))
                });
            }
            Self::UnsignedInt8(v) => v[row].store(value as u8, Ordering::Relaxed),
            Self::UnsignedInt16(v) => v[row].store(value as u16, Ordering::Relaxed),
            Self::SignedInt32(v) => v[row].store(value as i32, Ordering::Relaxed),
        }
    }

    pub(crate) fn load(&self, row: usize) -> u32 {
        match self {
            Self::SubByte { bits, bytes, .. } => {
                let (byte, shift) = sub_byte_slot(row, *bits);
                let mask = ((1u16 << *bits) - 1) as u8;
                u32::from((bytes[byte].load(Ordering::Relaxed) >> shift) & mask)
            }
            Self::UnsignedInt8(v) => u32::from(v[row].load(Ordering::Relaxed)),
            Self::UnsignedInt16(v) => u32::from(v[row].load(Ordering::Relaxed)),
            Self::SignedInt32(v) => v[row].load(Ordering::Relaxed) as u32,
        }
    }

    /// Copies the current contents into immutable packed indices.
    pub(crate) fn snapshot(&self) -> PackedIndices {
        match self {
            Self::SubByte { bits, bytes, len } => {
                let bytes: Arc<[u8]> = bytes.iter().map(|b| b.load(Ordering::Acquire)).collect();
                if *bits == 2 {
                    PackedIndices::UnsignedInt2 { bytes, len: *len }
                } else {
                    PackedIndices::UnsignedInt4 { bytes, len: *len }
                }
            }
            Self::UnsignedInt8(v) => {
                PackedIndices::UnsignedInt8(v.iter().map(|b| b.load(Ordering::Acquire)).collect())
            }
            Self::UnsignedInt16(v) => {
                PackedIndices::UnsignedInt16(v.iter().map(|b| b.load(Ordering::Acquire)).collect())
            }
            Self::SignedInt32(v) => {
                PackedIndices::SignedInt32(v.iter().map(|b| b.load(Ordering::Acquire)).collect())
            }
        }
    }
}
