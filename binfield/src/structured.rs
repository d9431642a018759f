// Copyright 2026 Anapaya Systems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Structured overlay of a field pattern on a data engine.
//!
//! A [`StructuredEngine`] partitions an engine's bytes into fields according
//! to a flat byte-width pattern supplied at assignment time. The pattern is
//! compiled into an offset table once, so every field access is a constant
//! amount of index arithmetic.
//!
//! All accessors validate before touching anything: a failed assignment
//! leaves the previous state intact, reads that miss return `None`, and
//! writes that cannot land report a typed error.

use std::fmt;

use zerocopy::{Immutable, IntoBytes};

use crate::{
    engine::{DataEngine, EngineError},
    policy::{BitMode, Endianness, bit_address, byte_address},
    scalar::FieldScalar,
};

/// Errors raised while adopting a field pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// The pattern holds no entries.
    #[error("pattern is empty")]
    Empty,
    /// The pattern exceeds the supported number of fields.
    #[error("pattern has {len} entries, limit is 65535")]
    TooLong {
        /// Number of entries supplied.
        len: usize,
    },
    /// A pattern entry has zero width.
    #[error("pattern entry {index} has zero width")]
    ZeroWidth {
        /// Offending entry.
        index: usize,
    },
    /// The pattern does not cover the source region exactly.
    #[error("pattern covers {expected} bytes, source has {actual}")]
    LengthMismatch {
        /// Sum of the pattern widths.
        expected: usize,
        /// Length of the source region.
        actual: usize,
    },
    /// The underlying engine rejected the source region.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Errors raised by field-level writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The field index lies outside the pattern.
    #[error("field {index} out of range ({count} fields)")]
    OutOfRange {
        /// Requested field.
        index: usize,
        /// Number of fields in the pattern.
        count: usize,
    },
    /// The value width does not match the field width.
    #[error("value width {width} does not match field width {expected}")]
    WidthMismatch {
        /// Width of the value type in bytes.
        width: usize,
        /// Width of the field in bytes.
        expected: usize,
    },
    /// The bit index lies outside the field.
    #[error("bit {bit} out of range for a {len}-bit field")]
    BitOutOfRange {
        /// Requested bit.
        bit: usize,
        /// Field length in bits.
        len: usize,
    },
    /// The engine's bytes are borrowed through a shared reference.
    #[error("engine buffer is not writable")]
    ReadOnly,
}

/// A width pattern overlaid on a data engine.
///
/// The engine is in one of three states: *empty* (no pattern), *armed-owned*
/// (owns a copy of the source) or *armed-referenced* (borrows the source).
/// `sum(pattern) == length_bytes()` holds in every armed state.
pub struct StructuredEngine<'a> {
    engine: DataEngine<'a>,
    pattern: Vec<u16>,
    offsets: Vec<usize>,
}

fn compile_pattern(pattern: &[u16], data_len: usize) -> Result<(Vec<u16>, Vec<usize>), PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }
    if pattern.len() > u16::MAX as usize {
        return Err(PatternError::TooLong { len: pattern.len() });
    }
    let mut offsets = Vec::with_capacity(pattern.len());
    let mut total = 0usize;
    for (index, &width) in pattern.iter().enumerate() {
        if width == 0 {
            return Err(PatternError::ZeroWidth { index });
        }
        offsets.push(total);
        total += width as usize;
    }
    if total != data_len {
        return Err(PatternError::LengthMismatch {
            expected: total,
            actual: data_len,
        });
    }
    Ok((pattern.to_vec(), offsets))
}

impl<'a> StructuredEngine<'a> {
    /// Creates an empty structured engine with the given policy.
    pub fn new(endian: Endianness, mode: BitMode) -> Self {
        Self {
            engine: DataEngine::new(endian, mode),
            pattern: Vec::new(),
            offsets: Vec::new(),
        }
    }

    /// Adopts `pattern` over an owned copy of `src`. The previous state is
    /// kept on failure.
    pub fn assign_data(&mut self, src: &[u8], pattern: &[u16]) -> Result<(), PatternError> {
        let (pattern, offsets) = compile_pattern(pattern, src.len())?;
        let mut engine = DataEngine::new(self.engine.endian(), self.engine.mode());
        engine.assign_data(src)?;
        self.engine = engine;
        self.pattern = pattern;
        self.offsets = offsets;
        tracing::trace!(
            fields = self.pattern.len(),
            bytes = src.len(),
            "adopted owned data"
        );
        Ok(())
    }

    /// Adopts `pattern` over an owned copy of the bytes of `value`.
    pub fn assign_value<T: IntoBytes + Immutable + ?Sized>(
        &mut self,
        value: &T,
        pattern: &[u16],
    ) -> Result<(), PatternError> {
        self.assign_data(value.as_bytes(), pattern)
    }

    /// Adopts `pattern` over a read-only borrow of `src`. Field writes on
    /// the resulting engine fail with [`FieldError::ReadOnly`].
    pub fn assign_ref(&mut self, src: &'a [u8], pattern: &[u16]) -> Result<(), PatternError> {
        let (pattern, offsets) = compile_pattern(pattern, src.len())?;
        let mut engine = DataEngine::new(self.engine.endian(), self.engine.mode());
        engine.assign_ref(src)?;
        self.engine = engine;
        self.pattern = pattern;
        self.offsets = offsets;
        tracing::trace!(
            fields = self.pattern.len(),
            bytes = src.len(),
            "adopted referenced data"
        );
        Ok(())
    }

    /// Adopts `pattern` over a writable borrow of `src`; field writes land
    /// in the caller's memory.
    pub fn assign_mut(&mut self, src: &'a mut [u8], pattern: &[u16]) -> Result<(), PatternError> {
        let (pattern, offsets) = compile_pattern(pattern, src.len())?;
        let mut engine = DataEngine::new(self.engine.endian(), self.engine.mode());
        engine.assign_mut(src)?;
        self.engine = engine;
        self.pattern = pattern;
        self.offsets = offsets;
        tracing::trace!(
            fields = self.pattern.len(),
            "adopted writable referenced data"
        );
        Ok(())
    }

    /// Returns to the empty state, keeping the policy tags.
    pub fn clear(&mut self) {
        self.engine = DataEngine::new(self.engine.endian(), self.engine.mode());
        self.pattern.clear();
        self.offsets.clear();
    }

    /// Number of fields in the pattern.
    pub fn field_count(&self) -> usize {
        self.pattern.len()
    }

    /// Width of field `index` in bytes; `None` when out of range.
    pub fn field_length(&self, index: usize) -> Option<u16> {
        self.pattern.get(index).copied()
    }

    /// The underlying data engine.
    pub fn data(&self) -> &DataEngine<'a> {
        &self.engine
    }

    fn field_range(&self, index: usize) -> Option<std::ops::Range<usize>> {
        let width = *self.pattern.get(index)? as usize;
        let start = self.offsets[index];
        Some(start..start + width)
    }

    /// Typed read of field `index`, assembled in the engine's endian order.
    /// `None` unless `T::WIDTH` equals the field width.
    pub fn field_value<T: FieldScalar>(&self, index: usize) -> Option<T> {
        let range = self.field_range(index)?;
        if T::WIDTH != range.len() {
            return None;
        }
        let bytes = &self.engine.as_slice()[range];
        let endian = self.engine.endian();
        let mut staged = 0u128;
        for logical in 0..bytes.len() {
            staged = (staged << 8) | u128::from(bytes[byte_address(endian, bytes.len(), logical)]);
        }
        Some(T::from_stream(staged))
    }

    /// Owned engine holding a copy of field `index` under the requested
    /// target tags. When the target endianness differs from the engine's,
    /// the copied bytes are reversed so the field keeps its value under the
    /// new label.
    pub fn field(
        &self,
        index: usize,
        endian: Endianness,
        mode: BitMode,
    ) -> Option<DataEngine<'static>> {
        let range = self.field_range(index)?;
        let endian = endian.resolved();
        let mut bytes = self.engine.as_slice()[range].to_vec();
        if endian != self.engine.endian() {
            bytes.reverse();
        }
        Some(DataEngine::from_slice(endian, mode, &bytes))
    }

    /// Engine borrowing field `index` read-only.
    pub fn field_ref(&self, index: usize) -> Option<DataEngine<'_>> {
        let range = self.field_range(index)?;
        Some(DataEngine::from_ref(
            self.engine.endian(),
            self.engine.mode(),
            &self.engine.as_slice()[range],
        ))
    }

    /// Engine borrowing field `index` writable; writes propagate into this
    /// engine's bytes. `None` when out of range or the storage is read-only.
    pub fn field_mut(&mut self, index: usize) -> Option<DataEngine<'_>> {
        let range = self.field_range(index)?;
        let (endian, mode) = (self.engine.endian(), self.engine.mode());
        let bytes = self.engine.as_mut_slice()?;
        Some(DataEngine::from_mut(endian, mode, &mut bytes[range]))
    }

    /// Serialises `value` into field `index` in the engine's endianness.
    pub fn set_field<T: FieldScalar>(&mut self, index: usize, value: T) -> Result<(), FieldError> {
        let count = self.field_count();
        let range = self
            .field_range(index)
            .ok_or(FieldError::OutOfRange { index, count })?;
        if T::WIDTH != range.len() {
            return Err(FieldError::WidthMismatch {
                width: T::WIDTH,
                expected: range.len(),
            });
        }
        let endian = self.engine.endian();
        let bytes = self.engine.as_mut_slice().ok_or_else(|| {
            tracing::error!(index, "field write on a read-only buffer");
            FieldError::ReadOnly
        })?;
        let field = &mut bytes[range];
        let width = field.len();
        let staged = value.into_stream();
        for logical in 0..width {
            field[byte_address(endian, width, logical)] =
                (staged >> (8 * (width - 1 - logical))) as u8;
        }
        Ok(())
    }

    /// Bit `bit` of field `index` under a caller-chosen addressing mode,
    /// independent of the engine-wide mode.
    pub fn field_bit(&self, index: usize, bit: usize, mode: BitMode) -> Option<bool> {
        let range = self.field_range(index)?;
        let width = range.len();
        if bit >= width * 8 {
            return None;
        }
        let field = &self.engine.as_slice()[range];
        let (byte, shift) = bit_address(self.engine.endian(), mode, width, bit);
        Some((field[byte] >> shift) & 1 == 1)
    }

    /// Writes `value` into bit `bit` of field `index` under a caller-chosen
    /// addressing mode.
    pub fn set_field_bit(
        &mut self,
        index: usize,
        bit: usize,
        value: bool,
        mode: BitMode,
    ) -> Result<(), FieldError> {
        let count = self.field_count();
        let range = self
            .field_range(index)
            .ok_or(FieldError::OutOfRange { index, count })?;
        let width = range.len();
        if bit >= width * 8 {
            return Err(FieldError::BitOutOfRange {
                bit,
                len: width * 8,
            });
        }
        let endian = self.engine.endian();
        let bytes = self.engine.as_mut_slice().ok_or_else(|| {
            tracing::error!(index, bit, "field bit write on a read-only buffer");
            FieldError::ReadOnly
        })?;
        let field = &mut bytes[range];
        let (byte, shift) = bit_address(endian, mode, width, bit);
        if value {
            field[byte] |= 1 << shift;
        } else {
            field[byte] &= !(1 << shift);
        }
        Ok(())
    }

    /// Value of `len_bits` consecutive bits of field `index`, starting at
    /// `start_bit` under the engine's addressing mode. The first bit read
    /// lands in the most significant position of the result. `None` when the
    /// range leaves the field, `len_bits` is zero, or the value does not fit
    /// `T`.
    pub fn sub_field<T: FieldScalar>(
        &self,
        index: usize,
        start_bit: usize,
        len_bits: usize,
    ) -> Option<T> {
        let width = *self.pattern.get(index)? as usize;
        if len_bits == 0 || len_bits > T::WIDTH * 8 {
            return None;
        }
        let end = start_bit.checked_add(len_bits)?;
        if end > width * 8 {
            return None;
        }
        let mode = self.engine.mode();
        let mut staged = 0u128;
        for bit in start_bit..end {
            staged = (staged << 1) | u128::from(self.field_bit(index, bit, mode)?);
        }
        Some(T::from_stream(staged))
    }

    /// Index of the `k`-th sub-field of `bit_pattern` containing at least
    /// one set bit.
    ///
    /// The bit pattern partitions the whole buffer (widths in bits, summing
    /// to the bit length); the scan walks the raw storage bytes with
    /// LSB-first bit addressing, regardless of the engine's policy tags.
    /// `None` when fewer than `k + 1` non-empty sub-fields exist or the
    /// pattern does not cover the buffer exactly. Runs in O(sum of widths).
    pub fn nonempty_field_index(&self, k: usize, bit_pattern: &[u16]) -> Option<usize> {
        let total: usize = bit_pattern.iter().map(|&w| usize::from(w)).sum();
        if bit_pattern.is_empty() || total != self.engine.length_bits() {
            return None;
        }
        let data = self.engine.as_slice();
        let mut cursor = 0usize;
        let mut remaining = k;
        for (index, &width) in bit_pattern.iter().enumerate() {
            let end = cursor + usize::from(width);
            let nonempty = (cursor..end).any(|bit| (data[bit / 8] >> (bit % 8)) & 1 == 1);
            cursor = end;
            if nonempty {
                if remaining == 0 {
                    return Some(index);
                }
                remaining -= 1;
            }
        }
        None
    }

    /// Multi-line dump, one field per line:
    /// `<index>: <width>B [<hex>] (<binary>)`.
    pub fn to_formatted_string(&self) -> String {
        use std::fmt::Write as _;

        let mut out = String::new();
        let data = self.engine.as_slice();
        for (index, (&width, &start)) in self.pattern.iter().zip(&self.offsets).enumerate() {
            let bytes = &data[start..start + width as usize];
            if index > 0 {
                out.push('\n');
            }
            let _ = write!(out, "{index}: {width}B [");
            for byte in bytes {
                let _ = write!(out, "{byte:02X}");
            }
            out.push_str("] (");
            for (j, byte) in bytes.iter().enumerate() {
                if j > 0 {
                    out.push(' ');
                }
                let _ = write!(out, "{byte:08b}");
            }
            out.push(')');
        }
        out
    }
}

impl fmt::Display for StructuredEngine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_formatted_string())
    }
}

impl fmt::Debug for StructuredEngine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredEngine")
            .field("fields", &self.pattern)
            .field("engine", &self.engine)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TCP_BYTES: [u8; 16] = [
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x00, 0x00, 0xFF, 0xAA, 0xAA, 0x00,
        0x00,
    ];
    const BYTE_PATTERN: [u16; 7] = [4, 4, 1, 1, 2, 2, 2];

    fn armed() -> StructuredEngine<'static> {
        let mut engine = StructuredEngine::new(Endianness::Big, BitMode::Dependent);
        engine.assign_data(&TCP_BYTES, &BYTE_PATTERN).unwrap();
        engine
    }

    #[test]
    fn should_carve_fields_by_pattern() {
        let engine = armed();
        assert_eq!(engine.field_count(), 7);
        assert_eq!(engine.field_length(4), Some(2));
        assert_eq!(engine.field_length(7), None);
        assert_eq!(engine.field_value::<u16>(4), Some(0x00FF));
        assert_eq!(engine.field_value::<u16>(5), Some(0xAAAA));
        assert_eq!(
            engine.data().to_hex_string(true),
            "00000000000000000C0000FFAAAA0000"
        );
    }

    #[test]
    fn should_reject_bad_patterns_and_keep_state() {
        let mut engine = armed();
        assert_eq!(
            engine.assign_data(&TCP_BYTES, &[]),
            Err(PatternError::Empty)
        );
        assert_eq!(
            engine.assign_data(&TCP_BYTES, &[4, 0, 12]),
            Err(PatternError::ZeroWidth { index: 1 })
        );
        assert_eq!(
            engine.assign_data(&TCP_BYTES, &[4, 4]),
            Err(PatternError::LengthMismatch {
                expected: 8,
                actual: 16
            })
        );
        assert_eq!(engine.field_count(), 7);
        assert_eq!(engine.field_value::<u16>(5), Some(0xAAAA));
    }

    #[test]
    fn should_round_trip_typed_fields() {
        let mut engine = armed();
        engine.set_field::<u32>(1, 0xDEAD_BEEF).unwrap();
        assert_eq!(engine.field_value::<u32>(1), Some(0xDEAD_BEEF));
        assert_eq!(&engine.data().as_slice()[4..8], &[0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn should_serialise_fields_in_engine_endianness() {
        let mut engine = StructuredEngine::new(Endianness::Little, BitMode::Dependent);
        engine.assign_data(&[0u8; 4], &[2, 2]).unwrap();
        engine.set_field::<u16>(0, 0x1234).unwrap();
        assert_eq!(&engine.data().as_slice()[..2], &[0x34, 0x12]);
        assert_eq!(engine.field_value::<u16>(0), Some(0x1234));
    }

    #[test]
    fn should_enforce_value_width() {
        let mut engine = armed();
        assert_eq!(engine.field_value::<u32>(4), None);
        assert_eq!(
            engine.set_field::<u8>(4, 1),
            Err(FieldError::WidthMismatch {
                width: 1,
                expected: 2
            })
        );
        assert_eq!(
            engine.set_field::<u16>(9, 1),
            Err(FieldError::OutOfRange { index: 9, count: 7 })
        );
    }

    #[test]
    fn should_reinterpret_field_copies_under_target_tags() {
        let engine = armed();
        let same = engine
            .field(4, Endianness::Big, BitMode::Dependent)
            .unwrap();
        assert_eq!(same.as_slice(), &[0x00, 0xFF]);
        let flipped = engine
            .field(4, Endianness::Little, BitMode::Dependent)
            .unwrap();
        assert_eq!(flipped.as_slice(), &[0xFF, 0x00]);
        assert_eq!(flipped.endian(), Endianness::Little);
        assert!(engine.field(7, Endianness::Big, BitMode::Dependent).is_none());
    }

    #[test]
    fn should_propagate_writes_through_field_mut() {
        let mut engine = armed();
        {
            let mut field = engine.field_mut(5).unwrap();
            field.clear().unwrap();
        }
        assert_eq!(engine.field_value::<u16>(5), Some(0));
        assert_eq!(&engine.data().as_slice()[12..14], &[0x00, 0x00]);
    }

    #[test]
    fn should_read_field_bits_under_a_call_site_mode() {
        let engine = armed();
        // Field 2 is the single byte 0x0C.
        assert_eq!(engine.field_bit(2, 4, BitMode::Dependent), Some(true));
        assert_eq!(engine.field_bit(2, 0, BitMode::Dependent), Some(false));
        assert_eq!(engine.field_bit(2, 2, BitMode::Independent), Some(true));
        assert_eq!(engine.field_bit(2, 8, BitMode::Dependent), None);
    }

    #[test]
    fn should_write_field_bits() {
        let mut engine = armed();
        engine
            .set_field_bit(2, 0, true, BitMode::Dependent)
            .unwrap();
        assert_eq!(engine.data().byte(8), Some(0x8C));
        assert_eq!(
            engine.set_field_bit(2, 8, true, BitMode::Dependent),
            Err(FieldError::BitOutOfRange { bit: 8, len: 8 })
        );
    }

    #[test]
    fn should_extract_sub_fields() {
        let engine = armed();
        // Field 2 = 0x0C = 00001100; bits 4..7 MSB-first are 110.
        assert_eq!(engine.sub_field::<u8>(2, 4, 3), Some(0b110));
        assert_eq!(engine.sub_field::<u8>(2, 0, 8), Some(0x0C));
        assert_eq!(engine.sub_field::<u8>(2, 4, 0), None);
        assert_eq!(engine.sub_field::<u8>(2, 4, 9), None);
        assert_eq!(engine.sub_field::<u8>(2, 6, 3), None);
    }

    #[test]
    fn should_scan_for_nonempty_subfields() {
        let engine = armed();
        let bit_pattern = [32u16, 32, 4, 3, 3, 6, 9, 7, 16, 16];
        assert_eq!(engine.nonempty_field_index(0, &bit_pattern), Some(2));
        assert_eq!(engine.nonempty_field_index(1, &bit_pattern), Some(6));
        assert_eq!(engine.nonempty_field_index(2, &bit_pattern), Some(7));
        assert_eq!(engine.nonempty_field_index(3, &bit_pattern), Some(8));
        assert_eq!(engine.nonempty_field_index(4, &bit_pattern), None);
        // A pattern that does not cover the buffer is rejected.
        assert_eq!(engine.nonempty_field_index(0, &[32, 32]), None);
    }

    #[test]
    fn should_fail_writes_on_read_only_references() {
        let mut engine = StructuredEngine::new(Endianness::Big, BitMode::Dependent);
        engine.assign_ref(&TCP_BYTES, &BYTE_PATTERN).unwrap();
        assert_eq!(
            engine.set_field::<u16>(4, 1),
            Err(FieldError::ReadOnly)
        );
        assert_eq!(
            engine.set_field_bit(2, 0, true, BitMode::Dependent),
            Err(FieldError::ReadOnly)
        );
        assert!(engine.field_mut(4).is_none());
        // Reads still work.
        assert_eq!(engine.field_value::<u16>(4), Some(0x00FF));
    }

    #[test]
    fn should_return_to_the_empty_state_on_clear() {
        let mut engine = armed();
        engine.clear();
        assert_eq!(engine.field_count(), 0);
        assert!(engine.data().is_empty());
        assert_eq!(engine.field_value::<u16>(0), None);
        // The policy survives, so the engine can be re-armed.
        engine.assign_data(&TCP_BYTES, &BYTE_PATTERN).unwrap();
        assert_eq!(engine.field_count(), 7);
    }

    #[test]
    fn should_format_one_line_per_field() {
        let mut engine = StructuredEngine::new(Endianness::Big, BitMode::Dependent);
        engine.assign_data(&[0x0C, 0x00, 0xFF], &[1, 2]).unwrap();
        assert_eq!(
            engine.to_formatted_string(),
            "0: 1B [0C] (00001100)\n1: 2B [00FF] (00000000 11111111)"
        );
    }
}
