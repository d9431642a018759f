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

//! Bit-addressed views over engine bytes.
//!
//! Views are scoped borrows handed out by [`DataEngine::bits`] and
//! [`DataEngine::bits_mut`]; they carry the engine's policy tags and never
//! outlive the bytes they read. A view performs no allocation of its own;
//! the bitwise algebra allocates only the owned engine it returns.
//!
//! Index conventions:
//!
//! * Out-of-range reads answer `false`, out-of-range single-bit writes are
//!   silent no-ops.
//! * `shift_left` moves bits toward lower logical indices (leftward in the
//!   [`Display`](std::fmt::Display) rendering); vacated positions take the
//!   fill bit. Shifting by at least the bit length fills the whole stream.
//! * Rotations are modular and mutual inverses.

use std::fmt;

use crate::{
    engine::DataEngine,
    policy::{BitMode, Endianness, bit_address},
};

/// Read-only bit-addressed view.
pub struct BitView<'b> {
    data: &'b [u8],
    endian: Endianness,
    mode: BitMode,
}

impl<'b> BitView<'b> {
    pub(crate) fn new(data: &'b [u8], endian: Endianness, mode: BitMode) -> Self {
        Self { data, endian, mode }
    }

    /// Length of the stream in bits.
    pub fn len(&self) -> usize {
        self.data.len() * 8
    }

    /// True when the stream holds no bits.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value of bit `i`; out-of-range indices answer `false`.
    pub fn test(&self, i: usize) -> bool {
        if i >= self.len() {
            return false;
        }
        let (byte, shift) = bit_address(self.endian, self.mode, self.data.len(), i);
        (self.data[byte] >> shift) & 1 == 1
    }

    /// Number of set bits in the whole stream.
    pub fn count(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Number of set bits in the half-open range `[lo, hi)`, clamped to the
    /// stream length.
    pub fn count_range(&self, lo: usize, hi: usize) -> usize {
        let hi = hi.min(self.len());
        (lo..hi).filter(|&i| self.test(i)).count()
    }

    /// True when at least one bit is set.
    pub fn any(&self) -> bool {
        self.data.iter().any(|&b| b != 0)
    }

    /// True when every bit is set. Vacuously true for the empty stream.
    pub fn all(&self) -> bool {
        self.data.iter().all(|&b| b == 0xFF)
    }

    /// True when no bit is set.
    pub fn none(&self) -> bool {
        !self.any()
    }

    /// True when both streams have the same length and the same bit value at
    /// every logical index, each read through its own policy.
    pub fn equal(&self, other: &BitView<'_>) -> bool {
        if self.len() != other.len() {
            return false;
        }
        if self.endian == other.endian && self.mode == other.mode {
            return self.data == other.data;
        }
        (0..self.len()).all(|i| self.test(i) == other.test(i))
    }

    /// Bitwise AND with `other`; `None` when the bit lengths differ.
    pub fn and(&self, other: &BitView<'_>) -> Option<DataEngine<'static>> {
        self.combine(other, |a, b| a & b)
    }

    /// Bitwise OR with `other`; `None` when the bit lengths differ.
    pub fn or(&self, other: &BitView<'_>) -> Option<DataEngine<'static>> {
        self.combine(other, |a, b| a | b)
    }

    /// Bitwise XOR with `other`; `None` when the bit lengths differ.
    pub fn xor(&self, other: &BitView<'_>) -> Option<DataEngine<'static>> {
        self.combine(other, |a, b| a ^ b)
    }

    /// Complement of the stream as a new owned engine under this view's
    /// policy.
    pub fn not(&self) -> DataEngine<'static> {
        let bytes: Vec<u8> = self.data.iter().map(|b| !b).collect();
        DataEngine::from_slice(self.endian, self.mode, &bytes)
    }

    /// Combines two equal-length streams bit by logical bit. The result owns
    /// its bytes and inherits this view's policy. When both operands share a
    /// policy the mapping is the same bijection on both sides, so the
    /// combine runs directly on the physical bytes.
    fn combine(&self, other: &BitView<'_>, op: fn(u8, u8) -> u8) -> Option<DataEngine<'static>> {
        if self.len() != other.len() {
            return None;
        }
        let len = self.data.len();
        let mut bytes = vec![0u8; len];
        if self.endian == other.endian && self.mode == other.mode {
            for (out, (&a, &b)) in bytes.iter_mut().zip(self.data.iter().zip(other.data)) {
                *out = op(a, b);
            }
        } else {
            for bit in 0..self.len() {
                if op(self.test(bit) as u8, other.test(bit) as u8) & 1 == 1 {
                    let (byte, shift) = bit_address(self.endian, self.mode, len, bit);
                    bytes[byte] |= 1 << shift;
                }
            }
        }
        Some(DataEngine::from_slice(self.endian, self.mode, &bytes))
    }
}

impl fmt::Display for BitView<'_> {
    /// Renders the stream most significant bit first within each byte,
    /// bytes separated by spaces and ordered by the view's policy.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use std::fmt::Write as _;

        for j in 0..self.data.len() {
            if j > 0 {
                f.write_char(' ')?;
            }
            for k in 0..8 {
                let bit = match self.mode {
                    BitMode::Dependent => j * 8 + k,
                    BitMode::Independent => j * 8 + (7 - k),
                };
                f.write_char(if self.test(bit) { '1' } else { '0' })?;
            }
        }
        Ok(())
    }
}

/// Mutable bit-addressed view.
pub struct BitViewMut<'b> {
    data: &'b mut [u8],
    endian: Endianness,
    mode: BitMode,
}

impl<'b> BitViewMut<'b> {
    pub(crate) fn new(data: &'b mut [u8], endian: Endianness, mode: BitMode) -> Self {
        Self { data, endian, mode }
    }

    /// Read-only view over the same bits.
    pub fn as_view(&self) -> BitView<'_> {
        BitView::new(self.data, self.endian, self.mode)
    }

    /// Length of the stream in bits.
    pub fn len(&self) -> usize {
        self.data.len() * 8
    }

    /// True when the stream holds no bits.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value of bit `i`; out-of-range indices answer `false`.
    pub fn test(&self, i: usize) -> bool {
        self.as_view().test(i)
    }

    /// Number of set bits in the whole stream.
    pub fn count(&self) -> usize {
        self.as_view().count()
    }

    /// Writes `value` into bit `i`. Out-of-range indices are ignored.
    pub fn assign(&mut self, i: usize, value: bool) {
        if i >= self.len() {
            return;
        }
        let (byte, shift) = bit_address(self.endian, self.mode, self.data.len(), i);
        if value {
            self.data[byte] |= 1 << shift;
        } else {
            self.data[byte] &= !(1 << shift);
        }
    }

    /// Sets bit `i`. Out-of-range indices are ignored.
    pub fn set(&mut self, i: usize) {
        self.assign(i, true);
    }

    /// Clears bit `i`. Out-of-range indices are ignored.
    pub fn reset(&mut self, i: usize) {
        self.assign(i, false);
    }

    /// Inverts bit `i`. Out-of-range indices are ignored.
    pub fn flip(&mut self, i: usize) {
        if i >= self.len() {
            return;
        }
        let (byte, shift) = bit_address(self.endian, self.mode, self.data.len(), i);
        self.data[byte] ^= 1 << shift;
    }

    /// Shifts the stream `n` bits toward lower indices, filling vacated
    /// positions with `fill`.
    pub fn shift_left(&mut self, n: usize, fill: bool) {
        let len = self.len();
        if n == 0 || len == 0 {
            return;
        }
        let n = n.min(len);
        for i in 0..len - n {
            let v = self.test(i + n);
            self.assign(i, v);
        }
        for i in len - n..len {
            self.assign(i, fill);
        }
    }

    /// Shifts the stream `n` bits toward higher indices, filling vacated
    /// positions with `fill`.
    pub fn shift_right(&mut self, n: usize, fill: bool) {
        let len = self.len();
        if n == 0 || len == 0 {
            return;
        }
        let n = n.min(len);
        for i in (n..len).rev() {
            let v = self.test(i - n);
            self.assign(i, v);
        }
        for i in 0..n {
            self.assign(i, fill);
        }
    }

    /// Rotates the stream `n` bits toward lower indices.
    pub fn rotate_left(&mut self, n: usize) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let n = n % len;
        if n == 0 {
            return;
        }
        // Three-reversal rotation, so no scratch buffer is needed.
        self.reverse_range(0, n);
        self.reverse_range(n, len);
        self.reverse_range(0, len);
    }

    /// Rotates the stream `n` bits toward higher indices.
    pub fn rotate_right(&mut self, n: usize) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let n = n % len;
        if n == 0 {
            return;
        }
        self.rotate_left(len - n);
    }

    /// Reverses the bits in the half-open range `[lo, hi)`.
    fn reverse_range(&mut self, mut lo: usize, mut hi: usize) {
        while lo + 1 < hi {
            hi -= 1;
            let a = self.test(lo);
            let b = self.test(hi);
            self.assign(lo, b);
            self.assign(hi, a);
            lo += 1;
        }
    }
}
