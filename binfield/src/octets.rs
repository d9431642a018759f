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

//! Byte-granularity views over engine bytes.
//!
//! The octet views are the byte-level siblings of the bit views: they
//! address logical bytes in endian order (logical byte 0 is the most
//! significant byte of the region) and shift or rotate whole bytes with the
//! same direction conventions. Bytes carry no intra-byte order, so the bit
//! mode plays no role here.

use std::fmt;

use crate::policy::{Endianness, byte_address};

/// Read-only byte-addressed view.
pub struct OctetView<'b> {
    data: &'b [u8],
    endian: Endianness,
}

impl<'b> OctetView<'b> {
    pub(crate) fn new(data: &'b [u8], endian: Endianness) -> Self {
        Self { data, endian }
    }

    /// Length of the stream in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the stream holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Logical byte `i`; `None` when out of range.
    pub fn at(&self, i: usize) -> Option<u8> {
        if i >= self.data.len() {
            return None;
        }
        Some(self.data[byte_address(self.endian, self.data.len(), i)])
    }
}

impl fmt::Display for OctetView<'_> {
    /// Renders the bytes as hex pairs in logical order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len() {
            match self.at(i) {
                Some(byte) => write!(f, "{byte:02X}")?,
                None => {}
            }
        }
        Ok(())
    }
}

/// Mutable byte-addressed view.
pub struct OctetViewMut<'b> {
    data: &'b mut [u8],
    endian: Endianness,
}

impl<'b> OctetViewMut<'b> {
    pub(crate) fn new(data: &'b mut [u8], endian: Endianness) -> Self {
        Self { data, endian }
    }

    /// Read-only view over the same bytes.
    pub fn as_view(&self) -> OctetView<'_> {
        OctetView::new(self.data, self.endian)
    }

    /// Length of the stream in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the stream holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Logical byte `i`; `None` when out of range.
    pub fn at(&self, i: usize) -> Option<u8> {
        self.as_view().at(i)
    }

    /// Writes `value` into logical byte `i`. Out-of-range indices are
    /// ignored.
    pub fn put(&mut self, i: usize, value: u8) {
        if i >= self.data.len() {
            return;
        }
        let at = byte_address(self.endian, self.data.len(), i);
        self.data[at] = value;
    }

    /// Shifts the stream `n` bytes toward lower indices, filling vacated
    /// positions with `fill`.
    pub fn shift_left(&mut self, n: usize, fill: u8) {
        let len = self.len();
        if n == 0 || len == 0 {
            return;
        }
        let n = n.min(len);
        for i in 0..len - n {
            let v = self.at(i + n).unwrap_or(fill);
            self.put(i, v);
        }
        for i in len - n..len {
            self.put(i, fill);
        }
    }

    /// Shifts the stream `n` bytes toward higher indices, filling vacated
    /// positions with `fill`.
    pub fn shift_right(&mut self, n: usize, fill: u8) {
        let len = self.len();
        if n == 0 || len == 0 {
            return;
        }
        let n = n.min(len);
        for i in (n..len).rev() {
            let v = self.at(i - n).unwrap_or(fill);
            self.put(i, v);
        }
        for i in 0..n {
            self.put(i, fill);
        }
    }

    /// Rotates the stream `n` bytes toward lower indices.
    pub fn rotate_left(&mut self, n: usize) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let n = n % len;
        if n == 0 {
            return;
        }
        self.reverse_range(0, n);
        self.reverse_range(n, len);
        self.reverse_range(0, len);
    }

    /// Rotates the stream `n` bytes toward higher indices.
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

    fn reverse_range(&mut self, mut lo: usize, mut hi: usize) {
        while lo + 1 < hi {
            hi -= 1;
            let a = self.at(lo);
            let b = self.at(hi);
            if let (Some(a), Some(b)) = (a, b) {
                self.put(lo, b);
                self.put(hi, a);
            }
            lo += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{engine::DataEngine, policy::BitMode};

    fn engine(endian: Endianness, data: &[u8]) -> DataEngine<'static> {
        DataEngine::from_slice(endian, BitMode::Dependent, data)
    }

    #[test]
    fn should_address_logical_bytes_in_endian_order() {
        let big = engine(Endianness::Big, &[0x12, 0x34]);
        assert_eq!(big.octets().at(0), Some(0x12));
        assert_eq!(big.octets().at(1), Some(0x34));
        assert_eq!(big.octets().at(2), None);

        let little = engine(Endianness::Little, &[0x12, 0x34]);
        assert_eq!(little.octets().at(0), Some(0x34));
        assert_eq!(little.octets().to_string(), "3412");
    }

    #[test]
    fn should_shift_logical_bytes() {
        let mut e = engine(Endianness::Big, &[0x11, 0x22, 0x33]);
        e.octets_mut().unwrap().shift_left(1, 0x00);
        assert_eq!(e.as_slice(), &[0x22, 0x33, 0x00]);

        let mut e = engine(Endianness::Little, &[0x11, 0x22, 0x33]);
        // Logical order under little endian is 0x33 0x22 0x11; shifting left
        // by one drops 0x33 and fills the least significant position.
        e.octets_mut().unwrap().shift_left(1, 0xAA);
        assert_eq!(e.as_slice(), &[0xAA, 0x11, 0x22]);
    }

    #[test]
    fn should_fill_on_overlong_byte_shift() {
        let mut e = engine(Endianness::Big, &[0x11, 0x22]);
        e.octets_mut().unwrap().shift_right(5, 0x7F);
        assert_eq!(e.as_slice(), &[0x7F, 0x7F]);
    }

    #[test]
    fn should_rotate_bytes_and_invert() {
        let mut e = engine(Endianness::Big, &[0x11, 0x22, 0x33]);
        e.octets_mut().unwrap().rotate_left(1);
        assert_eq!(e.as_slice(), &[0x22, 0x33, 0x11]);
        e.octets_mut().unwrap().rotate_right(1);
        assert_eq!(e.as_slice(), &[0x11, 0x22, 0x33]);
    }

    #[test]
    fn should_write_logical_bytes() {
        let mut e = engine(Endianness::Little, &[0x00, 0x00]);
        e.octets_mut().unwrap().put(0, 0xEE);
        assert_eq!(e.as_slice(), &[0x00, 0xEE]);
        e.octets_mut().unwrap().put(9, 0xEE);
        assert_eq!(e.as_slice(), &[0x00, 0xEE]);
    }
}
