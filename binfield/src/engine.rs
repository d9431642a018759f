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

//! The binary data engine.
//!
//! A [`DataEngine`] binds a byte buffer to an endianness and a bit-addressing
//! mode. It is the composition point of the crate: construction and
//! assignment manage the buffer, the policy tags steer every interpretation,
//! and the bit and octet views are handed out as scoped borrows.
//!
//! Changing the endianness or mode of an engine is a relabeling of the same
//! bytes, never a byte swap: subsequent reads interpret the unchanged storage
//! under the new policy.
//!
//! The engine is not thread-safe by design; concurrent use is the caller's
//! responsibility.

use std::{fmt, ops};

use zerocopy::{Immutable, IntoBytes};

use crate::{
    bits::{BitView, BitViewMut},
    buffer::{BufferError, ByteBuffer},
    octets::{OctetView, OctetViewMut},
    policy::{BitMode, Endianness},
};

/// Errors raised by engine-level operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The input region was empty.
    #[error("input region is empty")]
    EmptyInput,
    /// The engine's bytes are borrowed through a shared reference.
    #[error("engine buffer is not writable")]
    ReadOnly,
    /// The engine borrows its bytes and cannot change its length.
    #[error("engine buffer does not own its storage")]
    NotOwned,
}

impl From<BufferError> for EngineError {
    fn from(value: BufferError) -> Self {
        match value {
            BufferError::ReadOnly => EngineError::ReadOnly,
            BufferError::NotOwned => EngineError::NotOwned,
        }
    }
}

/// A byte buffer bound to an endianness and bit-addressing policy.
pub struct DataEngine<'a> {
    buffer: ByteBuffer<'a>,
    endian: Endianness,
    mode: BitMode,
}

impl<'a> DataEngine<'a> {
    /// Creates an empty engine with the given policy. `Native` endianness is
    /// resolved here, once.
    pub fn new(endian: Endianness, mode: BitMode) -> Self {
        Self {
            buffer: ByteBuffer::empty(),
            endian: endian.resolved(),
            mode,
        }
    }

    /// Creates an engine owning `n` zeroed bytes.
    pub fn allocate(endian: Endianness, mode: BitMode, n: usize) -> Self {
        Self {
            buffer: ByteBuffer::allocate(n),
            endian: endian.resolved(),
            mode,
        }
    }

    /// Creates an engine owning a copy of `data`.
    pub fn from_slice(endian: Endianness, mode: BitMode, data: &[u8]) -> Self {
        Self {
            buffer: ByteBuffer::from_copy(data),
            endian: endian.resolved(),
            mode,
        }
    }

    /// Creates an engine owning a copy of the bytes of `value`.
    pub fn from_value<T: IntoBytes + Immutable + ?Sized>(
        endian: Endianness,
        mode: BitMode,
        value: &T,
    ) -> Self {
        Self::from_slice(endian, mode, value.as_bytes())
    }

    /// Creates an engine borrowing `data` read-only.
    pub fn from_ref(endian: Endianness, mode: BitMode, data: &'a [u8]) -> Self {
        Self {
            buffer: ByteBuffer::from_ref(data),
            endian: endian.resolved(),
            mode,
        }
    }

    /// Creates an engine borrowing `data` writable.
    pub fn from_mut(endian: Endianness, mode: BitMode, data: &'a mut [u8]) -> Self {
        Self {
            buffer: ByteBuffer::from_mut(data),
            endian: endian.resolved(),
            mode,
        }
    }

    /// Replaces the buffer with an owned copy of `data`. The engine is left
    /// unchanged when `data` is empty.
    pub fn assign_data(&mut self, data: &[u8]) -> Result<(), EngineError> {
        if data.is_empty() {
            return Err(EngineError::EmptyInput);
        }
        self.buffer = ByteBuffer::from_copy(data);
        tracing::trace!(len = data.len(), "assigned owned data");
        Ok(())
    }

    /// Replaces the buffer with an owned copy of the bytes of `value`.
    pub fn assign_value<T: IntoBytes + Immutable + ?Sized>(
        &mut self,
        value: &T,
    ) -> Result<(), EngineError> {
        self.assign_data(value.as_bytes())
    }

    /// Replaces the buffer with a read-only borrow of `data`.
    pub fn assign_ref(&mut self, data: &'a [u8]) -> Result<(), EngineError> {
        if data.is_empty() {
            return Err(EngineError::EmptyInput);
        }
        tracing::trace!(len = data.len(), "assigned referenced data");
        self.buffer = ByteBuffer::from_ref(data);
        Ok(())
    }

    /// Replaces the buffer with a writable borrow of `data`.
    pub fn assign_mut(&mut self, data: &'a mut [u8]) -> Result<(), EngineError> {
        if data.is_empty() {
            return Err(EngineError::EmptyInput);
        }
        tracing::trace!(len = data.len(), "assigned referenced data");
        self.buffer = ByteBuffer::from_mut(data);
        Ok(())
    }

    /// Zeroes the contents, keeping the length.
    pub fn clear(&mut self) -> Result<(), EngineError> {
        self.buffer.clear().map_err(|e| {
            tracing::error!(error = %e, "clear on a read-only buffer");
            EngineError::from(e)
        })
    }

    /// Changes the length to `n` bytes, preserving the first `min(old, n)`
    /// bytes and zero-filling growth. Borrowed buffers refuse.
    pub fn resize(&mut self, n: usize) -> Result<(), EngineError> {
        self.buffer.resize(n).map_err(|e| {
            tracing::error!(error = %e, len = n, "resize on a borrowed buffer");
            EngineError::from(e)
        })
    }

    /// Length in bytes.
    pub fn length_bytes(&self) -> usize {
        self.buffer.len()
    }

    /// Length in bits, always eight times [`DataEngine::length_bytes`].
    pub fn length_bits(&self) -> usize {
        self.buffer.len() * 8
    }

    /// True when the engine holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// True when the engine owns its storage.
    pub fn is_owned(&self) -> bool {
        self.buffer.is_owned()
    }

    /// True when writes through the engine are allowed.
    pub fn is_writable(&self) -> bool {
        self.buffer.is_writable()
    }

    /// Byte at physical index `i`; `None` when out of range.
    pub fn byte(&self, i: usize) -> Option<u8> {
        self.buffer.byte(i)
    }

    /// Mutable byte at physical index `i`; `None` when out of range or the
    /// buffer is read-only.
    pub fn byte_mut(&mut self, i: usize) -> Option<&mut u8> {
        self.buffer.byte_mut(i)
    }

    /// The stored bytes in physical order.
    pub fn as_slice(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Mutable access to the stored bytes; `None` for read-only references.
    pub fn as_mut_slice(&mut self) -> Option<&mut [u8]> {
        self.buffer.as_mut_slice()
    }

    /// The engine's endianness. Never `Native`.
    pub fn endian(&self) -> Endianness {
        self.endian
    }

    /// Relabels the bytes under a new endianness. No byte is moved.
    pub fn set_endian(&mut self, endian: Endianness) {
        self.endian = endian.resolved();
        tracing::trace!(endian = ?self.endian, "relabeled endianness");
    }

    /// The engine's bit-addressing mode.
    pub fn mode(&self) -> BitMode {
        self.mode
    }

    /// Relabels the bytes under a new bit-addressing mode.
    pub fn set_mode(&mut self, mode: BitMode) {
        self.mode = mode;
    }

    /// Bit-addressed view over the bytes.
    pub fn bits(&self) -> BitView<'_> {
        BitView::new(self.buffer.as_slice(), self.endian, self.mode)
    }

    /// Mutable bit-addressed view; `None` for read-only references.
    pub fn bits_mut(&mut self) -> Option<BitViewMut<'_>> {
        let (endian, mode) = (self.endian, self.mode);
        self.buffer
            .as_mut_slice()
            .map(|data| BitViewMut::new(data, endian, mode))
    }

    /// Byte-addressed view over the bytes.
    pub fn octets(&self) -> OctetView<'_> {
        OctetView::new(self.buffer.as_slice(), self.endian)
    }

    /// Mutable byte-addressed view; `None` for read-only references.
    pub fn octets_mut(&mut self) -> Option<OctetViewMut<'_>> {
        let endian = self.endian;
        self.buffer
            .as_mut_slice()
            .map(|data| OctetViewMut::new(data, endian))
    }

    /// Deep copy of the engine with owned storage.
    pub fn to_owned(&self) -> DataEngine<'static> {
        DataEngine::from_slice(self.endian, self.mode, self.as_slice())
    }

    /// Continuous hex pairs in storage order, uppercase unless `upper` is
    /// false.
    pub fn to_hex_string(&self, upper: bool) -> String {
        use std::fmt::Write as _;

        let mut out = String::with_capacity(self.length_bytes() * 2);
        for byte in self.as_slice() {
            let _ = if upper {
                write!(out, "{byte:02X}")
            } else {
                write!(out, "{byte:02x}")
            };
        }
        out
    }
}

impl fmt::Debug for DataEngine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataEngine")
            .field("len", &self.length_bytes())
            .field("endian", &self.endian)
            .field("mode", &self.mode)
            .field("bytes", &format_args!("{}", self.to_hex_string(true)))
            .finish()
    }
}

impl fmt::Display for DataEngine<'_> {
    /// Renders the bit stream, see [`BitView`]'s `Display`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.bits().fmt(f)
    }
}

impl<'b> PartialEq<DataEngine<'b>> for DataEngine<'_> {
    /// Engines compare by logical bit stream, each side read through its own
    /// policy.
    fn eq(&self, other: &DataEngine<'b>) -> bool {
        self.bits().equal(&other.bits())
    }
}

impl<'r> ops::BitAnd<&DataEngine<'r>> for &DataEngine<'_> {
    type Output = DataEngine<'static>;

    /// Bitwise AND; mismatched bit lengths yield an empty engine and leave
    /// the operands untouched.
    fn bitand(self, rhs: &DataEngine<'r>) -> DataEngine<'static> {
        self.bits()
            .and(&rhs.bits())
            .unwrap_or_else(|| DataEngine::new(self.endian, self.mode))
    }
}

impl<'r> ops::BitOr<&DataEngine<'r>> for &DataEngine<'_> {
    type Output = DataEngine<'static>;

    /// Bitwise OR; mismatched bit lengths yield an empty engine and leave
    /// the operands untouched.
    fn bitor(self, rhs: &DataEngine<'r>) -> DataEngine<'static> {
        self.bits()
            .or(&rhs.bits())
            .unwrap_or_else(|| DataEngine::new(self.endian, self.mode))
    }
}

impl<'r> ops::BitXor<&DataEngine<'r>> for &DataEngine<'_> {
    type Output = DataEngine<'static>;

    /// Bitwise XOR; mismatched bit lengths yield an empty engine and leave
    /// the operands untouched.
    fn bitxor(self, rhs: &DataEngine<'r>) -> DataEngine<'static> {
        self.bits()
            .xor(&rhs.bits())
            .unwrap_or_else(|| DataEngine::new(self.endian, self.mode))
    }
}

impl ops::Not for &DataEngine<'_> {
    type Output = DataEngine<'static>;

    /// Complement of the stream as a new owned engine.
    fn not(self) -> DataEngine<'static> {
        self.bits().not()
    }
}
