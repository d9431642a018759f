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

//! Owned and borrowed byte regions.
//!
//! A [`ByteBuffer`] is the storage cell of an engine: it owns its bytes,
//! borrows them from a caller, or holds nothing. Borrowed regions come in a
//! shared (read-only) and an exclusive (writable) flavor; the borrow checker
//! bounds their lifetime and the buffer never frees them. Owned regions are
//! released exactly once when the buffer is dropped.

use bytes::BytesMut;

/// Errors raised by buffer mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    /// The buffer borrows its bytes through a shared reference.
    #[error("buffer is not writable")]
    ReadOnly,
    /// The buffer does not own its storage and cannot change its length.
    #[error("buffer does not own its storage")]
    NotOwned,
}

#[derive(Debug, Default)]
enum Storage<'a> {
    #[default]
    Empty,
    Owned(BytesMut),
    Ref(&'a [u8]),
    RefMut(&'a mut [u8]),
}

/// A contiguous byte region with explicit ownership and mutability.
#[derive(Debug, Default)]
pub struct ByteBuffer<'a> {
    storage: Storage<'a>,
}

impl<'a> ByteBuffer<'a> {
    /// Creates a buffer with no storage.
    pub const fn empty() -> Self {
        Self {
            storage: Storage::Empty,
        }
    }

    /// Allocates `n` zeroed bytes. `n == 0` yields the empty buffer.
    pub fn allocate(n: usize) -> Self {
        if n == 0 {
            return Self::empty();
        }
        Self {
            storage: Storage::Owned(BytesMut::zeroed(n)),
        }
    }

    /// Creates an owned buffer holding a copy of `src`.
    pub fn from_copy(src: &[u8]) -> Self {
        if src.is_empty() {
            return Self::empty();
        }
        Self {
            storage: Storage::Owned(BytesMut::from(src)),
        }
    }

    /// Wraps an external region read-only. The buffer never frees it.
    pub const fn from_ref(src: &'a [u8]) -> Self {
        Self {
            storage: Storage::Ref(src),
        }
    }

    /// Wraps an external region writable. The buffer never frees it.
    pub fn from_mut(src: &'a mut [u8]) -> Self {
        Self {
            storage: Storage::RefMut(src),
        }
    }

    /// Length of the region in bytes.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// True when the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the buffer owns its storage (or holds nothing and may
    /// acquire some through [`ByteBuffer::resize`]).
    pub fn is_owned(&self) -> bool {
        matches!(self.storage, Storage::Empty | Storage::Owned(_))
    }

    /// True when writes through this buffer are allowed.
    pub fn is_writable(&self) -> bool {
        !matches!(self.storage, Storage::Ref(_))
    }

    /// The stored bytes in physical order.
    pub fn as_slice(&self) -> &[u8] {
        match &self.storage {
            Storage::Empty => &[],
            Storage::Owned(bytes) => bytes,
            Storage::Ref(bytes) => bytes,
            Storage::RefMut(bytes) => bytes,
        }
    }

    /// Mutable access to the stored bytes; `None` for read-only references.
    pub fn as_mut_slice(&mut self) -> Option<&mut [u8]> {
        match &mut self.storage {
            Storage::Empty => Some(&mut []),
            Storage::Owned(bytes) => Some(bytes),
            Storage::Ref(_) => None,
            Storage::RefMut(bytes) => Some(bytes),
        }
    }

    /// Byte at physical index `i`; `None` when out of range.
    pub fn byte(&self, i: usize) -> Option<u8> {
        self.as_slice().get(i).copied()
    }

    /// Mutable byte at physical index `i`; `None` when out of range or the
    /// buffer is read-only.
    pub fn byte_mut(&mut self, i: usize) -> Option<&mut u8> {
        self.as_mut_slice()?.get_mut(i)
    }

    /// Zeroes the contents, keeping the length.
    pub fn clear(&mut self) -> Result<(), BufferError> {
        match self.as_mut_slice() {
            Some(bytes) => {
                bytes.fill(0);
                Ok(())
            }
            None => Err(BufferError::ReadOnly),
        }
    }

    /// Changes the length to `n`, preserving the first `min(old, n)` bytes
    /// and zero-filling growth. Only empty or owned buffers may resize;
    /// resizing to 0 releases the storage.
    pub fn resize(&mut self, n: usize) -> Result<(), BufferError> {
        match &mut self.storage {
            Storage::Empty => {
                if n > 0 {
                    self.storage = Storage::Owned(BytesMut::zeroed(n));
                }
                Ok(())
            }
            Storage::Owned(bytes) => {
                if n == 0 {
                    self.storage = Storage::Empty;
                } else {
                    bytes.resize(n, 0);
                }
                Ok(())
            }
            Storage::Ref(_) | Storage::RefMut(_) => Err(BufferError::NotOwned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_allocate_zeroed() {
        let buffer = ByteBuffer::allocate(4);
        assert_eq!(buffer.len(), 4);
        assert!(buffer.is_owned());
        assert_eq!(buffer.as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn should_treat_zero_allocation_as_empty() {
        let buffer = ByteBuffer::allocate(0);
        assert!(buffer.is_empty());
        assert!(buffer.is_owned());
    }

    #[test]
    fn should_copy_source_bytes() {
        let buffer = ByteBuffer::from_copy(&[1, 2, 3]);
        assert_eq!(buffer.as_slice(), &[1, 2, 3]);
        assert!(buffer.is_owned());
    }

    #[test]
    fn should_reject_writes_through_shared_references() {
        let source = [1u8, 2, 3];
        let mut buffer = ByteBuffer::from_ref(&source);
        assert!(!buffer.is_writable());
        assert!(buffer.byte_mut(0).is_none());
        assert_eq!(buffer.clear(), Err(BufferError::ReadOnly));
        assert_eq!(buffer.byte(1), Some(2));
    }

    #[test]
    fn should_write_through_exclusive_references() {
        let mut source = [1u8, 2, 3];
        {
            let mut buffer = ByteBuffer::from_mut(&mut source);
            *buffer.byte_mut(1).unwrap() = 9;
        }
        assert_eq!(source, [1, 9, 3]);
    }

    #[test]
    fn should_bound_check_accessors() {
        let mut buffer = ByteBuffer::from_copy(&[1, 2]);
        assert_eq!(buffer.byte(2), None);
        assert!(buffer.byte_mut(2).is_none());
    }

    #[test]
    fn should_zero_on_clear_and_keep_length() {
        let mut buffer = ByteBuffer::from_copy(&[1, 2, 3]);
        buffer.clear().unwrap();
        assert_eq!(buffer.as_slice(), &[0, 0, 0]);
    }

    #[test]
    fn should_resize_owned_buffers_only() {
        let mut buffer = ByteBuffer::from_copy(&[1, 2]);
        buffer.resize(4).unwrap();
        assert_eq!(buffer.as_slice(), &[1, 2, 0, 0]);
        buffer.resize(1).unwrap();
        assert_eq!(buffer.as_slice(), &[1]);

        let mut source = [1u8, 2];
        let mut borrowed = ByteBuffer::from_mut(&mut source);
        assert_eq!(borrowed.resize(4), Err(BufferError::NotOwned));
        assert_eq!(borrowed.len(), 2);
    }

    #[test]
    fn should_regrow_after_resizing_to_zero() {
        let mut buffer = ByteBuffer::from_copy(&[1, 2]);
        buffer.resize(0).unwrap();
        assert!(buffer.is_empty());
        buffer.resize(3).unwrap();
        assert_eq!(buffer.as_slice(), &[0, 0, 0]);
    }
}
