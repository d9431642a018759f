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

//! binfield: bit-addressed views and structured field access over byte
//! buffers.
//!
//! The crate represents an arbitrary byte region as a sequence of logically
//! typed fields and gives bit-level access to it under two independent axes:
//!
//! * **Endianness**: how multi-byte values are laid out, big, little or
//!   native, resolved once at construction.
//! * **Bit mode**: how bit indices map onto bytes, either *dependent* (bit 0 is
//!   the most significant bit of the logical value and the stream reads
//!   across bytes in endian order) or *independent* (bit 0 is the least
//!   significant bit of byte 0 and every byte is addressed in isolation).
//!
//! Buffers are owned or borrowed from the caller; bit and octet views are
//! scoped borrows constructed per call, so the borrow checker keeps them
//! from outliving the engine they read. A [`StructuredEngine`] overlays a
//! flat byte-width pattern on an engine and serves per-field reads, writes
//! and bit slices.
//!
//! ## Example
//!
//! ```
//! use binfield::{BitMode, Endianness, StructuredEngine};
//!
//! let header = [0x0Cu8, 0x00, 0x00, 0xFF];
//! let mut engine = StructuredEngine::new(Endianness::Big, BitMode::Dependent);
//! engine.assign_data(&header, &[1, 1, 2]).unwrap();
//!
//! assert_eq!(engine.field_count(), 3);
//! assert_eq!(engine.field_value::<u16>(2), Some(0x00FF));
//! assert_eq!(engine.sub_field::<u8>(0, 4, 3), Some(0b110));
//! ```

pub mod bits;
pub mod buffer;
pub mod engine;
pub mod octets;
pub mod policy;
pub mod scalar;
pub mod structured;

pub use bits::{BitView, BitViewMut};
pub use buffer::{BufferError, ByteBuffer};
pub use engine::{DataEngine, EngineError};
pub use octets::{OctetView, OctetViewMut};
pub use policy::{BitMode, Endianness};
pub use scalar::FieldScalar;
pub use structured::{FieldError, PatternError, StructuredEngine};
