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

//! Typed values carried by structured fields.

/// Capability for unsigned integers that move through structured fields.
///
/// Values stage through `u128`, wide enough for the largest supported
/// scalar; `WIDTH` is the exact number of bytes the type occupies in a
/// field, checked against the field pattern on every typed access.
pub trait FieldScalar: Copy {
    /// Field width of the type in bytes.
    const WIDTH: usize;

    /// Builds the value from the staged integer.
    fn from_stream(v: u128) -> Self;

    /// Stages the value for serialisation.
    fn into_stream(self) -> u128;
}

macro_rules! impl_field_scalar {
    ($($t:ty),*) => {
        $(
            impl FieldScalar for $t {
                const WIDTH: usize = core::mem::size_of::<$t>();

                #[inline(always)]
                fn from_stream(v: u128) -> Self {
                    v as $t
                }

                #[inline(always)]
                fn into_stream(self) -> u128 {
                    self as u128
                }
            }
        )*
    };
}
impl_field_scalar!(u8, u16, u32, u64, u128);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_report_exact_widths() {
        assert_eq!(<u8 as FieldScalar>::WIDTH, 1);
        assert_eq!(<u16 as FieldScalar>::WIDTH, 2);
        assert_eq!(<u32 as FieldScalar>::WIDTH, 4);
        assert_eq!(<u64 as FieldScalar>::WIDTH, 8);
        assert_eq!(<u128 as FieldScalar>::WIDTH, 16);
    }

    #[test]
    fn should_stage_without_loss() {
        assert_eq!(u16::from_stream(0xABCDu16.into_stream()), 0xABCD);
        assert_eq!(u64::from_stream(u64::MAX.into_stream()), u64::MAX);
    }
}
