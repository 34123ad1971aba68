//! Element types a [`ColumnVector`](crate::ColumnVector) can hold.
//!
//! Every element is a fixed-width plain value (`bytemuck::Pod`), so raw byte
//! views, zero-filling and unaligned reads all go through `bytemuck` instead
//! of pointer casts.

use std::cmp::Ordering;
use std::fmt;

use bytemuck::Pod;

use crate::field::Field;

/// Capabilities the column algorithms need from an element type.
pub trait Numeric: Pod + Default + PartialOrd + fmt::Debug + Send + Sync {
    /// Engine-facing type name, e.g. `UInt8` or `Float64`.
    const TYPE_NAME: &'static str;

    /// Always `false` for integers.
    fn is_nan(self) -> bool;

    /// NaN for floats, zero for integers. Seed value for extremes.
    fn nan_or_zero() -> Self;

    /// Total order used for sorting.
    ///
    /// Agrees with numeric comparison on ordinary values. NaN compares greater
    /// than every number and equal to every other NaN; `-0.0` and `0.0` are
    /// equal.
    fn compare(&self, other: &Self) -> Ordering;

    /// Uniform 64-bit handle for type-erased callers.
    ///
    /// The value's own bytes zero-extended to 64 bits: `-1i16` yields
    /// `0xFFFF` and floats yield their IEEE bit pattern.
    fn to_bits_u64(self) -> u64;

    /// Boxes the value into the nearest [`Field`] variant.
    fn to_field(self) -> Field;

    /// Unboxes a field of the nearest variant, narrowing with `as` semantics.
    /// Returns `None` for any other variant.
    fn from_field(field: &Field) -> Option<Self>;
}

macro_rules! impl_unsigned {
    ($($t:ty => $name:literal),* $(,)?) => {$(
        impl Numeric for $t {
            const TYPE_NAME: &'static str = $name;

            #[inline(always)]
            fn is_nan(self) -> bool {
                false
            }

            #[inline(always)]
            fn nan_or_zero() -> Self {
                0
            }

            #[inline(always)]
            fn compare(&self, other: &Self) -> Ordering {
                self.cmp(other)
            }

            #[inline(always)]
            fn to_bits_u64(self) -> u64 {
                self as u64
            }

            fn to_field(self) -> Field {
                Field::UInt64(self as u64)
            }

            fn from_field(field: &Field) -> Option<Self> {
                match field {
                    Field::UInt64(v) => Some(*v as $t),
                    _ => None,
                }
            }
        }
    )*};
}

macro_rules! impl_signed {
    ($($t:ty as $u:ty => $name:literal),* $(,)?) => {$(
        impl Numeric for $t {
            const TYPE_NAME: &'static str = $name;

            #[inline(always)]
            fn is_nan(self) -> bool {
                false
            }

            #[inline(always)]
            fn nan_or_zero() -> Self {
                0
            }

            #[inline(always)]
            fn compare(&self, other: &Self) -> Ordering {
                self.cmp(other)
            }

            #[inline(always)]
            fn to_bits_u64(self) -> u64 {
                bytemuck::cast::<$t, $u>(self) as u64
            }

            fn to_field(self) -> Field {
                Field::Int64(self as i64)
            }

            fn from_field(field: &Field) -> Option<Self> {
                match field {
                    Field::Int64(v) => Some(*v as $t),
                    _ => None,
                }
            }
        }
    )*};
}

macro_rules! impl_float {
    ($($t:ty => $name:literal),* $(,)?) => {$(
        impl Numeric for $t {
            const TYPE_NAME: &'static str = $name;

            #[inline(always)]
            fn is_nan(self) -> bool {
                <$t>::is_nan(self)
            }

            #[inline(always)]
            fn nan_or_zero() -> Self {
                <$t>::NAN
            }

            #[inline(always)]
            fn compare(&self, other: &Self) -> Ordering {
                match (<$t>::is_nan(*self), <$t>::is_nan(*other)) {
                    (false, false) => self.partial_cmp(other).unwrap_or(Ordering::Equal),
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                }
            }

            #[inline(always)]
            fn to_bits_u64(self) -> u64 {
                self.to_bits() as u64
            }

            fn to_field(self) -> Field {
                Field::Float64(self as f64)
            }

            fn from_field(field: &Field) -> Option<Self> {
                match field {
                    Field::Float64(v) => Some(*v as $t),
                    _ => None,
                }
            }
        }
    )*};
}

impl_unsigned!(u8 => "UInt8", u16 => "UInt16", u32 => "UInt32", u64 => "UInt64");
impl_signed!(i8 as u8 => "Int8", i16 as u16 => "Int16", i32 as u32 => "Int32", i64 as u64 => "Int64");
impl_float!(f32 => "Float32", f64 => "Float64");
