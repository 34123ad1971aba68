//! Fixed-width numeric columns for a vectorized query engine.
//!
//! [`ColumnVector<T>`] is a contiguous buffer of one numeric type with the
//! primitives query operators are built from: sort-order derivation
//! (including top-k), mask filtering, permutation, row replication, range
//! copy, key serialization into an [`Arena`], row hashing and min/max.
//!
//! Columns are shared between pipeline stages as [`ColumnPtr`]
//! (`Arc<dyn Column>`); everything that changes shape returns a new column.
//!
//! ```text
//!   WHERE      filter(mask)        ──► ColumnVector (selected rows)
//!   ORDER BY   get_permutation     ──► Permutation ──► permute
//!   GROUP BY   serialize_value_into_arena / update_hash_with_value
//!   JOIN       replicate(offsets)  ──► one row per match
//! ```
#![cfg_attr(feature = "nightly", feature(portable_simd))]

pub mod arena;
mod column;
mod error;
mod field;
mod filter;
mod numeric;
mod select;
mod vector;

pub use crate::arena::{Arena, ArenaSpan, BumpArena};
pub use crate::column::{Column, ColumnPtr, Filter, Offsets, Permutation, make_mut};
pub use crate::error::{ColumnError, Result};
pub use crate::field::Field;
pub use crate::filter::FILTER_BATCH;
pub use crate::numeric::Numeric;
pub use crate::vector::ColumnVector;

pub type ColumnUInt8 = ColumnVector<u8>;
pub type ColumnUInt16 = ColumnVector<u16>;
pub type ColumnUInt32 = ColumnVector<u32>;
pub type ColumnUInt64 = ColumnVector<u64>;
pub type ColumnInt8 = ColumnVector<i8>;
pub type ColumnInt16 = ColumnVector<i16>;
pub type ColumnInt32 = ColumnVector<i32>;
pub type ColumnInt64 = ColumnVector<i64>;
pub type ColumnFloat32 = ColumnVector<f32>;
pub type ColumnFloat64 = ColumnVector<f64>;
