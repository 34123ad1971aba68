//! Type-erased column interface.
//!
//! Generic operator code (filter, sort, aggregate, join) works on columns
//! whose element type it does not know at compile time. It holds them as
//! [`ColumnPtr`] and drives them through the [`Column`] trait.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hasher;
use std::sync::Arc;

use crate::arena::{Arena, ArenaSpan};
use crate::error::Result;
use crate::field::Field;

/// Shared, immutable handle to a column.
///
/// Pipeline stages clone the handle instead of the data. Use [`make_mut`] to
/// obtain a writable column.
pub type ColumnPtr = Arc<dyn Column>;

/// Row order produced by sorting and consumed by `permute`.
pub type Permutation = Vec<usize>;

/// One byte per row, nonzero means the row is kept.
pub type Filter = [u8];

/// Cumulative replication counts, one per row.
pub type Offsets = [u64];

/// Operations every column supports.
///
/// Operations that change shape return a new [`ColumnPtr`]; only the append
/// family takes `&mut self`.
pub trait Column: Any + Send + Sync + fmt::Debug {
    /// Concrete column type, e.g. `ColumnVector<Int32>`.
    fn name(&self) -> String;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes occupied by the rows.
    fn byte_size(&self) -> usize;

    fn get(&self, n: usize) -> Field;

    fn get_value_as_bits(&self, n: usize) -> u64;

    fn clone_resized(&self, size: usize) -> ColumnPtr;

    fn clone_empty(&self) -> ColumnPtr;

    fn insert(&mut self, value: &Field) -> Result<()>;

    fn insert_default(&mut self);

    fn insert_range_from(&mut self, src: &dyn Column, start: usize, length: usize) -> Result<()>;

    fn pop_back(&mut self, n: usize);

    fn get_permutation(&self, reverse: bool, limit: usize, res: &mut Permutation);

    fn filter(&self, filter: &Filter, size_hint: isize) -> Result<ColumnPtr>;

    fn permute(&self, perm: &[usize], limit: usize) -> Result<ColumnPtr>;

    fn replicate(&self, offsets: &Offsets) -> Result<ColumnPtr>;

    fn serialize_value_into_arena(
        &self,
        n: usize,
        arena: &mut dyn Arena,
        begin: &mut Option<ArenaSpan>,
    ) -> ArenaSpan;

    fn deserialize_and_insert_from_arena<'a>(&mut self, pos: &'a [u8]) -> Result<&'a [u8]>;

    fn update_hash_with_value(&self, n: usize, hasher: &mut dyn Hasher);

    fn get_extremes(&self) -> (Field, Field);

    fn compare_at(&self, n: usize, m: usize, rhs: &dyn Column) -> Result<Ordering>;

    fn as_any(&self) -> &dyn Any;
}

/// Copy-on-write access to a shared column.
///
/// Mutates in place when `column` is the only handle, otherwise swaps in a
/// private copy first. Other holders never observe the change.
pub fn make_mut(column: &mut ColumnPtr) -> &mut dyn Column {
    if Arc::get_mut(column).is_none() {
        tracing::trace!(name = %column.name(), rows = column.len(), "copy on write");
        *column = column.clone_resized(column.len());
    }
    // fresh Arc from clone_resized has no other handles
    Arc::get_mut(column).expect("freshly cloned column is uniquely owned")
}
