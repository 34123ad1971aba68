//! Fixed-width numeric column.

use std::any::Any;
use std::cmp::Ordering;
use std::hash::Hasher;
use std::mem::size_of;
use std::sync::Arc;

use bytemuck::Zeroable;

use crate::arena::{Arena, ArenaSpan};
use crate::column::{Column, ColumnPtr, Filter, Offsets, Permutation};
use crate::error::{ColumnError, Result};
use crate::field::Field;
use crate::filter::filter_into;
use crate::numeric::Numeric;
use crate::select::partial_sort_by;

/// A contiguous column of fixed-width numbers. Row `i` is `data[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnVector<T> {
    data: Vec<T>,
}

impl<T: Numeric> ColumnVector<T> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// A column of `len` all-zero-bits rows.
    pub fn with_len(len: usize) -> Self {
        Self {
            data: vec![T::zeroed(); len],
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn name(&self) -> String {
        format!("ColumnVector<{}>", T::TYPE_NAME)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Vec<T> {
        &mut self.data
    }

    pub fn into_inner(self) -> Vec<T> {
        self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn byte_size(&self) -> usize {
        self.data.len() * size_of::<T>()
    }

    pub fn allocated_bytes(&self) -> usize {
        self.data.capacity() * size_of::<T>()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional);
    }

    pub fn get(&self, n: usize) -> Field {
        self.data[n].to_field()
    }

    /// Raw bits of row `n` as a `u64`; see [`Numeric::to_bits_u64`].
    #[inline]
    pub fn get_value_as_bits(&self, n: usize) -> u64 {
        self.data[n].to_bits_u64()
    }

    #[inline]
    pub fn push(&mut self, value: T) {
        self.data.push(value);
    }

    /// Appends a boxed value. The field must be the nearest variant for `T`.
    pub fn insert(&mut self, value: &Field) -> Result<()> {
        let value = T::from_field(value).ok_or_else(|| ColumnError::TypeMismatch {
            expected: T::TYPE_NAME.to_owned(),
            actual: value.type_name().to_owned(),
        })?;
        self.data.push(value);
        Ok(())
    }

    pub fn insert_default(&mut self) {
        self.data.push(T::default());
    }

    /// Removes the last `n` rows, or all rows if there are fewer.
    pub fn pop_back(&mut self, n: usize) {
        let len = self.data.len().saturating_sub(n);
        self.data.truncate(len);
    }

    pub fn clone_empty(&self) -> Self {
        Self::new()
    }

    /// Copy of the first `size` rows, padded with all-zero-bits rows when
    /// `size` exceeds the current length.
    pub fn clone_resized(&self, size: usize) -> Self {
        let count = self.data.len().min(size);
        let mut data = Vec::with_capacity(size);
        data.extend_from_slice(&self.data[..count]);
        data.resize(size, T::zeroed());
        Self { data }
    }

    /// Appends `src[start..start + length]`.
    ///
    /// Fails without touching `self` when the range does not fit in `src`.
    pub fn insert_range_from(&mut self, src: &Self, start: usize, length: usize) -> Result<()> {
        let end = start
            .checked_add(length)
            .filter(|&end| end <= src.data.len())
            .ok_or_else(|| {
                tracing::debug!(start, length, size = src.data.len(), "insert_range_from out of bound");
                ColumnError::OutOfBounds {
                    start,
                    length,
                    size: src.data.len(),
                }
            })?;

        self.data.extend_from_slice(&src.data[start..end]);
        Ok(())
    }

    /// Fills `res` with the row order that sorts the column.
    ///
    /// With `limit == 0` (or `limit >= len`) the whole order is sorted.
    /// Otherwise only `res[..limit]` is guaranteed to hold the `limit`
    /// smallest rows (largest when `reverse`) in order; the tail holds the
    /// remaining rows in no particular order. Ties are not stable. NaN sorts
    /// above every number, and `reverse` mirrors the order exactly.
    pub fn get_permutation(&self, reverse: bool, limit: usize, res: &mut Permutation) {
        let size = self.data.len();
        res.clear();
        res.extend(0..size);

        let limit = if limit >= size { 0 } else { limit };
        tracing::trace!(rows = size, limit, reverse, "get_permutation");

        let data = &self.data;
        if reverse {
            sort_rows(res, limit, |&lhs, &rhs| data[rhs].compare(&data[lhs]));
        } else {
            sort_rows(res, limit, |&lhs, &rhs| data[lhs].compare(&data[rhs]));
        }
    }

    /// Rows whose mask byte is nonzero, in order.
    ///
    /// `size_hint` pre-sizes the result: positive reserves that many rows,
    /// negative reserves the full column length, zero reserves nothing.
    pub fn filter(&self, filter: &Filter, size_hint: isize) -> Result<Self> {
        let size = self.data.len();
        if filter.len() != size {
            tracing::debug!(rows = size, mask = filter.len(), "filter size mismatch");
            return Err(ColumnError::SizeMismatch {
                what: "filter",
                expected: size,
                actual: filter.len(),
            });
        }

        let mut data = match size_hint {
            0 => Vec::new(),
            hint if hint > 0 => Vec::with_capacity(hint.unsigned_abs()),
            _ => Vec::with_capacity(size),
        };
        filter_into(&self.data, filter, &mut data);

        tracing::trace!(rows = size, selected = data.len(), "filter");
        Ok(Self { data })
    }

    fn permute_limit(&self, perm: &[usize], limit: usize) -> Result<usize> {
        let size = self.data.len();
        let limit = if limit == 0 { size } else { size.min(limit) };

        if perm.len() < limit {
            tracing::debug!(rows = size, limit, perm = perm.len(), "permutation too short");
            return Err(ColumnError::SizeMismatch {
                what: "permutation",
                expected: limit,
                actual: perm.len(),
            });
        }
        Ok(limit)
    }

    /// Output row `i` is source row `perm[i]`, for the first
    /// `limit` (or all, when `limit == 0`) rows.
    ///
    /// Entries of `perm` are not validated; an entry past the end of the
    /// column panics. See [`Self::permute_unchecked`] for the unchecked path.
    pub fn permute(&self, perm: &[usize], limit: usize) -> Result<Self> {
        let limit = self.permute_limit(perm, limit)?;
        let data = perm[..limit].iter().map(|&row| self.data[row]).collect();

        tracing::trace!(rows = limit, "permute");
        Ok(Self { data })
    }

    /// Same as [`Self::permute`] without per-row bounds checks.
    ///
    /// # Safety
    ///
    /// Every entry of `perm[..limit]` (all of `perm` up to the column length
    /// when `limit == 0`) must be less than `self.len()`. Permutations built
    /// by [`Self::get_permutation`] on this column satisfy this.
    pub unsafe fn permute_unchecked(&self, perm: &[usize], limit: usize) -> Result<Self> {
        let limit = self.permute_limit(perm, limit)?;
        let data = perm[..limit]
            .iter()
            // SAFETY: the caller guarantees `row < self.data.len()`.
            .map(|&row| unsafe { *self.data.get_unchecked(row) })
            .collect();
        Ok(Self { data })
    }

    /// Repeats row `i` `offsets[i] - offsets[i - 1]` times (with
    /// `offsets[-1] = 0`). The result has `offsets.last()` rows; a total that
    /// cannot be allocated fails with [`ColumnError::CapacityOverflow`].
    pub fn replicate(&self, offsets: &Offsets) -> Result<Self> {
        let size = self.data.len();
        if offsets.len() != size {
            tracing::debug!(rows = size, offsets = offsets.len(), "replicate size mismatch");
            return Err(ColumnError::SizeMismatch {
                what: "offsets",
                expected: size,
                actual: offsets.len(),
            });
        }

        let Some(&total) = offsets.last() else {
            return Ok(Self::new());
        };

        let mut data: Vec<T> = Vec::new();
        usize::try_from(total)
            .ok()
            .and_then(|rows| data.try_reserve_exact(rows).ok())
            .ok_or_else(|| {
                tracing::debug!(rows = size, total, "replicate capacity overflow");
                ColumnError::CapacityOverflow { rows: total }
            })?;
        let mut prev = 0u64;
        for (&value, &offset) in self.data.iter().zip(offsets) {
            debug_assert!(offset >= prev, "offsets must be non-decreasing");
            let count = offset.saturating_sub(prev) as usize;
            prev = offset;
            data.extend(std::iter::repeat_n(value, count));
        }

        tracing::trace!(rows = size, replicated = data.len(), "replicate");
        Ok(Self { data })
    }

    /// Appends the native bytes of row `n` to the key region `begin` and
    /// returns the span of exactly those bytes.
    pub fn serialize_value_into_arena<A: Arena + ?Sized>(
        &self,
        n: usize,
        arena: &mut A,
        begin: &mut Option<ArenaSpan>,
    ) -> ArenaSpan {
        let bytes = bytemuck::bytes_of(&self.data[n]);
        let (span, dst) = arena.alloc_continue(bytes.len(), begin);
        dst.copy_from_slice(bytes);
        span
    }

    /// Reads one value from the front of `pos`, appends it, and returns the
    /// unread rest of `pos`.
    pub fn deserialize_and_insert_from_arena<'a>(&mut self, pos: &'a [u8]) -> Result<&'a [u8]> {
        let width = size_of::<T>();
        if pos.len() < width {
            return Err(ColumnError::OutOfBounds {
                start: 0,
                length: width,
                size: pos.len(),
            });
        }

        let (value, rest) = pos.split_at(width);
        self.data.push(bytemuck::pod_read_unaligned(value));
        Ok(rest)
    }

    /// Feeds the native bytes of row `n` into `hasher`.
    #[inline]
    pub fn update_hash_with_value<H: Hasher + ?Sized>(&self, n: usize, hasher: &mut H) {
        hasher.write(bytemuck::bytes_of(&self.data[n]));
    }

    /// Minimum and maximum over the non-NaN rows.
    ///
    /// An empty column yields `(0, 0)`; a column of only NaNs yields
    /// `(NaN, NaN)`, not necessarily bit-identical to any NaN in the column.
    pub fn get_extremes(&self) -> (Field, Field) {
        if self.data.is_empty() {
            let zero = T::zeroed().to_field();
            return (zero, zero);
        }

        let mut has_value = false;
        let mut cur_min = T::nan_or_zero();
        let mut cur_max = T::nan_or_zero();

        for &x in &self.data {
            if x.is_nan() {
                continue;
            }

            if !has_value {
                cur_min = x;
                cur_max = x;
                has_value = true;
                continue;
            }

            if x < cur_min {
                cur_min = x;
            }
            if x > cur_max {
                cur_max = x;
            }
        }

        (cur_min.to_field(), cur_max.to_field())
    }

    /// Compares own row `n` with row `m` of `rhs` in sort order.
    pub fn compare_at(&self, n: usize, m: usize, rhs: &Self) -> Ordering {
        self.data[n].compare(&rhs.data[m])
    }

    fn downcast<'a>(&self, other: &'a dyn Column) -> Result<&'a Self> {
        other
            .as_any()
            .downcast_ref::<Self>()
            .ok_or_else(|| ColumnError::TypeMismatch {
                expected: self.name(),
                actual: other.name(),
            })
    }
}

fn sort_rows<F>(res: &mut [usize], limit: usize, cmp: F)
where
    F: FnMut(&usize, &usize) -> Ordering,
{
    if limit == 0 {
        res.sort_unstable_by(cmp);
    } else {
        partial_sort_by(res, limit, cmp);
    }
}

impl<T: Numeric> From<Vec<T>> for ColumnVector<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T: Numeric> FromIterator<T> for ColumnVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl<T: Numeric> Column for ColumnVector<T> {
    fn name(&self) -> String {
        ColumnVector::name(self)
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn byte_size(&self) -> usize {
        ColumnVector::byte_size(self)
    }

    fn get(&self, n: usize) -> Field {
        ColumnVector::get(self, n)
    }

    fn get_value_as_bits(&self, n: usize) -> u64 {
        ColumnVector::get_value_as_bits(self, n)
    }

    fn clone_resized(&self, size: usize) -> ColumnPtr {
        Arc::new(ColumnVector::clone_resized(self, size))
    }

    fn clone_empty(&self) -> ColumnPtr {
        Arc::new(ColumnVector::clone_empty(self))
    }

    fn insert(&mut self, value: &Field) -> Result<()> {
        ColumnVector::insert(self, value)
    }

    fn insert_default(&mut self) {
        ColumnVector::insert_default(self)
    }

    fn insert_range_from(&mut self, src: &dyn Column, start: usize, length: usize) -> Result<()> {
        let src = self.downcast(src)?;
        ColumnVector::insert_range_from(self, src, start, length)
    }

    fn pop_back(&mut self, n: usize) {
        ColumnVector::pop_back(self, n)
    }

    fn get_permutation(&self, reverse: bool, limit: usize, res: &mut Permutation) {
        ColumnVector::get_permutation(self, reverse, limit, res)
    }

    fn filter(&self, filter: &Filter, size_hint: isize) -> Result<ColumnPtr> {
        Ok(Arc::new(ColumnVector::filter(self, filter, size_hint)?))
    }

    fn permute(&self, perm: &[usize], limit: usize) -> Result<ColumnPtr> {
        Ok(Arc::new(ColumnVector::permute(self, perm, limit)?))
    }

    fn replicate(&self, offsets: &Offsets) -> Result<ColumnPtr> {
        Ok(Arc::new(ColumnVector::replicate(self, offsets)?))
    }

    fn serialize_value_into_arena(
        &self,
        n: usize,
        arena: &mut dyn Arena,
        begin: &mut Option<ArenaSpan>,
    ) -> ArenaSpan {
        ColumnVector::serialize_value_into_arena(self, n, arena, begin)
    }

    fn deserialize_and_insert_from_arena<'a>(&mut self, pos: &'a [u8]) -> Result<&'a [u8]> {
        ColumnVector::deserialize_and_insert_from_arena(self, pos)
    }

    fn update_hash_with_value(&self, n: usize, hasher: &mut dyn Hasher) {
        ColumnVector::update_hash_with_value(self, n, hasher)
    }

    fn get_extremes(&self) -> (Field, Field) {
        ColumnVector::get_extremes(self)
    }

    fn compare_at(&self, n: usize, m: usize, rhs: &dyn Column) -> Result<Ordering> {
        let rhs = self.downcast(rhs)?;
        Ok(ColumnVector::compare_at(self, n, m, rhs))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
