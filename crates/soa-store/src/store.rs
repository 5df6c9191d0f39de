//! Columnar store - a growable struct-of-arrays table.
//!
//! One [`AlignedColumn`] per component type, all indexed `0..len` in
//! lock-step: row `i` across every column is one logical entity. The store
//! owns the row count and capacity; columns only own memory.

use std::{fmt, marker::PhantomData};

use smallvec::SmallVec;
use tracing::trace;

use crate::{
    column::AlignedColumn,
    component::ColumnLayout,
    error::{StoreError, StoreResult},
    row::{ColumnAt, Row},
};

/// Capacity of the first allocation made by [`ColumnarStore::push_row`].
pub const INITIAL_CAPACITY: usize = 16;

/// Outcome of a swap-remove.
///
/// When `relocated_from` is `Some(old)`, the row that used to live at `old`
/// now lives at `removed_index`; any external index pointing at `old` is
/// stale and must be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal<R, I = usize> {
    /// Where the removed row lived.
    pub removed_index: I,
    /// The row that was removed.
    pub removed: R,
    /// The former index of the row moved into `removed_index`, if any.
    pub relocated_from: Option<I>,
}

impl<R> Removal<R> {
    /// Re-address this removal in an outer index space.
    pub fn map_index<I>(self, mut f: impl FnMut(usize) -> I) -> Removal<R, I> {
        Removal {
            removed_index: f(self.removed_index),
            removed: self.removed,
            relocated_from: self.relocated_from.map(f),
        }
    }
}

/// Struct-of-arrays storage for rows of type `R`.
pub struct ColumnarStore<R: Row> {
    /// One buffer per component, in column order.
    columns: SmallVec<[AlignedColumn; 8]>,
    /// Number of live rows.
    len: usize,
    /// Rows every column has room for.
    capacity: usize,
    _row: PhantomData<R>,
}

impl<R: Row> Default for ColumnarStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Row> ColumnarStore<R> {
    /// Create an empty store. Nothing is allocated until the first row.
    #[must_use]
    pub fn new() -> Self {
        Self {
            columns: R::layouts().into_iter().map(AlignedColumn::new).collect(),
            len: 0,
            capacity: 0,
            _row: PhantomData,
        }
    }

    /// Create an empty store with room for `capacity` rows.
    pub fn with_capacity(capacity: usize) -> StoreResult<Self> {
        let mut store = Self::new();
        store.reserve(capacity)?;
        Ok(store)
    }

    /// Get the number of live rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if the store holds no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the number of rows the columns have room for.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate over the layouts of all columns.
    pub fn layouts(&self) -> impl Iterator<Item = &ColumnLayout> {
        self.columns.iter().map(AlignedColumn::layout)
    }

    /// Grow every column to hold at least `new_capacity` rows.
    ///
    /// All new buffers are allocated before any old one is released, so a
    /// failed allocation leaves the store untouched.
    pub fn reserve(&mut self, new_capacity: usize) -> StoreResult<()> {
        if new_capacity <= self.capacity {
            return Ok(());
        }
        self.reallocate(new_capacity)
    }

    /// Set the number of live rows.
    ///
    /// Grows to `new_size * 2` when `new_size` exceeds the capacity. Rows
    /// exposed by growing the length read as all-zero until written.
    pub fn resize(&mut self, new_size: usize) -> StoreResult<()> {
        if new_size > self.capacity {
            let target = new_size
                .checked_mul(2)
                .ok_or(StoreError::CapacityOverflow)?;
            self.reserve(target)?;
        }

        if new_size > self.len {
            for column in &mut self.columns {
                // SAFETY: len < new_size <= capacity
                unsafe { column.zero(self.len, new_size) };
            }
        }

        self.len = new_size;
        Ok(())
    }

    /// Append a row, doubling capacity (from [`INITIAL_CAPACITY`]) when full.
    ///
    /// Returns the index of the new row.
    pub fn push_row(&mut self, row: R) -> StoreResult<usize> {
        if self.len == self.capacity {
            let target = if self.capacity == 0 {
                INITIAL_CAPACITY
            } else {
                self.capacity
                    .checked_mul(2)
                    .ok_or(StoreError::CapacityOverflow)?
            };
            self.reserve(target)?;
        }

        self.push_within_capacity(row)
            .map_err(|_| StoreError::CapacityOverflow)
    }

    /// Append a row only if it fits without allocating.
    ///
    /// Hands the row back when the store is full.
    pub fn push_within_capacity(&mut self, row: R) -> Result<usize, R> {
        if self.len == self.capacity {
            return Err(row);
        }

        let index = self.len;
        // SAFETY: index < capacity and the columns were built from R::layouts()
        unsafe { row.write(&mut self.columns, index) };
        self.len += 1;
        Ok(index)
    }

    /// Remove the last row and return it.
    ///
    /// The vacated slot is left as-is beyond the live range.
    pub fn pop_last_row(&mut self) -> Option<R> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the old last index is below capacity and initialized
        Some(unsafe { R::read(&self.columns, self.len) })
    }

    /// Swap rows `a` and `b` across every column.
    pub fn swap_rows(&mut self, a: usize, b: usize) -> StoreResult<()> {
        self.check_row(a)?;
        self.check_row(b)?;
        if a == b {
            return Ok(());
        }

        for column in &mut self.columns {
            // SAFETY: both indices are live rows
            unsafe { column.swap(a, b) };
        }
        Ok(())
    }

    /// Remove the row at `index` by moving the last row into its place.
    ///
    /// O(1), not order-preserving. The returned [`Removal`] says which row,
    /// if any, was relocated.
    pub fn erase_by_swap(&mut self, index: usize) -> StoreResult<Removal<R>> {
        self.check_row(index)?;

        let last = self.len - 1;
        if index != last {
            self.swap_rows(index, last)?;
        }

        self.len = last;
        // SAFETY: `last` was a live row and now holds the removed row
        let removed = unsafe { R::read(&self.columns, last) };

        Ok(Removal {
            removed_index: index,
            removed,
            relocated_from: (index != last).then_some(last),
        })
    }

    /// Copy out the row at `index`.
    pub fn get_row(&self, index: usize) -> StoreResult<R> {
        self.check_row(index)?;
        // SAFETY: index is a live row
        Ok(unsafe { R::read(&self.columns, index) })
    }

    /// Overwrite the row at `index`.
    pub fn set_row(&mut self, index: usize, row: R) -> StoreResult<()> {
        self.check_row(index)?;
        // SAFETY: index is a live row
        unsafe { row.write(&mut self.columns, index) };
        Ok(())
    }

    /// View column `I` over the live rows.
    #[must_use]
    pub fn column<const I: usize>(&self) -> &[<R as ColumnAt<I>>::Type]
    where
        R: ColumnAt<I>,
    {
        // SAFETY: ColumnAt<I> names the type of column I; len <= capacity
        unsafe { self.columns[I].as_slice(self.len) }
    }

    /// Mutably view column `I` over the live rows.
    #[must_use]
    pub fn column_mut<const I: usize>(&mut self) -> &mut [<R as ColumnAt<I>>::Type]
    where
        R: ColumnAt<I>,
    {
        // SAFETY: ColumnAt<I> names the type of column I; len <= capacity
        unsafe { self.columns[I].as_mut_slice(self.len) }
    }

    /// Get one component of the row at `index`.
    pub fn get<const I: usize>(&self, index: usize) -> StoreResult<&<R as ColumnAt<I>>::Type>
    where
        R: ColumnAt<I>,
    {
        let len = self.len;
        self.column::<I>()
            .get(index)
            .ok_or(StoreError::RowOutOfBounds { index, len })
    }

    /// Mutably get one component of the row at `index`.
    pub fn get_mut<const I: usize>(
        &mut self,
        index: usize,
    ) -> StoreResult<&mut <R as ColumnAt<I>>::Type>
    where
        R: ColumnAt<I>,
    {
        let len = self.len;
        self.column_mut::<I>()
            .get_mut(index)
            .ok_or(StoreError::RowOutOfBounds { index, len })
    }

    /// Drop every row, keeping the allocation.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Shrink every column to exactly `len` rows.
    ///
    /// An empty store releases its buffers entirely.
    pub fn shrink_to_fit(&mut self) -> StoreResult<()> {
        if self.len == self.capacity {
            return Ok(());
        }

        if self.len == 0 {
            for column in &mut self.columns {
                column.release();
            }
            trace!(from = self.capacity, "released columnar store");
            self.capacity = 0;
            return Ok(());
        }

        self.reallocate(self.len)
    }

    fn reallocate(&mut self, new_capacity: usize) -> StoreResult<()> {
        let mut fresh: SmallVec<[AlignedColumn; 8]> = SmallVec::with_capacity(self.columns.len());
        for column in &self.columns {
            fresh.push(AlignedColumn::with_capacity(*column.layout(), new_capacity)?);
        }

        let live = self.len.min(new_capacity);
        for (old, mut new) in self.columns.iter_mut().zip(fresh) {
            // SAFETY: `new` was built from `old`'s layout and both hold `live` slots
            unsafe { new.copy_prefix_from(old, live) };
            *old = new;
        }

        trace!(
            from = self.capacity,
            to = new_capacity,
            columns = R::COLUMNS,
            "resized columnar store"
        );

        self.capacity = new_capacity;
        Ok(())
    }

    fn check_row(&self, index: usize) -> StoreResult<()> {
        if index < self.len {
            Ok(())
        } else {
            Err(StoreError::RowOutOfBounds {
                index,
                len: self.len,
            })
        }
    }
}

impl<R: Row> fmt::Debug for ColumnarStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnarStore")
            .field("columns", &self.columns.len())
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .finish()
    }
}
