//! Chunks - fixed-capacity blocks of rows with a change version.

use std::fmt;

use crate::{
    error::{StoreError, StoreResult},
    row::{ColumnAt, Row},
    store::{ColumnarStore, Removal},
};

/// A fixed-capacity [`ColumnarStore`] with a mutation counter.
///
/// The store is reserved to exactly `capacity` rows on construction and
/// never grows past it, so adding to a chunk never allocates.
///
/// `version` moves by one on every successful add or remove (and on
/// clearing a non-empty chunk). Readers compare versions to detect changes
/// without looking at row contents.
pub struct Chunk<R: Row> {
    store: ColumnarStore<R>,
    capacity: usize,
    version: u64,
}

impl<R: Row> Chunk<R> {
    /// Create an empty chunk with room for exactly `capacity` rows.
    pub fn new(capacity: usize) -> StoreResult<Self> {
        if capacity == 0 {
            return Err(StoreError::ZeroCapacity);
        }

        Ok(Self {
            store: ColumnarStore::with_capacity(capacity)?,
            capacity,
            version: 0,
        })
    }

    /// Add a row, returning its index, or `None` when the chunk is full.
    pub fn add(&mut self, row: R) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let index = self.store.push_within_capacity(row).ok()?;
        self.version = self.version.wrapping_add(1);
        Some(index)
    }

    /// Swap-remove the row at `index`.
    ///
    /// See [`Removal`] for how to fix up external indices.
    pub fn remove(&mut self, index: usize) -> StoreResult<Removal<R>> {
        let removal = self.store.erase_by_swap(index)?;
        self.version = self.version.wrapping_add(1);
        Ok(removal)
    }

    /// Remove every row, keeping the allocation.
    pub fn clear(&mut self) {
        if self.store.is_empty() {
            return;
        }
        self.store.clear();
        self.version = self.version.wrapping_add(1);
    }

    /// View column `I` over the live rows.
    #[must_use]
    pub fn column<const I: usize>(&self) -> &[<R as ColumnAt<I>>::Type]
    where
        R: ColumnAt<I>,
    {
        self.store.column::<I>()
    }

    /// Mutably view column `I` over the live rows.
    #[must_use]
    pub fn column_mut<const I: usize>(&mut self) -> &mut [<R as ColumnAt<I>>::Type]
    where
        R: ColumnAt<I>,
    {
        self.store.column_mut::<I>()
    }

    /// Get one component of the row at `index`.
    pub fn get<const I: usize>(&self, index: usize) -> StoreResult<&<R as ColumnAt<I>>::Type>
    where
        R: ColumnAt<I>,
    {
        self.store.get::<I>(index)
    }

    /// Mutably get one component of the row at `index`.
    pub fn get_mut<const I: usize>(
        &mut self,
        index: usize,
    ) -> StoreResult<&mut <R as ColumnAt<I>>::Type>
    where
        R: ColumnAt<I>,
    {
        self.store.get_mut::<I>(index)
    }

    /// Copy out the row at `index`.
    pub fn get_row(&self, index: usize) -> StoreResult<R> {
        self.store.get_row(index)
    }

    /// Overwrite the row at `index`.
    pub fn set_row(&mut self, index: usize, row: R) -> StoreResult<()> {
        self.store.set_row(index, row)
    }

    /// Get the number of live rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.store.len()
    }

    /// Get the fixed row capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the number of free slots.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.capacity - self.store.len()
    }

    /// Check if the chunk holds no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Check if the chunk has no free slot.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.store.len() == self.capacity
    }

    /// Get the mutation counter.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }
}

impl<R: Row> fmt::Debug for Chunk<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("version", &self.version)
            .finish()
    }
}
